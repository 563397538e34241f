#![no_main]

//! Game session fuzzer.
//!
//! Exercises the coordinator with arbitrary joins, quits, keystrokes, and
//! map swaps, checking every invariant after each action.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nuggets::game::check_invariants;
use nuggets::setup::spawn_position;
use nuggets::{Grid, Player, SetupConfig, new_game};

const MAP: &str = "\
+--------+    +------+
|........|    |......|
|........######......|
|........|    |......|
+---#----+    +--#---+
    #            #
    ##############
";

const ALTERNATE_MAP: &str = "\
+--------+    +------+
|...|....|    |......|
|...|....######......|
|........|    |......|
+---#----+    +------+
    #
    #
";

/// A fuzzer-generated action.
#[derive(Arbitrary, Debug, Clone)]
enum Action {
    /// A new player joins and is dropped on a free cell.
    Join { seed: u64 },
    /// A spectator joins.
    Watch,
    /// The nth player quits.
    Quit { player: u8 },
    /// The nth player presses a key.
    Key { player: u8, key: u8 },
    /// The map is swapped for the other layout.
    SwapMap,
}

/// Structured input for session fuzzing.
#[derive(Arbitrary, Debug)]
struct SessionInput {
    /// Setup seed.
    seed: u64,
    /// Actions in order.
    actions: Vec<Action>,
}

fuzz_target!(|input: SessionInput| {
    let config = SetupConfig {
        seed: input.seed,
        ..SetupConfig::default()
    };
    let Ok(grid) = Grid::new(MAP) else {
        return;
    };
    let mut game = new_game(grid, &config).unwrap();
    let mut names: Vec<String> = Vec::new();
    let mut joined = 0usize;
    let mut alternate = false;

    for (step, action) in input.actions.into_iter().take(200).enumerate() {
        match action {
            Action::Join { seed } => {
                let name = format!("p{joined}");
                joined += 1;
                if game.add_player(Player::new(name.as_str(), name.as_str())).is_ok() {
                    if let Some(pos) = spawn_position(&game, seed) {
                        game.spawn_player(&name, pos).unwrap();
                    }
                    names.push(name);
                }
            }
            Action::Watch => {
                let _ = game.add_player(Player::spectator("watcher"));
            }
            Action::Quit { player } => {
                if !names.is_empty() {
                    let index = usize::from(player) % names.len();
                    if game.remove_player(&names[index]).is_ok() {
                        names.remove(index);
                    }
                }
            }
            Action::Key { player, key } => {
                if !names.is_empty() {
                    let name = &names[usize::from(player) % names.len()];
                    let _ = game.handle_key(name, char::from(key));
                }
            }
            Action::SwapMap => {
                let text = if alternate { MAP } else { ALTERNATE_MAP };
                if game.set_grid(Grid::new(text).unwrap()).is_ok() {
                    alternate = !alternate;
                }
            }
        }

        let violations = check_invariants(&game);
        assert!(
            violations.is_empty(),
            "Invariants violated after action {step}: {violations:?}"
        );
    }

    let summary = game.build_summary();
    assert_eq!(summary.lines().count(), names.len() + 1);
    game.close();
});
