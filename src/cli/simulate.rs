//! Simulate command implementation.

use super::output::JsonSimulation;
use super::{CliError, OutputFormat, load_map, print_json};
use nuggets::game::{MAX_PLAYERS, SPECTATOR_NAME};
use nuggets::setup::{Rng, spawn_position};
use nuggets::{Direction, Game, GameResult, Player, SetupConfig, new_game};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the map or config cannot be loaded, or the game
/// cannot be set up.
pub(crate) fn execute(
    map: &Path,
    players: usize,
    seed: Option<u64>,
    max_moves: u32,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    if !(1..=MAX_PLAYERS).contains(&players) {
        return Err(CliError::new(format!(
            "Player count must be between 1 and {MAX_PLAYERS}, got {players}"
        )));
    }

    let mut setup = match config {
        Some(path) => load_config(path)?,
        None => SetupConfig::default(),
    };
    if let Some(seed) = seed {
        setup.seed = seed;
    }

    let grid = load_map(map)?;
    let mut game = new_game(grid, &setup)?;
    let names = join_players(&mut game, players, setup.seed)?;
    let moves = play(&mut game, &names, setup.seed, max_moves);
    game.finish();

    match format {
        OutputFormat::Text => {
            println!("Game over after {moves} moves (seed: {})", setup.seed);
            println!("Gold left on the map: {}", game.remaining_gold());
            println!();
            print!("{}", game.build_summary());
        }
        OutputFormat::Json => print_json(&JsonSimulation::from_game(&game, setup.seed, moves))?,
    }

    game.close();
    Ok(())
}

/// Read a JSON setup config.
fn load_config(path: &Path) -> Result<SetupConfig, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    Ok(serde_json::from_str(&text)?)
}

/// Join `count` players and a spectator, and drop each player on a free
/// room cell. Returns the names of the players that made it onto the map.
fn join_players(game: &mut Game, count: usize, seed: u64) -> GameResult<Vec<String>> {
    game.add_player(Player::spectator(SPECTATOR_NAME))?;

    let mut names = Vec::with_capacity(count);
    for (i, salt) in (0..count).zip(1_u64..) {
        let name = format!("player{}", i + 1);
        game.add_player(Player::new(name.as_str(), name.as_str()))?;
        let Some(pos) = spawn_position(game, seed.wrapping_add(salt)) else {
            info!(name = name.as_str(), "no free room cell left");
            continue;
        };
        game.spawn_player(&name, pos)?;
        names.push(name);
    }
    Ok(names)
}

/// Random-walk the players until all gold is collected or `max_moves`
/// moves have been attempted. Returns the number of moves attempted.
fn play(game: &mut Game, names: &[String], seed: u64, max_moves: u32) -> u32 {
    if names.is_empty() {
        return 0;
    }

    let mut rng = Rng::new(seed);
    let mut moves = 0;
    while moves < max_moves && !game.is_over() {
        moves += 1;
        let Some(name) = names.get(rng.below(names.len())) else {
            continue;
        };
        let Some(&direction) = Direction::ALL.get(rng.below(Direction::ALL.len())) else {
            continue;
        };
        if let Ok(outcome) = game.move_player(name, direction)
            && outcome.collected > 0
        {
            debug!(name = name.as_str(), collected = outcome.collected, moves, "pile collected");
        }
    }
    moves
}
