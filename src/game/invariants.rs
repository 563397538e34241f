//! Game invariants - sanity checks that detect bugs.
//!
//! Every coordinator method keeps these true. If one is ever violated it
//! indicates a bug, not a gameplay situation.

use std::collections::HashSet;

use crate::game::{GOLD_TILE, GOLD_TOTAL, Game, GamePhase, MAX_PLAYERS};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(game: &Game) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut violation = |message: String| violations.push(InvariantViolation { message });

    // Layouts stay the same length
    let grid = game.grid();
    if grid.active().len() != grid.reference().len() {
        violation(format!(
            "Active map length {} differs from reference length {}",
            grid.active().len(),
            grid.reference().len()
        ));
    }

    // Gold is conserved
    let in_piles: u64 = game.piles().iter().map(|&p| u64::from(p)).sum();
    let held: u64 = game.players().iter().map(|p| u64::from(p.gold())).sum();
    let banked = u64::from(game.banked_gold());
    if in_piles + held + banked != u64::from(GOLD_TOTAL) {
        violation(format!(
            "Gold not conserved: {in_piles} in piles + {held} held + {banked} banked \
             != {GOLD_TOTAL}"
        ));
    }
    if u64::from(game.remaining_gold()) != in_piles {
        violation(format!(
            "Remaining gold {} differs from {in_piles} in piles",
            game.remaining_gold()
        ));
    }
    if game.remaining_gold() == 0 && game.phase() != GamePhase::Over {
        violation("All gold collected but the game is still active".to_owned());
    }

    // Identifiers are unique capital letters
    let mut ids = HashSet::new();
    for player in game.players().iter() {
        match (player.is_spectator(), player.id()) {
            (true, Some(id)) => violation(format!("Spectator has identifier {id}")),
            (false, None) => violation(format!("Player {} has no identifier", player.name())),
            (false, Some(id)) => {
                if !id.is_ascii_uppercase() {
                    violation(format!("Player {} has identifier {id:?}", player.name()));
                }
                if !ids.insert(id) {
                    violation(format!("Identifier {id} assigned twice"));
                }
            }
            (true, None) => {}
        }
    }
    if game.num_players() > MAX_PLAYERS {
        violation(format!("{} players exceed the maximum", game.num_players()));
    }

    // Players are drawn where they stand
    for player in game.players().iter() {
        let (Some(pos), Some(id)) = (player.pos(), player.id()) else {
            continue;
        };
        if !grid.is_walkable(pos) {
            violation(format!("Player {id} stands on unwalkable cell {pos}"));
        }
        if grid.active_at(pos) != Some(id) {
            violation(format!("Player {id} is not drawn at {pos}"));
        }
    }

    // Placed piles hold gold and are drawn
    for (&pos, &pile) in &game.pile_positions {
        if game.piles().get(pile).copied().unwrap_or(0) == 0 {
            violation(format!("Empty pile {pile} still placed at {pos}"));
        }
        if grid.active_at(pos) != Some(GOLD_TILE) {
            violation(format!("Pile {pile} is not drawn at {pos}"));
        }
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(game: &Game) {
    let violations = check_invariants(game);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_game: &Game) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Grid, Player};

    fn create_test_game() -> Game {
        let grid = Grid::new("+----+\n|....|\n+----+\n").unwrap();
        let mut game = Game::new(vec![125, 125], grid).unwrap();
        game.add_player(Player::new("alice", "a")).unwrap();
        game.add_player(Player::spectator("s")).unwrap();
        game.spawn_player("alice", 7).unwrap();
        game.place_pile(0, 8).unwrap();
        game.place_pile(1, 10).unwrap();
        game
    }

    #[test]
    fn test_fresh_game_holds() {
        assert!(check_invariants(&create_test_game()).is_empty());
    }

    #[test]
    fn test_holds_through_collection() {
        let mut game = create_test_game();
        game.move_player("alice", Direction::Right).unwrap();
        assert_invariants(&game);
        game.sprint_player("alice", Direction::Right).unwrap();
        assert!(game.is_over());
        assert_invariants(&game);
    }

    #[test]
    fn test_holds_after_quit() {
        let mut game = create_test_game();
        game.move_player("alice", Direction::Right).unwrap();
        game.remove_player("alice").unwrap();
        assert_invariants(&game);
        assert_eq!(game.banked_gold(), 125);
    }

    #[test]
    fn test_detects_counter_drift() {
        let mut game = create_test_game();
        game.subtract_gold(10).unwrap();
        let violations = check_invariants(&game);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Remaining gold"));
    }
}
