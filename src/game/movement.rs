//! Player movement and gold pickup.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GameError, GameResult};
use crate::game::{Game, compute};

/// One of the eight directions a player can step in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `h`
    Left,
    /// `l`
    Right,
    /// `k`
    Up,
    /// `j`
    Down,
    /// `y`
    UpLeft,
    /// `u`
    UpRight,
    /// `b`
    DownLeft,
    /// `n`
    DownRight,
}

impl Direction {
    /// Every direction.
    pub const ALL: [Direction; 8] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// Parse a movement key. Lowercase keys step once; uppercase keys
    /// sprint. Returns the direction and whether to sprint.
    #[must_use]
    pub fn from_key(key: char) -> Option<(Self, bool)> {
        let direction = match key.to_ascii_lowercase() {
            'h' => Direction::Left,
            'l' => Direction::Right,
            'k' => Direction::Up,
            'j' => Direction::Down,
            'y' => Direction::UpLeft,
            'u' => Direction::UpRight,
            'b' => Direction::DownLeft,
            'n' => Direction::DownRight,
            _ => return None,
        };
        Some((direction, key.is_ascii_uppercase()))
    }

    /// Unit step `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (1, -1),
            Direction::DownLeft => (-1, 1),
            Direction::DownRight => (1, 1),
        }
    }
}

/// What happened during a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// Number of cells moved.
    pub steps: usize,
    /// Gold picked up.
    pub collected: u32,
    /// Identifier of a player swapped places with.
    pub swapped_with: Option<char>,
}

impl Game {
    /// Move a player one step.
    ///
    /// Players walk on room and passage tiles. Stepping onto another player
    /// swaps the two; stepping onto a pile collects all of its gold, which
    /// ends the game if it was the last.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown or unplaced
    /// player, or when the step is blocked, and [`GameError::GameOver`]
    /// after the game ended. Nothing changes on error.
    pub fn move_player(&mut self, name: &str, direction: Direction) -> GameResult<MoveOutcome> {
        self.ensure_active()?;

        let player = self
            .players
            .get(name)
            .ok_or_else(|| GameError::invalid(format!("no player named {name}")))?;
        let (Some(id), Some(from)) = (player.id(), player.pos()) else {
            return Err(GameError::invalid(format!("{name} is not on the map")));
        };

        let (dx, dy) = direction.delta();
        let to = self
            .grid
            .offset(from, dx, dy)
            .filter(|&to| self.grid.is_walkable(to))
            .ok_or_else(|| GameError::invalid(format!("{name} cannot move {direction:?}")))?;

        // Validate the pickup before touching the map
        let pile = self.pile_positions.get(&to).copied();
        if let Some(pile) = pile {
            let amount = self.piles.get(pile).copied().unwrap_or(0);
            if amount > self.remaining_gold {
                return Err(GameError::invalid(format!(
                    "cannot take {amount} gold, only {} remains",
                    self.remaining_gold
                )));
            }
        }

        let mut outcome = MoveOutcome {
            steps: 1,
            ..MoveOutcome::default()
        };

        let occupant = self
            .grid
            .active_at(to)
            .filter(char::is_ascii_uppercase)
            .and_then(|other| self.players.find_by_id(other));
        if let Some(other) = occupant {
            let other_name = other.name().to_owned();
            let other_id = other.id().unwrap_or('?');
            self.grid.replace(from, other_id)?;
            self.grid.replace(to, id)?;
            self.relocate(&other_name, from)?;
            outcome.swapped_with = Some(other_id);
        } else {
            if let Some(pile) = pile {
                outcome.collected = self.collect_pile(name, pile)?;
                self.pile_positions.remove(&to);
            }
            self.grid.revert(from)?;
            self.grid.replace(to, id)?;
        }
        self.relocate(name, to)?;

        debug!(name, from, to, ?outcome, "player moved");
        Ok(outcome)
    }

    /// Move a player repeatedly until blocked, a swap happens, or the game
    /// ends.
    ///
    /// # Errors
    ///
    /// Returns an error if not even the first step is possible.
    pub fn sprint_player(&mut self, name: &str, direction: Direction) -> GameResult<MoveOutcome> {
        let mut total = self.move_player(name, direction)?;
        while total.swapped_with.is_none() && !self.is_over() {
            match self.move_player(name, direction) {
                Ok(step) => {
                    total.steps += step.steps;
                    total.collected += step.collected;
                    total.swapped_with = step.swapped_with;
                }
                Err(_) => break,
            }
        }
        Ok(total)
    }

    /// Apply a movement keystroke (see [`Direction::from_key`]).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown key, otherwise
    /// whatever the move returns.
    pub fn handle_key(&mut self, name: &str, key: char) -> GameResult<MoveOutcome> {
        match Direction::from_key(key) {
            Some((direction, true)) => self.sprint_player(name, direction),
            Some((direction, false)) => self.move_player(name, direction),
            None => Err(GameError::invalid(format!("unknown key {key:?}"))),
        }
    }

    /// Set a player's position and recompute their vision.
    fn relocate(&mut self, name: &str, pos: usize) -> GameResult<()> {
        let vision = compute(&self.grid, pos)?;
        if let Some(player) = self.players.get_mut(name) {
            player.set_pos(Some(pos));
            player.update_vision(vision);
        }
        Ok(())
    }

    /// Transfer a pile's gold to a player. Returns the amount collected.
    fn collect_pile(&mut self, name: &str, pile: usize) -> GameResult<u32> {
        let amount = self.piles.get(pile).copied().unwrap_or(0);
        let remaining = self.subtract_gold(amount)?;
        if let Some(size) = self.piles.get_mut(pile) {
            *size = 0;
        }
        let gold = self
            .players
            .get_mut(name)
            .map_or(0, |player| player.add_gold(amount));
        info!(name, pile, amount, gold, remaining, "gold collected");
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GOLD_TOTAL, Grid, Player};

    const MAP: &str = "+----+\n|....|\n|.##.|\n+----+\n";

    fn setup() -> Game {
        let grid = Grid::new(MAP).unwrap();
        let mut game = Game::new(vec![200, 50], grid).unwrap();
        game.add_player(Player::new("alice", "a")).unwrap();
        game.add_player(Player::new("bob", "b")).unwrap();
        game
    }

    fn pos(game: &Game, x: usize, y: usize) -> usize {
        game.grid().coordinates_to_pos(x, y).unwrap()
    }

    #[test]
    fn test_from_key() {
        assert_eq!(Direction::from_key('h'), Some((Direction::Left, false)));
        assert_eq!(Direction::from_key('N'), Some((Direction::DownRight, true)));
        assert_eq!(Direction::from_key('q'), None);
    }

    #[test]
    fn test_move_one_step() {
        let mut game = setup();
        let start = pos(&game, 1, 1);
        game.spawn_player("alice", start).unwrap();

        let outcome = game.move_player("alice", Direction::Right).unwrap();
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.collected, 0);
        assert_eq!(game.grid().active_at(start), Some('.'));
        assert_eq!(game.grid().active_at(pos(&game, 2, 1)), Some('A'));
        assert_eq!(game.player("alice").unwrap().pos(), Some(pos(&game, 2, 1)));
    }

    #[test]
    fn test_move_onto_passage() {
        let mut game = setup();
        game.spawn_player("alice", pos(&game, 2, 1)).unwrap();
        game.move_player("alice", Direction::Down).unwrap();
        assert_eq!(game.player("alice").unwrap().pos(), Some(pos(&game, 2, 2)));
    }

    #[test]
    fn test_move_blocked_by_wall() {
        let mut game = setup();
        let start = pos(&game, 1, 1);
        game.spawn_player("alice", start).unwrap();
        assert!(game.move_player("alice", Direction::Up).is_err());
        assert_eq!(game.player("alice").unwrap().pos(), Some(start));
        assert_eq!(game.grid().active_at(start), Some('A'));
    }

    #[test]
    fn test_move_unplaced_player() {
        let mut game = setup();
        assert!(game.move_player("alice", Direction::Right).is_err());
        assert!(game.move_player("nobody", Direction::Right).is_err());
    }

    #[test]
    fn test_collect_gold() {
        let mut game = setup();
        game.spawn_player("alice", pos(&game, 1, 1)).unwrap();
        game.place_pile(1, pos(&game, 2, 1)).unwrap();

        let outcome = game.move_player("alice", Direction::Right).unwrap();
        assert_eq!(outcome.collected, 50);
        assert_eq!(game.player("alice").unwrap().gold(), 50);
        assert_eq!(game.remaining_gold(), GOLD_TOTAL - 50);
        assert_eq!(game.piles()[1], 0);
        assert_eq!(game.pile_at(pos(&game, 2, 1)), None);
        assert_eq!(game.grid().active_at(pos(&game, 2, 1)), Some('A'));
    }

    #[test]
    fn test_last_pile_ends_game() {
        let mut game = setup();
        game.spawn_player("alice", pos(&game, 1, 1)).unwrap();
        game.place_pile(0, pos(&game, 2, 1)).unwrap();
        game.place_pile(1, pos(&game, 3, 1)).unwrap();

        let outcome = game.sprint_player("alice", Direction::Right).unwrap();
        assert_eq!(outcome.collected, GOLD_TOTAL);
        assert_eq!(outcome.steps, 2);
        assert!(game.is_over());
        assert_eq!(game.remaining_gold(), 0);
        assert_eq!(
            game.move_player("alice", Direction::Left),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_failed_pickup_changes_nothing() {
        let grid = Grid::new("+----+\n|....|\n+----+\n").unwrap();
        let mut game = Game::new(vec![GOLD_TOTAL], grid).unwrap();
        game.add_player(Player::new("alice", "a")).unwrap();
        game.spawn_player("alice", 8).unwrap();
        game.place_pile(0, 9).unwrap();
        game.subtract_gold(10).unwrap();

        assert!(matches!(
            game.move_player("alice", Direction::Right),
            Err(GameError::InvalidArgument { .. })
        ));
        assert_eq!(game.player("alice").unwrap().pos(), Some(8));
        assert_eq!(game.player("alice").unwrap().gold(), 0);
        assert_eq!(game.grid().active_at(8), Some('A'));
        assert_eq!(game.grid().active_at(9), Some('*'));
        assert_eq!(game.pile_at(9), Some(0));
        assert_eq!(game.piles()[0], GOLD_TOTAL);
        assert_eq!(game.remaining_gold(), GOLD_TOTAL - 10);
    }

    #[test]
    fn test_swap_players() {
        let mut game = setup();
        let a = pos(&game, 1, 1);
        let b = pos(&game, 2, 1);
        game.spawn_player("alice", a).unwrap();
        game.spawn_player("bob", b).unwrap();

        let outcome = game.move_player("alice", Direction::Right).unwrap();
        assert_eq!(outcome.swapped_with, Some('B'));
        assert_eq!(game.player("alice").unwrap().pos(), Some(b));
        assert_eq!(game.player("bob").unwrap().pos(), Some(a));
        assert_eq!(game.grid().active_at(a), Some('B'));
        assert_eq!(game.grid().active_at(b), Some('A'));
    }

    #[test]
    fn test_sprint_until_wall() {
        let mut game = setup();
        game.spawn_player("alice", pos(&game, 1, 1)).unwrap();
        let outcome = game.handle_key("alice", 'L').unwrap();
        assert_eq!(outcome.steps, 3);
        assert_eq!(game.player("alice").unwrap().pos(), Some(pos(&game, 4, 1)));
    }

    #[test]
    fn test_handle_unknown_key() {
        let mut game = setup();
        game.spawn_player("alice", pos(&game, 1, 1)).unwrap();
        assert!(game.handle_key("alice", 'x').is_err());
    }
}
