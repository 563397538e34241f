//! Game state management.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GameError, GameResult};
use crate::game::{Address, GOLD_TILE, Grid, Player, Roster, compute};

/// Total gold in every game.
pub const GOLD_TOTAL: u32 = 250;

/// Maximum number of non-spectator players in a game.
pub const MAX_PLAYERS: usize = 26;

/// Identifier preceding the first assigned one; players get `A`, `B`, ...
const DEFAULT_CHAR_ID: char = '@';

/// Header line of the end-of-game summary.
pub const SUMMARY_HEADER: &str = "QUIT GAME OVER:\n";

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Players may join, move, and collect gold.
    Active,
    /// All gold is collected or the game was ended; only summaries remain.
    Over,
}

/// Complete game state.
///
/// Owns the grid, the player roster, and the gold piles, and routes every
/// mutation through its methods so the three stay consistent.
#[derive(Debug, Clone)]
pub struct Game {
    /// The map.
    pub(crate) grid: Grid,
    /// Registered players, spectator included.
    pub(crate) players: Roster,
    /// Gold left in each pile, indexed by pile id.
    pub(crate) piles: Vec<u32>,
    /// Pile id at each map position holding gold.
    pub(crate) pile_positions: HashMap<usize, usize>,
    /// Gold not yet collected.
    pub(crate) remaining_gold: u32,
    /// Gold carried away by players who quit.
    pub(crate) banked_gold: u32,
    /// Number of non-spectator players that have joined.
    num_players: usize,
    /// Most recently assigned identifier.
    last_char_id: char,
    /// Lifecycle phase.
    pub(crate) phase: GamePhase,
}

impl Game {
    /// Create a game from pre-sized gold piles and a grid.
    ///
    /// Piles are not on the map until placed with [`Game::place_pile`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Construction`] if the piles do not add up to
    /// [`GOLD_TOTAL`].
    pub fn new(piles: Vec<u32>, grid: Grid) -> GameResult<Self> {
        let total: u64 = piles.iter().map(|&p| u64::from(p)).sum();
        if total != u64::from(GOLD_TOTAL) {
            return Err(GameError::construction(format!(
                "piles hold {total} gold, expected {GOLD_TOTAL}"
            )));
        }

        info!(
            num_piles = piles.len(),
            rows = grid.num_rows(),
            columns = grid.num_columns(),
            "game created"
        );

        Ok(Self {
            grid,
            players: Roster::new(),
            piles,
            pile_positions: HashMap::new(),
            remaining_gold: GOLD_TOTAL,
            banked_gold: 0,
            num_players: 0,
            last_char_id: DEFAULT_CHAR_ID,
            phase: GamePhase::Active,
        })
    }

    /// The map.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// File the map was loaded from.
    #[must_use]
    pub fn map_file(&self) -> Option<&Path> {
        self.grid.map_file()
    }

    /// Gold left in each pile.
    #[must_use]
    pub fn piles(&self) -> &[u32] {
        &self.piles
    }

    /// Number of piles.
    #[must_use]
    pub fn num_piles(&self) -> usize {
        self.piles.len()
    }

    /// Pile lying at `pos`, if any.
    #[must_use]
    pub fn pile_at(&self, pos: usize) -> Option<usize> {
        self.pile_positions.get(&pos).copied()
    }

    /// Gold not yet collected.
    #[must_use]
    pub const fn remaining_gold(&self) -> u32 {
        self.remaining_gold
    }

    /// Gold carried away by players who quit.
    #[must_use]
    pub const fn banked_gold(&self) -> u32 {
        self.banked_gold
    }

    /// Number of non-spectator players that have joined.
    #[must_use]
    pub const fn num_players(&self) -> usize {
        self.num_players
    }

    /// Most recently assigned identifier (`@` before anyone joins).
    #[must_use]
    pub const fn last_char_id(&self) -> char {
        self.last_char_id
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Whether the game is over.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// All registered players.
    #[must_use]
    pub const fn players(&self) -> &Roster {
        &self.players
    }

    /// Get a player by name.
    #[must_use]
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// Resolve an inbound message's address to its player.
    #[must_use]
    pub fn find_player_by_address(&self, address: &Address) -> Option<&Player> {
        self.players.find_by_address(address)
    }

    /// Register a player.
    ///
    /// Everyone except the spectator gets the next identifier in the
    /// alphabet. Returns the assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateName`] if the name is taken,
    /// [`GameError::GameFull`] once [`MAX_PLAYERS`] have joined, or
    /// [`GameError::GameOver`] after the game ended.
    pub fn add_player(&mut self, mut player: Player) -> GameResult<Option<char>> {
        self.ensure_active()?;
        if self.players.contains(player.name()) {
            warn!(name = player.name(), "join rejected: duplicate name");
            return Err(GameError::DuplicateName(player.name().to_owned()));
        }

        if player.is_spectator() {
            info!("spectator joined");
            self.players.insert(player);
            return Ok(None);
        }

        if self.num_players >= MAX_PLAYERS {
            warn!(name = player.name(), "join rejected: game full");
            return Err(GameError::GameFull { max: MAX_PLAYERS });
        }

        let id = next_char_id(self.last_char_id)
            .ok_or(GameError::GameFull { max: MAX_PLAYERS })?;
        player.set_id(id);
        info!(name = player.name(), %id, "player joined");
        self.players.insert(player);
        self.num_players += 1;
        self.last_char_id = id;
        Ok(Some(id))
    }

    /// Remove a player who quit.
    ///
    /// Their cell is restored and their gold is banked so the total stays
    /// conserved. Identifiers are never reused.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown name, or
    /// [`GameError::GameOver`] after the game ended.
    pub fn remove_player(&mut self, name: &str) -> GameResult<Player> {
        self.ensure_active()?;
        let player = self
            .players
            .remove(name)
            .ok_or_else(|| GameError::invalid(format!("no player named {name}")))?;
        if let Some(pos) = player.pos() {
            self.grid.revert(pos)?;
        }
        self.banked_gold += player.gold();
        info!(name, gold = player.gold(), "player left");
        Ok(player)
    }

    /// Subtract collected gold from the remaining total and return what is
    /// left. Reaching zero ends the game.
    ///
    /// This only moves the counter; [`Game::move_player`] uses it when a
    /// pile is picked up.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] if `amount` exceeds the
    /// remaining gold, or [`GameError::GameOver`] after the game ended.
    pub fn subtract_gold(&mut self, amount: u32) -> GameResult<u32> {
        self.ensure_active()?;
        self.remaining_gold = self.remaining_gold.checked_sub(amount).ok_or_else(|| {
            GameError::invalid(format!(
                "cannot take {amount} gold, only {} remains",
                self.remaining_gold
            ))
        })?;
        if self.remaining_gold == 0 {
            self.finish();
        }
        Ok(self.remaining_gold)
    }

    /// End the game by an external rule.
    pub fn finish(&mut self) {
        if self.phase == GamePhase::Active {
            info!(remaining_gold = self.remaining_gold, "game over");
            self.phase = GamePhase::Over;
        }
    }

    /// Replace the map.
    ///
    /// Piles and players whose cells are still walkable in the new map are
    /// redrawn there; the others are taken off the map (pile sizes are
    /// kept). Every player's vision is recomputed from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] after the game ended.
    pub fn set_grid(&mut self, grid: Grid) -> GameResult<()> {
        self.ensure_active()?;
        self.grid = grid;

        self.pile_positions.retain(|&pos, _| self.grid.is_walkable(pos));
        for &pos in self.pile_positions.keys() {
            self.grid.replace(pos, GOLD_TILE)?;
        }

        for player in self.players.values_mut() {
            player.reset_vision();
            let Some(pos) = player.pos() else {
                continue;
            };
            let free = self.grid.is_walkable(pos) && !self.pile_positions.contains_key(&pos);
            match player.id() {
                Some(id) if free => {
                    self.grid.replace(pos, id)?;
                    player.update_vision(compute(&self.grid, pos)?);
                }
                _ => player.set_pos(None),
            }
        }

        info!(rows = self.grid.num_rows(), columns = self.grid.num_columns(), "map replaced");
        Ok(())
    }

    /// Put a pile on the map.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] if the pile does not exist, is
    /// empty, is already placed, or `pos` is not a free walkable cell.
    pub fn place_pile(&mut self, pile: usize, pos: usize) -> GameResult<()> {
        self.ensure_active()?;
        match self.piles.get(pile) {
            None => return Err(GameError::invalid(format!("no pile {pile}"))),
            Some(0) => return Err(GameError::invalid(format!("pile {pile} is empty"))),
            Some(_) => {}
        }
        if self.pile_positions.values().any(|&p| p == pile) {
            return Err(GameError::invalid(format!("pile {pile} is already placed")));
        }
        self.ensure_free(pos)?;

        self.grid.replace(pos, GOLD_TILE)?;
        self.pile_positions.insert(pos, pile);
        debug!(pile, pos, "pile placed");
        Ok(())
    }

    /// Put a joined player on the map and compute their vision.
    ///
    /// A player already on the map is moved, restoring their old cell.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown name, for the
    /// spectator, or if `pos` is not a free walkable cell.
    pub fn spawn_player(&mut self, name: &str, pos: usize) -> GameResult<()> {
        self.ensure_active()?;
        self.ensure_free(pos)?;

        let player = self
            .players
            .get_mut(name)
            .ok_or_else(|| GameError::invalid(format!("no player named {name}")))?;
        let id = player
            .id()
            .ok_or_else(|| GameError::invalid(format!("{name} cannot be placed on the map")))?;
        let vision = compute(&self.grid, pos)?;

        if let Some(old) = player.pos() {
            self.grid.revert(old)?;
        }
        self.grid.replace(pos, id)?;
        player.set_pos(Some(pos));
        player.update_vision(vision);
        debug!(name, pos, "player spawned");
        Ok(())
    }

    /// Build the end-of-game report, one line per non-spectator player in
    /// join order.
    #[must_use]
    pub fn build_summary(&self) -> String {
        let mut summary = String::from(SUMMARY_HEADER);
        for player in self.players.iter().filter(|p| !p.is_spectator()) {
            summary.push_str(&player.summarize());
        }
        summary
    }

    /// Tear the game down, releasing the grid, players, and piles.
    pub fn close(self) {
        info!(
            players = self.players.len(),
            remaining_gold = self.remaining_gold,
            "game closed"
        );
    }

    /// Reject mutations once the game is over.
    pub(crate) fn ensure_active(&self) -> GameResult<()> {
        match self.phase {
            GamePhase::Active => Ok(()),
            GamePhase::Over => Err(GameError::GameOver),
        }
    }

    /// Check that `pos` is walkable and holds neither a player nor a pile.
    fn ensure_free(&self, pos: usize) -> GameResult<()> {
        if pos >= self.grid.len() {
            return Err(GameError::OutOfRange {
                pos,
                len: self.grid.len(),
            });
        }
        if !self.grid.is_walkable(pos) {
            return Err(GameError::invalid(format!("position {pos} is not walkable")));
        }
        if self.pile_positions.contains_key(&pos) || self.players.find_at(pos).is_some() {
            return Err(GameError::invalid(format!("position {pos} is occupied")));
        }
        Ok(())
    }
}

/// The identifier after `last`, if still a capital letter.
fn next_char_id(last: char) -> Option<char> {
    char::from_u32(u32::from(last) + 1).filter(char::is_ascii_uppercase)
}
