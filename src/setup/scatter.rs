//! Deterministic gold scattering.

// Pile arithmetic uses intentional casts between counts and RNG output
#![allow(clippy::cast_possible_truncation)]

use tracing::debug;

use crate::error::{GameError, GameResult};
use crate::game::{GOLD_TOTAL, Game, Grid};
use crate::setup::SetupConfig;

/// Deterministic PRNG using xorshift64.
#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate random index in [0, max).
    pub fn below(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as usize
    }

    /// Generate random count in [min, max].
    fn between(&mut self, min: usize, max: usize) -> usize {
        min + self.below(max - min + 1)
    }
}

/// Split the gold into piles and choose a room cell for each.
///
/// The pile count is drawn from `[min_piles, max_piles]`, capped by the
/// number of room tiles. Every pile holds at least one nugget and the sizes
/// add up to [`GOLD_TOTAL`]. Returns `(position, size)` pairs.
///
/// # Errors
///
/// Returns [`GameError::InvalidArgument`] for an empty or inverted pile
/// range, and [`GameError::Construction`] if the map has no room tiles.
pub fn scatter_gold(grid: &Grid, config: &SetupConfig) -> GameResult<Vec<(usize, u32)>> {
    if config.min_piles == 0 || config.min_piles > config.max_piles {
        return Err(GameError::invalid(format!(
            "bad pile range {}..={}",
            config.min_piles, config.max_piles
        )));
    }

    let mut rooms: Vec<usize> = grid.room_positions().collect();
    if rooms.is_empty() {
        return Err(GameError::construction("map has no room tiles for gold"));
    }

    let mut rng = Rng::new(config.seed);
    let count = rng
        .between(config.min_piles, config.max_piles)
        .min(rooms.len())
        .min(GOLD_TOTAL as usize);

    // Every pile starts with one nugget; the rest land one at a time
    let mut sizes = vec![1u32; count];
    for _ in count..GOLD_TOTAL as usize {
        sizes[rng.below(count)] += 1;
    }

    // Partial Fisher-Yates shuffle picks distinct cells
    for i in 0..count {
        let j = i + rng.below(rooms.len() - i);
        rooms.swap(i, j);
    }

    debug!(count, seed = config.seed, "gold scattered");
    Ok(rooms.into_iter().take(count).zip(sizes).collect())
}

/// Create a game on `grid` with gold scattered per `config`.
///
/// # Errors
///
/// Returns an error if scattering fails or the game cannot be created.
pub fn new_game(grid: Grid, config: &SetupConfig) -> GameResult<Game> {
    let piles = scatter_gold(&grid, config)?;
    let sizes = piles.iter().map(|&(_, size)| size).collect();
    let mut game = Game::new(sizes, grid)?;
    for (id, &(pos, _)) in piles.iter().enumerate() {
        game.place_pile(id, pos)?;
    }
    Ok(game)
}

/// Pick a free room cell (no player, no gold) for a new player.
///
/// Returns `None` if every room cell is taken.
#[must_use]
pub fn spawn_position(game: &Game, seed: u64) -> Option<usize> {
    let free: Vec<usize> = game
        .grid()
        .room_positions()
        .filter(|&pos| game.pile_at(pos).is_none() && game.players().find_at(pos).is_none())
        .collect();
    if free.is_empty() {
        return None;
    }
    let mut rng = Rng::new(seed);
    free.get(rng.below(free.len())).copied()
}
