//! Game setup: gold pile sizing and placement.
//!
//! The coordinator never decides where gold goes. This module plays that
//! external role, deterministically from a seed.

mod scatter;

use serde::{Deserialize, Serialize};

pub use scatter::{Rng, new_game, scatter_gold, spawn_position};

/// Configuration for setting up a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Random seed for pile sizes and positions.
    pub seed: u64,
    /// Fewest piles to scatter.
    pub min_piles: usize,
    /// Most piles to scatter.
    pub max_piles: usize,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            min_piles: 10,
            max_piles: 30,
        }
    }
}
