// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Nuggets: the authoritative world model of a grid-based multiplayer
//! gold-collecting game.
//!
//! This crate stores the map, tracks every player's gold and position, and
//! computes what each player can currently see.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Setup (pile sizes + placement)    │
//! ├─────────────────────────────────────┤
//! │   Game coordinator (players, gold)  │
//! ├─────────────────────────────────────┤
//! │   Visibility (line of sight)        │
//! ├─────────────────────────────────────┤
//! │   Grid (reference + active map)     │
//! └─────────────────────────────────────┘
//! ```
//!
//! The core is single-threaded and never blocks. An embedding server must
//! serialize all calls into one [`Game`].

pub mod error;
pub mod game;
pub mod setup;

pub use error::{GameError, GameResult};

// Re-export key game types at crate root for convenience
pub use game::{Address, Direction, Game, GamePhase, Grid, MoveOutcome, Player, Visibility};
pub use setup::{SetupConfig, new_game, scatter_gold};
