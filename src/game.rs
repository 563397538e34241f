//! Game layer.
//!
//! The world model of the game:
//! - Grid holding the reference and active map layouts
//! - Line-of-sight visibility from any map cell
//! - Players and the name-keyed roster
//! - The coordinator owning grid, players, and gold

mod grid;
mod invariants;
mod movement;
mod player;
mod roster;
mod state;
mod view;
mod visibility;

pub use grid::{GOLD_TILE, Grid, LINE_TERMINATOR, PASSAGE_TILE, ROOM_TILE};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use movement::{Direction, MoveOutcome};
pub use player::{Address, Player, SPECTATOR_NAME};
pub use roster::Roster;
pub use state::{GOLD_TOTAL, Game, GamePhase, MAX_PLAYERS, SUMMARY_HEADER};
pub use view::{HIDDEN_TILE, SELF_TILE, render_visibility};
pub use visibility::{RaySample, Visibility, compute, count, trace_ray};
