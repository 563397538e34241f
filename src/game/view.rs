//! Text rendering of what a player knows about the map.

use crate::error::{GameError, GameResult};
use crate::game::{Game, Grid, LINE_TERMINATOR, Visibility};

/// Marker for the viewing player's own cell.
pub const SELF_TILE: char = '@';

/// Marker for cells hidden behind an obstruction in a visibility map.
pub const HIDDEN_TILE: char = '~';

/// Blank for cells the viewer knows nothing about.
const UNKNOWN_TILE: char = ' ';

impl Game {
    /// Render the map as `name` currently knows it.
    ///
    /// Visible cells show the active map (gold and other players), cells
    /// seen earlier show the reference map, and everything else is blank.
    /// The viewer's own cell is `@`. The spectator sees the whole active
    /// map.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown name or a player
    /// who is not on the map yet.
    pub fn player_view(&self, name: &str) -> GameResult<String> {
        let player = self
            .player(name)
            .ok_or_else(|| GameError::invalid(format!("no player named {name}")))?;
        if player.is_spectator() {
            return Ok(self.grid.active_text());
        }
        let me = player
            .pos()
            .ok_or_else(|| GameError::invalid(format!("{name} is not on the map")))?;

        let vision = player.vision();
        let view = (0..self.grid.len())
            .map(|pos| {
                if self.grid.is_terminator(pos) {
                    LINE_TERMINATOR
                } else if pos == me {
                    SELF_TILE
                } else if vision.get(pos) == Some(&Visibility::Visible) {
                    self.grid.active_at(pos).unwrap_or(UNKNOWN_TILE)
                } else if player.has_discovered(pos) {
                    self.grid.reference_at(pos).unwrap_or(UNKNOWN_TILE)
                } else {
                    UNKNOWN_TILE
                }
            })
            .collect();
        Ok(view)
    }
}

/// Render a visibility map over the reference layout.
///
/// Visible cells show the map, hidden cells show `~`, unvisited cells are
/// blank, and the observer is `@`.
#[must_use]
pub fn render_visibility(grid: &Grid, vision: &[Visibility], observer: usize) -> String {
    grid.reference()
        .iter()
        .enumerate()
        .map(|(pos, &tile)| match vision.get(pos) {
            _ if tile == LINE_TERMINATOR => LINE_TERMINATOR,
            _ if pos == observer => SELF_TILE,
            Some(Visibility::Visible) => tile,
            Some(Visibility::NotVisible) => HIDDEN_TILE,
            Some(Visibility::Unvisited) | None => UNKNOWN_TILE,
        })
        .collect()
}
