//! Output formatting utilities for CLI.

use nuggets::game::count;
use nuggets::{Game, Visibility};
use serde::Serialize;

/// JSON-serializable visibility map of one observer.
#[derive(Debug, Serialize)]
pub(super) struct JsonView {
    /// Observer column.
    pub(super) x: usize,
    /// Observer row.
    pub(super) y: usize,
    /// Cells the observer can see.
    pub(super) visible: usize,
    /// Cells blocked from view.
    pub(super) not_visible: usize,
    /// Cells never classified.
    pub(super) unvisited: usize,
    /// Rendered rows.
    pub(super) rows: Vec<String>,
}

impl JsonView {
    /// Create from a computed visibility map and its rendering.
    pub(super) fn new(x: usize, y: usize, vision: &[Visibility], rendered: &str) -> Self {
        Self {
            x,
            y,
            visible: count(vision, Visibility::Visible),
            not_visible: count(vision, Visibility::NotVisible),
            unvisited: count(vision, Visibility::Unvisited),
            rows: rendered.lines().map(str::to_owned).collect(),
        }
    }
}

/// JSON-serializable survey of every room cell.
#[derive(Debug, Serialize)]
pub(super) struct JsonSurvey {
    /// Number of room cells surveyed.
    pub(super) rooms: usize,
    /// Fewest cells visible from any room cell.
    pub(super) min_visible: usize,
    /// Most cells visible from any room cell.
    pub(super) max_visible: usize,
    /// Mean cells visible per room cell.
    pub(super) mean_visible: f64,
    /// Coordinates of the room cell with the widest view.
    pub(super) best: Option<(usize, usize)>,
}

/// JSON-serializable outcome of a simulated game.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimulation {
    /// Random seed used.
    pub(super) seed: u64,
    /// Moves attempted.
    pub(super) moves: u32,
    /// Whether every pile was collected.
    pub(super) all_collected: bool,
    /// Gold left on the map.
    pub(super) remaining_gold: u32,
    /// Per-player results in join order.
    pub(super) players: Vec<JsonPlayerResult>,
}

/// JSON-serializable player result.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayerResult {
    /// Player identifier.
    pub(super) id: char,
    /// Player name.
    pub(super) name: String,
    /// Gold collected.
    pub(super) gold: u32,
}

impl JsonSimulation {
    /// Create from a finished game.
    pub(super) fn from_game(game: &Game, seed: u64, moves: u32) -> Self {
        Self {
            seed,
            moves,
            all_collected: game.remaining_gold() == 0,
            remaining_gold: game.remaining_gold(),
            players: game
                .players()
                .iter()
                .filter_map(|p| {
                    p.id().map(|id| JsonPlayerResult {
                        id,
                        name: p.name().to_owned(),
                        gold: p.gold(),
                    })
                })
                .collect(),
        }
    }
}

/// Format a survey as human-readable text.
pub(super) fn format_survey(survey: &JsonSurvey) -> String {
    let mut output = format!("Surveyed {} room cells\n", survey.rooms);
    output.push_str(&format!("  Min visible:  {}\n", survey.min_visible));
    output.push_str(&format!("  Max visible:  {}\n", survey.max_visible));
    output.push_str(&format!("  Mean visible: {:.1}\n", survey.mean_visible));
    if let Some((x, y)) = survey.best {
        output.push_str(&format!("  Best vantage: ({x}, {y})\n"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuggets::Grid;
    use nuggets::game::compute;

    #[test]
    fn test_json_view_counts() {
        let grid = Grid::new("...\n.#.\n...\n").unwrap();
        let vision = compute(&grid, 7).unwrap();
        let view = JsonView::new(1, 2, &vision, ".~.\n.#.\n.@.\n");
        assert_eq!(view.visible + view.not_visible + view.unvisited, 12);
        assert_eq!(view.not_visible, 1);
        assert_eq!(view.rows, vec![".~.", ".#.", ".@."]);
    }

    #[test]
    fn test_format_survey_without_rooms() {
        let survey = JsonSurvey {
            rooms: 0,
            min_visible: 0,
            max_visible: 0,
            mean_visible: 0.0,
            best: None,
        };
        let text = format_survey(&survey);
        assert!(text.starts_with("Surveyed 0 room cells"));
        assert!(!text.contains("Best vantage"));
    }
}
