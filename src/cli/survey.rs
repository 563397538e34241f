//! Survey command implementation.

use super::output::{JsonSurvey, format_survey};
use super::{CliError, OutputFormat, load_map, print_json};
use nuggets::game::{compute, count};
use nuggets::{GameResult, Grid, Visibility};
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

/// Execute the survey command.
///
/// Every room cell is an independent observer, so the visibility maps are
/// computed in parallel.
///
/// # Errors
///
/// Returns an error if the map cannot be loaded or the thread pool cannot
/// be built.
pub(crate) fn execute(
    map: &Path,
    threads: Option<usize>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let grid = load_map(map)?;

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = threads {
        pool = pool.num_threads(threads);
    }
    let pool = pool
        .build()
        .map_err(|e| CliError::new(format!("Failed to build thread pool: {e}")))?;

    let counts = pool.install(|| visible_counts(&grid))?;
    info!(rooms = counts.len(), "survey complete");
    let survey = summarize(&grid, &counts);

    match format {
        OutputFormat::Text => print!("{}", format_survey(&survey)),
        OutputFormat::Json => print_json(&survey)?,
    }

    Ok(())
}

/// Visible cell count from every room cell, in position order.
fn visible_counts(grid: &Grid) -> GameResult<Vec<(usize, usize)>> {
    let rooms: Vec<usize> = grid.room_positions().collect();
    rooms
        .par_iter()
        .map(|&pos| compute(grid, pos).map(|vision| (pos, count(&vision, Visibility::Visible))))
        .collect()
}

/// Reduce per-cell counts to min, max, mean, and the best vantage point.
#[allow(clippy::cast_precision_loss)]
fn summarize(grid: &Grid, counts: &[(usize, usize)]) -> JsonSurvey {
    let total: usize = counts.iter().map(|&(_, n)| n).sum();
    let best = counts.iter().max_by_key(|&&(pos, n)| (n, std::cmp::Reverse(pos)));
    JsonSurvey {
        rooms: counts.len(),
        min_visible: counts.iter().map(|&(_, n)| n).min().unwrap_or(0),
        max_visible: best.map_or(0, |&(_, n)| n),
        mean_visible: if counts.is_empty() {
            0.0
        } else {
            total as f64 / counts.len() as f64
        },
        best: best.and_then(|&(pos, _)| grid.pos_to_coordinates(pos)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_room_survey() {
        let grid = Grid::new("+--+\n|..|\n+--+\n").unwrap();
        let counts = visible_counts(&grid).unwrap();
        assert_eq!(counts.len(), 2);
        let survey = summarize(&grid, &counts);
        assert_eq!(survey.rooms, 2);
        // A closed room sees every one of its cells
        assert_eq!(survey.min_visible, 12);
        assert_eq!(survey.max_visible, 12);
        assert_eq!(survey.best, Some((1, 1)));
    }

    #[test]
    fn test_survey_without_rooms() {
        let grid = Grid::new("+--+\n+--+\n").unwrap();
        let counts = visible_counts(&grid).unwrap();
        let survey = summarize(&grid, &counts);
        assert_eq!(survey.rooms, 0);
        assert_eq!(survey.best, None);
    }
}
