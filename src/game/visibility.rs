//! Line-of-sight computation over a grid.
//!
//! Visibility is decided by casting a ray from the observer to every other
//! cell. The ray is sampled once per unit step along its dominant axis; at
//! each step the line equation gives the coordinate on the minor axis,
//! which either lands exactly on a cell or falls between two adjacent
//! cells, in which case both are sampled. A step blocks the ray when every
//! sampled cell is a non-room tile, so a thin diagonal wall cannot be
//! slipped through by rounding.
//!
//! The minor coordinate is kept as an exact fraction (`minor * i / n`) so
//! that "lands on a cell" never depends on floating-point rounding.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GameError, GameResult};
use crate::game::Grid;

/// Visibility state of one map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Currently seen by the observer.
    Visible,
    /// Reached by a ray, but hidden behind an obstruction.
    NotVisible,
    /// Never reached.
    #[default]
    Unvisited,
}

/// One sampled cell along a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaySample {
    /// Step along the dominant axis, starting at 1 next to the observer.
    pub step: usize,
    /// Sampled position.
    pub pos: usize,
    /// Classification of the sample on this ray.
    pub state: Visibility,
}

/// Unit steps for the cardinal directions: up, down, left, right.
const CARDINALS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Cells sampled at one step of a ray.
#[derive(Debug, Clone, Copy)]
struct RayStep {
    /// Step index, starting at 1.
    index: usize,
    /// Whether this step reaches the ray's target.
    is_target: bool,
    /// Sampled positions; entries `0..count` are valid.
    cells: [usize; 2],
    /// Number of valid entries in `cells`.
    count: u8,
}

impl RayStep {
    /// The sampled positions.
    fn cells(&self) -> &[usize] {
        &self.cells[..usize::from(self.count)]
    }

    /// Whether this step obstructs everything beyond it.
    fn obstructs(&self, grid: &Grid) -> bool {
        self.count > 0 && self.cells().iter().all(|&pos| !grid.is_room(pos))
    }
}

/// Compute what an observer at `observer` can see.
///
/// The observer's own cell is always visible. Cells in the four cardinal
/// directions are classified by walking outward until the map edge. Every
/// other cell is classified by the ray from the observer to that cell.
/// Line terminators are never classified and stay [`Visibility::Unvisited`].
///
/// # Errors
///
/// Returns [`GameError::OutOfRange`] if `observer` is past the end of the
/// map, or [`GameError::InvalidArgument`] if it is a line terminator. No
/// visibility is computed in either case.
pub fn compute(grid: &Grid, observer: usize) -> GameResult<Vec<Visibility>> {
    let origin = observer_coordinates(grid, observer)?;

    let mut vision = vec![Visibility::Unvisited; grid.len()];
    vision[observer] = Visibility::Visible;

    for (dx, dy) in CARDINALS {
        scan_cardinal(grid, origin, (dx, dy), &mut vision);
    }

    for (target, cell) in vision.iter_mut().enumerate() {
        if *cell != Visibility::Unvisited {
            continue;
        }
        let Some(end) = grid.pos_to_coordinates(target) else {
            continue;
        };
        *cell = if line_of_sight(grid, origin, signed(end)) {
            Visibility::Visible
        } else {
            Visibility::NotVisible
        };
    }

    debug!(
        observer,
        visible = count(&vision, Visibility::Visible),
        "visibility computed"
    );
    Ok(vision)
}

/// Trace the ray from `observer` to `target`, classifying every sample.
///
/// Samples are visible until the first obstructing step, which is itself
/// visible; every sample after it is not visible. The last sample is the
/// target. Tracing from a cell to itself yields no samples.
///
/// # Errors
///
/// Returns an error if either endpoint is outside the map or on a line
/// terminator.
pub fn trace_ray(grid: &Grid, observer: usize, target: usize) -> GameResult<Vec<RaySample>> {
    let origin = observer_coordinates(grid, observer)?;
    let end = observer_coordinates(grid, target)?;

    let mut samples = Vec::new();
    let mut blocked = false;
    let _ = walk_ray(grid, origin, end, |step| {
        let state = if blocked {
            Visibility::NotVisible
        } else {
            Visibility::Visible
        };
        samples.extend(step.cells().iter().map(|&pos| RaySample {
            step: step.index,
            pos,
            state,
        }));
        blocked = blocked || step.obstructs(grid);
        ControlFlow::Continue(())
    });

    Ok(samples)
}

/// Count the cells in a given state.
#[must_use]
pub fn count(vision: &[Visibility], state: Visibility) -> usize {
    vision.iter().filter(|&&v| v == state).count()
}

/// Validate an observer position and return its signed coordinates.
fn observer_coordinates(grid: &Grid, pos: usize) -> GameResult<(isize, isize)> {
    if pos >= grid.len() {
        return Err(GameError::OutOfRange {
            pos,
            len: grid.len(),
        });
    }
    grid.pos_to_coordinates(pos)
        .map(signed)
        .ok_or_else(|| GameError::invalid(format!("position {pos} is a line terminator")))
}

// Map dimensions are far below `isize::MAX`.
#[allow(clippy::cast_possible_wrap)]
fn signed((x, y): (usize, usize)) -> (isize, isize) {
    (x as isize, y as isize)
}

/// Position of signed coordinates, if they fall inside the map.
fn cell_at(grid: &Grid, (x, y): (isize, isize)) -> Option<usize> {
    let x = usize::try_from(x).ok()?;
    let y = usize::try_from(y).ok()?;
    grid.coordinates_to_pos(x, y)
}

/// Walk from the observer to the map edge along one cardinal direction.
fn scan_cardinal(
    grid: &Grid,
    origin: (isize, isize),
    (dx, dy): (isize, isize),
    vision: &mut [Visibility],
) {
    let mut blocked = false;
    let mut at = (origin.0 + dx, origin.1 + dy);
    while let Some(pos) = cell_at(grid, at) {
        vision[pos] = if blocked {
            Visibility::NotVisible
        } else {
            Visibility::Visible
        };
        blocked = blocked || !grid.is_room(pos);
        at = (at.0 + dx, at.1 + dy);
    }
}

/// Whether nothing between `origin` and `end` obstructs the ray.
fn line_of_sight(grid: &Grid, origin: (isize, isize), end: (isize, isize)) -> bool {
    let flow = walk_ray(grid, origin, end, |step| {
        if !step.is_target && step.obstructs(grid) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    flow.is_continue()
}

/// Step along the dominant axis from `origin` to `end`, calling `visit`
/// with the cells sampled at each step.
///
/// With `n` steps on the dominant axis and a total offset `minor` on the
/// other axis, step `i` lies at minor offset `minor * i / n`. An exact
/// quotient samples one cell; otherwise the two cells on either side of the
/// line are sampled. Rays steeper than 45 degrees simply swap which axis is
/// dominant.
fn walk_ray<F>(
    grid: &Grid,
    origin: (isize, isize),
    end: (isize, isize),
    mut visit: F,
) -> ControlFlow<()>
where
    F: FnMut(RayStep) -> ControlFlow<()>,
{
    let (dx, dy) = (end.0 - origin.0, end.1 - origin.1);
    let steep = dy.abs() > dx.abs();
    let (major, minor) = if steep { (dy, dx) } else { (dx, dy) };
    let steps = major.abs();
    let direction = major.signum();

    let place = |along: isize, across: isize| {
        let at = if steep {
            (origin.0 + across, origin.1 + along)
        } else {
            (origin.0 + along, origin.1 + across)
        };
        cell_at(grid, at)
    };

    for i in 1..=steps {
        let numerator = minor * i;
        let floor = numerator.div_euclid(steps);
        let exact = numerator.rem_euclid(steps) == 0;

        let mut step = RayStep {
            index: i.unsigned_abs(),
            is_target: i == steps,
            cells: [0; 2],
            count: 0,
        };
        let offsets: &[isize] = if exact { &[0] } else { &[0, 1] };
        for &offset in offsets {
            if let Some(pos) = place(direction * i, floor + offset) {
                step.cells[usize::from(step.count)] = pos;
                step.count += 1;
            }
        }

        visit(step)?;
    }

    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str) -> Grid {
        Grid::new(text).unwrap()
    }

    fn at(grid: &Grid, x: usize, y: usize) -> usize {
        grid.coordinates_to_pos(x, y).unwrap()
    }

    #[test]
    fn test_open_room_all_visible() {
        let g = grid("...\n...\n...\n");
        let vision = compute(&g, at(&g, 1, 1)).unwrap();
        assert_eq!(count(&vision, Visibility::Visible), 9);
        // Terminators stay unclassified
        assert_eq!(count(&vision, Visibility::Unvisited), 3);
    }

    #[test]
    fn test_wall_blocks_column() {
        let g = grid("...\n.#.\n...\n...\n");
        let observer = at(&g, 1, 3);
        let vision = compute(&g, observer).unwrap();

        assert_eq!(vision[observer], Visibility::Visible);
        assert_eq!(vision[at(&g, 1, 2)], Visibility::Visible);
        assert_eq!(vision[at(&g, 1, 1)], Visibility::Visible);
        assert_eq!(vision[at(&g, 1, 0)], Visibility::NotVisible);
        // Seen past the wall's edge
        assert_eq!(vision[at(&g, 0, 0)], Visibility::Visible);
        assert_eq!(vision[at(&g, 2, 0)], Visibility::Visible);
    }

    #[test]
    fn test_room_walls_visible_from_inside() {
        let g = grid("+-----+\n|.....|\n|.....|\n+-----+\n");
        let vision = compute(&g, at(&g, 1, 1)).unwrap();
        for x in 0..7 {
            assert_eq!(vision[at(&g, x, 0)], Visibility::Visible, "top wall at x={x}");
            assert_eq!(vision[at(&g, x, 3)], Visibility::Visible, "bottom wall at x={x}");
        }
    }

    #[test]
    fn test_wall_hides_room_behind_it() {
        let g = grid(".....\n.....\n-----\n.....\n");
        let vision = compute(&g, at(&g, 2, 0)).unwrap();
        for x in 0..5 {
            assert_eq!(vision[at(&g, x, 2)], Visibility::Visible);
            assert_eq!(vision[at(&g, x, 3)], Visibility::NotVisible);
        }
    }

    #[test]
    fn test_straddled_walls_block_ray() {
        // Step 2 of the ray from (0,0) to (3,2) falls between (2,1) and (2,2)
        let g = grid("....\n..#.\n..#.\n");
        let samples = trace_ray(&g, at(&g, 0, 0), at(&g, 3, 2)).unwrap();
        let last = samples.last().unwrap();
        assert_eq!(last.pos, at(&g, 3, 2));
        assert_eq!(last.state, Visibility::NotVisible);
    }

    #[test]
    fn test_single_wall_straddle_does_not_block() {
        let g = grid("....\n.#..\n....\n");
        let samples = trace_ray(&g, at(&g, 0, 0), at(&g, 3, 2)).unwrap();
        assert!(samples.iter().all(|s| s.state == Visibility::Visible));
    }

    #[test]
    fn test_trace_samples_straddled_cells() {
        let g = grid("...\n...\n");
        let samples = trace_ray(&g, at(&g, 0, 0), at(&g, 2, 1)).unwrap();
        let positions: Vec<usize> = samples.iter().map(|s| s.pos).collect();
        // Step 1 straddles rows 0 and 1; step 2 is the target
        assert_eq!(positions, vec![at(&g, 1, 0), at(&g, 1, 1), at(&g, 2, 1)]);
        assert_eq!(samples[0].step, 1);
        assert_eq!(samples[1].step, 1);
        assert_eq!(samples[2].step, 2);
    }

    #[test]
    fn test_trace_to_self_is_empty() {
        let g = grid("...\n");
        assert!(trace_ray(&g, 1, 1).unwrap().is_empty());
    }

    #[test]
    fn test_steep_and_shallow_rays_symmetric() {
        let wide = grid(".....\n.....\n.#...\n");
        let tall = grid("...\n..#\n...\n...\n...\n");
        let wide_last = trace_ray(&wide, at(&wide, 0, 0), at(&wide, 4, 2)).unwrap();
        let tall_last = trace_ray(&tall, at(&tall, 0, 0), at(&tall, 2, 4)).unwrap();
        assert_eq!(wide_last.len(), tall_last.len());
        assert_eq!(
            wide_last.last().unwrap().state,
            tall_last.last().unwrap().state
        );
    }

    #[test]
    fn test_horizontal_scan_stops_at_row_end() {
        let g = grid("..\n..\n");
        let vision = compute(&g, at(&g, 1, 0)).unwrap();
        // The terminator right of the observer is never classified
        assert_eq!(vision[2], Visibility::Unvisited);
        assert_eq!(vision[at(&g, 0, 1)], Visibility::Visible);
    }

    #[test]
    fn test_compute_rejects_bad_observer() {
        let g = grid("...\n");
        assert!(matches!(compute(&g, 3), Err(GameError::InvalidArgument { .. })));
        assert!(matches!(compute(&g, 99), Err(GameError::OutOfRange { pos: 99, len: 4 })));
        assert!(trace_ray(&g, 0, 3).is_err());
    }
}
