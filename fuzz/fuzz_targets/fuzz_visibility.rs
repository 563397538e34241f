#![no_main]

//! Visibility fuzzer.
//!
//! Builds a grid from arbitrary map text and checks that computing vision
//! from any observer either fails cleanly or yields a well-formed map that
//! agrees with the traced ray to every cell.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nuggets::Grid;
use nuggets::Visibility;
use nuggets::game::{compute, trace_ray};

/// Structured input for visibility fuzzing.
#[derive(Arbitrary, Debug)]
struct VisibilityInput {
    /// Raw map text.
    map: String,
    /// Observer position (taken modulo the map length).
    observer: u16,
}

fuzz_target!(|input: VisibilityInput| {
    // Cap map size to keep each run fast
    if input.map.len() > 2048 {
        return;
    }
    let Ok(grid) = Grid::new(&input.map) else {
        return;
    };
    let observer = usize::from(input.observer) % grid.len();

    let vision = match compute(&grid, observer) {
        Ok(vision) => vision,
        Err(_) => {
            assert!(grid.is_terminator(observer));
            return;
        }
    };
    assert_eq!(vision.len(), grid.len());
    assert_eq!(vision[observer], Visibility::Visible);

    for (target, &state) in vision.iter().enumerate() {
        if grid.is_terminator(target) {
            assert_eq!(state, Visibility::Unvisited);
            continue;
        }
        let samples = trace_ray(&grid, observer, target).unwrap();
        if let Some(last) = samples.last() {
            assert_eq!(last.pos, target);
            assert_eq!(last.state, state, "ray to {target} disagrees");
        }
    }
});
