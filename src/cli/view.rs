//! View command implementation.

use super::output::JsonView;
use super::{CliError, OutputFormat, load_map, print_json};
use nuggets::Visibility;
use nuggets::game::{compute, count, render_visibility};
use std::path::Path;

/// Execute the view command.
///
/// # Errors
///
/// Returns an error if the map cannot be loaded or (x, y) is off the map.
pub(crate) fn execute(
    map: &Path,
    x: usize,
    y: usize,
    format: OutputFormat,
) -> Result<(), CliError> {
    let grid = load_map(map)?;
    let observer = grid.coordinates_to_pos(x, y).ok_or_else(|| {
        CliError::new(format!(
            "({x}, {y}) is outside the {}x{} map",
            grid.num_columns(),
            grid.num_rows()
        ))
    })?;

    let vision = compute(&grid, observer)?;
    let rendered = render_visibility(&grid, &vision, observer);

    match format {
        OutputFormat::Text => {
            print!("{rendered}");
            println!();
            println!(
                "{} visible, {} hidden",
                count(&vision, Visibility::Visible),
                count(&vision, Visibility::NotVisible)
            );
        }
        OutputFormat::Json => print_json(&JsonView::new(x, y, &vision, &rendered))?,
    }

    Ok(())
}
