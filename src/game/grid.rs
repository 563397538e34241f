//! Map grid with a reference layout and an active layout.
//!
//! Both layouts are flattened rows of characters, each row followed by a
//! line terminator. A position is an offset into that flattened text:
//! `pos = y * (num_columns + 1) + x`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GameError, GameResult};

/// An open room tile. The only tile that does not block sight.
pub const ROOM_TILE: char = '.';

/// A passage tile. Walkable, but blocks sight like a wall.
pub const PASSAGE_TILE: char = '#';

/// Marker drawn on the active map where gold lies.
pub const GOLD_TILE: char = '*';

/// Line terminator ending every row.
pub const LINE_TERMINATOR: char = '\n';

/// Padding used to square off short rows.
const BLANK_TILE: char = ' ';

/// The game map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Originally loaded layout, never mutated.
    reference: Vec<char>,
    /// Rendered layout with gold and players drawn on it.
    active: Vec<char>,
    /// Number of rows (line terminators).
    num_rows: usize,
    /// Length of the longest row, terminator excluded.
    num_columns: usize,
    /// File the map was loaded from, if any.
    map_file: Option<PathBuf>,
}

impl Grid {
    /// Build a grid from map text.
    ///
    /// A missing final line terminator is added and rows shorter than the
    /// longest one are padded with blanks, so every position inside the
    /// `num_columns x num_rows` rectangle maps to exactly one cell.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Construction`] if the text has no rows or no
    /// columns, or if a row contains a stray carriage return.
    pub fn new(text: &str) -> GameResult<Self> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.chars().collect())
            .collect();

        let num_rows = rows.len();
        let num_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if num_rows == 0 || num_columns == 0 {
            return Err(GameError::construction("map has no tiles"));
        }

        let mut reference = Vec::with_capacity(num_rows * (num_columns + 1));
        for row in &rows {
            if row.contains(&'\r') {
                return Err(GameError::construction("map contains a stray carriage return"));
            }
            reference.extend_from_slice(row);
            reference.extend(std::iter::repeat_n(BLANK_TILE, num_columns - row.len()));
            reference.push(LINE_TERMINATOR);
        }

        debug!(num_rows, num_columns, len = reference.len(), "grid created");

        Ok(Self {
            active: reference.clone(),
            reference,
            num_rows,
            num_columns,
            map_file: None,
        })
    }

    /// Load a grid from a map file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Construction`] if the file cannot be read or
    /// holds no map.
    pub fn load(path: &Path) -> GameResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            GameError::construction(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut grid = Self::new(&text)?;
        grid.map_file = Some(path.to_path_buf());
        Ok(grid)
    }

    /// Number of rows.
    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns (longest row, terminator excluded).
    #[must_use]
    pub const fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Distance between vertically adjacent cells.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.num_columns + 1
    }

    /// Total length of the flattened map, terminators included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// Whether the map is empty. Never true for a constructed grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// File the map was loaded from.
    #[must_use]
    pub fn map_file(&self) -> Option<&Path> {
        self.map_file.as_deref()
    }

    /// The immutable reference layout.
    #[must_use]
    pub fn reference(&self) -> &[char] {
        &self.reference
    }

    /// The active layout.
    #[must_use]
    pub fn active(&self) -> &[char] {
        &self.active
    }

    /// The reference layout as text.
    #[must_use]
    pub fn reference_text(&self) -> String {
        self.reference.iter().collect()
    }

    /// The active layout as text.
    #[must_use]
    pub fn active_text(&self) -> String {
        self.active.iter().collect()
    }

    /// Reference character at `pos`.
    #[must_use]
    pub fn reference_at(&self, pos: usize) -> Option<char> {
        self.reference.get(pos).copied()
    }

    /// Active character at `pos`.
    #[must_use]
    pub fn active_at(&self, pos: usize) -> Option<char> {
        self.active.get(pos).copied()
    }

    /// Whether `pos` holds a line terminator.
    #[must_use]
    pub fn is_terminator(&self, pos: usize) -> bool {
        self.reference_at(pos) == Some(LINE_TERMINATOR)
    }

    /// Whether `pos` is an open room tile in the reference layout.
    #[must_use]
    pub fn is_room(&self, pos: usize) -> bool {
        self.reference_at(pos) == Some(ROOM_TILE)
    }

    /// Whether a player may stand on `pos` (room or passage).
    #[must_use]
    pub fn is_walkable(&self, pos: usize) -> bool {
        matches!(self.reference_at(pos), Some(ROOM_TILE | PASSAGE_TILE))
    }

    /// All open room positions, in map order.
    pub fn room_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.reference
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == ROOM_TILE)
            .map(|(pos, _)| pos)
    }

    /// Convert a position to `(x, y)` coordinates.
    ///
    /// Returns `None` for positions past the end or on a line terminator.
    #[must_use]
    pub fn pos_to_coordinates(&self, pos: usize) -> Option<(usize, usize)> {
        if pos >= self.len() {
            return None;
        }
        let x = pos % self.stride();
        let y = pos / self.stride();
        (x < self.num_columns).then_some((x, y))
    }

    /// Convert `(x, y)` coordinates to a position.
    ///
    /// Returns `None` for coordinates outside the map rectangle.
    #[must_use]
    pub fn coordinates_to_pos(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.num_columns && y < self.num_rows).then(|| y * self.stride() + x)
    }

    /// Position one step of `(dx, dy)` away from `pos`, if still on the map.
    #[must_use]
    pub fn offset(&self, pos: usize, dx: isize, dy: isize) -> Option<usize> {
        let (x, y) = self.pos_to_coordinates(pos)?;
        let x = x.checked_add_signed(dx)?;
        let y = y.checked_add_signed(dy)?;
        self.coordinates_to_pos(x, y)
    }

    /// Overwrite the active character at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfRange`] for `pos` outside the map, and
    /// [`GameError::InvalidArgument`] when `pos` is a line terminator or
    /// `ch` is one, since either would break the row geometry.
    pub fn replace(&mut self, pos: usize, ch: char) -> GameResult<()> {
        self.check_cell(pos)?;
        if ch == LINE_TERMINATOR {
            return Err(GameError::invalid("cannot draw a line terminator"));
        }
        self.active[pos] = ch;
        Ok(())
    }

    /// Restore the active character at `pos` from the reference layout.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfRange`] for `pos` outside the map.
    pub fn revert(&mut self, pos: usize) -> GameResult<()> {
        let len = self.len();
        let original = *self
            .reference
            .get(pos)
            .ok_or(GameError::OutOfRange { pos, len })?;
        self.active[pos] = original;
        Ok(())
    }

    /// Check that `pos` is an in-range, non-terminator cell.
    fn check_cell(&self, pos: usize) -> GameResult<()> {
        if pos >= self.len() {
            return Err(GameError::OutOfRange {
                pos,
                len: self.len(),
            });
        }
        if self.is_terminator(pos) {
            return Err(GameError::invalid(format!("position {pos} is a line terminator")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "+---+\n|...|\n|.#.|\n+---+\n";

    #[test]
    fn test_grid_geometry() {
        let grid = Grid::new(ROOM).unwrap();
        assert_eq!(grid.num_rows(), 4);
        assert_eq!(grid.num_columns(), 5);
        assert_eq!(grid.len(), ROOM.len());
        assert_eq!(grid.reference_text(), ROOM);
        assert_eq!(grid.active_text(), ROOM);
    }

    #[test]
    fn test_grid_pads_short_rows() {
        let grid = Grid::new("...\n.\n..").unwrap();
        assert_eq!(grid.num_rows(), 3);
        assert_eq!(grid.num_columns(), 3);
        assert_eq!(grid.reference_text(), "...\n.  \n.. \n");
    }

    #[test]
    fn test_grid_rejects_empty() {
        assert!(matches!(Grid::new(""), Err(GameError::Construction { .. })));
        assert!(matches!(Grid::new("\n\n"), Err(GameError::Construction { .. })));
    }

    #[test]
    fn test_coordinates() {
        let grid = Grid::new(ROOM).unwrap();
        assert_eq!(grid.pos_to_coordinates(7), Some((1, 1)));
        assert_eq!(grid.coordinates_to_pos(1, 1), Some(7));
        // Terminator of the first row
        assert_eq!(grid.pos_to_coordinates(5), None);
        assert_eq!(grid.coordinates_to_pos(5, 0), None);
        assert_eq!(grid.coordinates_to_pos(0, 4), None);
        assert_eq!(grid.pos_to_coordinates(grid.len()), None);
    }

    #[test]
    fn test_offset() {
        let grid = Grid::new(ROOM).unwrap();
        assert_eq!(grid.offset(7, 1, 1), Some(14));
        assert_eq!(grid.offset(7, -1, -1), Some(0));
        assert_eq!(grid.offset(0, -1, 0), None);
        assert_eq!(grid.offset(4, 1, 0), None);
    }

    #[test]
    fn test_replace_and_revert() {
        let mut grid = Grid::new(ROOM).unwrap();
        grid.replace(7, 'A').unwrap();
        assert_eq!(grid.active_at(7), Some('A'));
        assert_eq!(grid.reference_at(7), Some('.'));

        grid.revert(7).unwrap();
        assert_eq!(grid.active_at(7), Some('.'));
        grid.revert(7).unwrap();
        assert_eq!(grid.active_at(7), Some('.'));
    }

    #[test]
    fn test_replace_out_of_range() {
        let mut grid = Grid::new(ROOM).unwrap();
        let len = grid.len();
        assert_eq!(
            grid.replace(len, 'A'),
            Err(GameError::OutOfRange { pos: len, len })
        );
        assert_eq!(grid.revert(len + 3), Err(GameError::OutOfRange { pos: len + 3, len }));
        assert_eq!(grid.active_text(), ROOM);
    }

    #[test]
    fn test_replace_rejects_terminators() {
        let mut grid = Grid::new(ROOM).unwrap();
        assert!(grid.replace(5, 'A').is_err());
        assert!(grid.replace(7, '\n').is_err());
        assert_eq!(grid.active_text(), ROOM);
    }

    #[test]
    fn test_tile_classes() {
        let grid = Grid::new(ROOM).unwrap();
        assert!(grid.is_room(7));
        assert!(!grid.is_room(0));
        assert!(grid.is_walkable(14));
        assert!(!grid.is_room(14));
        assert!(grid.is_terminator(5));
        assert_eq!(grid.room_positions().count(), 5);
    }

    #[test]
    fn test_load_remembers_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.txt");
        fs::write(&path, ROOM).unwrap();

        let grid = Grid::load(&path).unwrap();
        assert_eq!(grid.map_file(), Some(path.as_path()));
        assert_eq!(grid.num_rows(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Grid::load(Path::new("/nonexistent/map.txt"));
        assert!(matches!(result, Err(GameError::Construction { .. })));
    }
}
