//! Terminal grid state buffer and cursor tracking.

use glyphterm_core::{Cell, Dimensions, Position};

/// Cursor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Current position
    pub position: Position,
    /// Visibility (DECTCEM)
    pub visible: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: Position::origin(),
            visible: true,
        }
    }
}

/// Fixed-size grid of packed cells with per-row change tracking.
#[derive(Debug)]
pub struct Grid {
    /// Cell storage (row-major order)
    cells: Vec<Cell>,
    /// Grid dimensions
    dimensions: Dimensions,
    /// Cursor state
    cursor: Cursor,
    /// Saved cursor (for save/restore operations)
    saved_cursor: Option<Cursor>,
    /// Rows changed since the last `take_dirty_rows`
    dirty_rows: Vec<bool>,
}

impl Grid {
    /// Create a new grid with the given dimensions.
    ///
    /// All cells are initialized to blank.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            cells: vec![Cell::blank(); dimensions.cell_count()],
            dimensions,
            cursor: Cursor::default(),
            saved_cursor: None,
            dirty_rows: vec![false; dimensions.rows as usize],
        }
    }

    fn index(&self, row: u16, col: u16) -> Option<usize> {
        if row < self.dimensions.rows && col < self.dimensions.cols {
            Some(row as usize * self.dimensions.cols as usize + col as usize)
        } else {
            None
        }
    }

    /// Get cell at position.
    ///
    /// Returns None if position is out of bounds.
    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Overwrite the cell at a position, marking its row dirty.
    ///
    /// Out-of-bounds positions are ignored.
    pub fn set_cell(&mut self, row: u16, col: u16, cell: Cell) {
        if let Some(idx) = self.index(row, col) {
            if self.cells[idx] != cell {
                self.cells[idx] = cell;
                self.dirty_rows[row as usize] = true;
            }
        }
    }

    /// Get entire row as a slice.
    ///
    /// Returns None if row is out of bounds.
    pub fn row(&self, row: u16) -> Option<&[Cell]> {
        if row < self.dimensions.rows {
            let start = row as usize * self.dimensions.cols as usize;
            let end = start + self.dimensions.cols as usize;
            Some(&self.cells[start..end])
        } else {
            None
        }
    }

    /// Glyphs of a row as text, trailing blanks trimmed.
    pub fn row_text(&self, row: u16) -> String {
        self.row(row)
            .map(|cells| {
                cells
                    .iter()
                    .map(|cell| cell.glyph() as char)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .unwrap_or_default()
    }

    /// Convert entire grid to plain text, one line per row.
    pub fn to_plain_text(&self) -> String {
        (0..self.dimensions.rows)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get cursor reference.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Get mutable cursor reference.
    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Move the cursor, clamping to the grid.
    pub fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor.position = Position::new(
            row.min(self.dimensions.rows.saturating_sub(1)),
            col.min(self.dimensions.cols.saturating_sub(1)),
        );
    }

    /// Get dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Save current cursor state.
    pub fn save_cursor(&mut self) {
        self.saved_cursor = Some(self.cursor.clone());
    }

    /// Restore saved cursor state.
    pub fn restore_cursor(&mut self) {
        if let Some(saved) = self.saved_cursor.take() {
            self.cursor = saved;
        }
    }

    /// Blank the columns `from..to` of a row.
    pub fn clear_cols(&mut self, row: u16, from: u16, to: u16) {
        for col in from..to.min(self.dimensions.cols) {
            self.set_cell(row, col, Cell::blank());
        }
    }

    /// Blank whole rows `from..to`.
    pub fn clear_rows(&mut self, from: u16, to: u16) {
        let cols = self.dimensions.cols;
        for row in from..to.min(self.dimensions.rows) {
            self.clear_cols(row, 0, cols);
        }
    }

    /// Clear the entire grid.
    pub fn clear(&mut self) {
        self.clear_rows(0, self.dimensions.rows);
    }

    /// Shift every row up by `n`, blanking the rows exposed at the bottom.
    pub fn scroll_up(&mut self, n: u16) {
        let n = n.min(self.dimensions.rows) as usize;
        if n == 0 {
            return;
        }
        let shift = n * self.dimensions.cols as usize;
        self.cells.rotate_left(shift);
        let len = self.cells.len();
        self.cells[len - shift..].fill(Cell::blank());
        self.dirty_rows.fill(true);
    }

    /// Shift every row down by `n`, blanking the rows exposed at the top.
    pub fn scroll_down(&mut self, n: u16) {
        let n = n.min(self.dimensions.rows) as usize;
        if n == 0 {
            return;
        }
        let shift = n * self.dimensions.cols as usize;
        self.cells.rotate_right(shift);
        self.cells[..shift].fill(Cell::blank());
        self.dirty_rows.fill(true);
    }

    /// Number of rows changed since the last call, then reset tracking.
    pub fn take_dirty_rows(&mut self) -> usize {
        let count = self.dirty_rows.iter().filter(|&&dirty| dirty).count();
        self.dirty_rows.fill(false);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(grid: &mut Grid, glyph: u8) {
        let dims = grid.dimensions();
        for row in 0..dims.rows {
            for col in 0..dims.cols {
                grid.set_cell(row, col, Cell::new(glyph, 0));
            }
        }
    }

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(Dimensions::new(25, 80));
        assert_eq!(grid.dimensions(), Dimensions::new(25, 80));
        assert_eq!(grid.cursor().position, Position::origin());
        assert!(grid.cursor().visible);
        assert!(grid.cell(24, 79).unwrap().is_blank());
    }

    #[test]
    fn test_grid_cell_access() {
        let mut grid = Grid::new(Dimensions::new(10, 10));

        grid.set_cell(5, 5, Cell::new(b'X', 7));
        let cell = grid.cell(5, 5).unwrap();
        assert_eq!(cell.glyph(), b'X');
        assert_eq!(cell.attribute(), 7);

        // Out of bounds
        assert!(grid.cell(10, 10).is_none());
        grid.set_cell(10, 0, Cell::new(b'Y', 0));
    }

    #[test]
    fn test_dirty_rows_tracking() {
        let mut grid = Grid::new(Dimensions::new(5, 5));
        grid.set_cell(1, 0, Cell::new(b'a', 0));
        grid.set_cell(1, 1, Cell::new(b'b', 0));
        grid.set_cell(3, 4, Cell::new(b'c', 0));

        assert_eq!(grid.take_dirty_rows(), 2);
        assert_eq!(grid.take_dirty_rows(), 0);
    }

    #[test]
    fn test_rewriting_same_cell_is_not_dirty() {
        let mut grid = Grid::new(Dimensions::new(2, 2));
        grid.set_cell(0, 0, Cell::blank());
        assert_eq!(grid.take_dirty_rows(), 0);
    }

    #[test]
    fn test_row_text() {
        let mut grid = Grid::new(Dimensions::new(3, 10));
        for (i, b) in b"HELLO".iter().enumerate() {
            grid.set_cell(1, i as u16, Cell::new(*b, 0));
        }
        assert_eq!(grid.row_text(1), "HELLO");
        assert_eq!(grid.row_text(0), "");
        assert_eq!(grid.row_text(9), "");
        assert_eq!(grid.to_plain_text(), "\nHELLO\n");
    }

    #[test]
    fn test_move_cursor_clamps() {
        let mut grid = Grid::new(Dimensions::new(5, 10));
        grid.move_cursor(100, 100);
        assert_eq!(grid.cursor().position, Position::new(4, 9));
    }

    #[test]
    fn test_cursor_save_restore() {
        let mut grid = Grid::new(Dimensions::new(25, 80));
        grid.move_cursor(10, 20);
        grid.save_cursor();
        grid.move_cursor(5, 5);
        grid.restore_cursor();
        assert_eq!(grid.cursor().position, Position::new(10, 20));
    }

    #[test]
    fn test_scroll_up() {
        let mut grid = Grid::new(Dimensions::new(3, 2));
        grid.set_cell(0, 0, Cell::new(b'a', 0));
        grid.set_cell(1, 0, Cell::new(b'b', 0));
        grid.set_cell(2, 0, Cell::new(b'c', 0));
        grid.take_dirty_rows();

        grid.scroll_up(1);
        assert_eq!(grid.row_text(0), "b");
        assert_eq!(grid.row_text(1), "c");
        assert_eq!(grid.row_text(2), "");
        assert_eq!(grid.take_dirty_rows(), 3);
    }

    #[test]
    fn test_scroll_down() {
        let mut grid = Grid::new(Dimensions::new(3, 2));
        grid.set_cell(0, 0, Cell::new(b'a', 0));
        grid.set_cell(1, 0, Cell::new(b'b', 0));

        grid.scroll_down(1);
        assert_eq!(grid.row_text(0), "");
        assert_eq!(grid.row_text(1), "a");
        assert_eq!(grid.row_text(2), "b");
    }

    #[test]
    fn test_grid_clear() {
        let mut grid = Grid::new(Dimensions::new(5, 5));
        fill(&mut grid, b'X');
        grid.clear();
        for row in 0..5 {
            for col in 0..5 {
                assert!(grid.cell(row, col).unwrap().is_blank());
            }
        }
    }

    #[test]
    fn test_clear_cols() {
        let mut grid = Grid::new(Dimensions::new(2, 5));
        fill(&mut grid, b'X');
        grid.clear_cols(0, 2, 99);
        assert_eq!(grid.row_text(0), "XX");
        assert_eq!(grid.row_text(1), "XXXXX");
    }
}
