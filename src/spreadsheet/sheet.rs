use crate::spreadsheet::cell::Cell;

/// A worksheet read into memory as a sparse list of non-empty cells.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells, in row-major order once finished
    pub(crate) cells: Vec<Cell>,
    /// Used column range, determined from the cells
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell and widens the used column range to cover it.
    pub(crate) fn push(&mut self, cell: Cell) {
        if self.col_lower_bound.map(|col_lower_bound| cell.col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(cell.col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < cell.col).unwrap_or(true) {
            self.col_upper_bound = Some(cell.col);
        }
        self.cells.push(cell);
    }

    /// Sorts the cells into row-major order; a later duplicate position replaces an earlier one.
    pub(crate) fn finish(&mut self) {
        self.cells.sort_by_key(|cell| (cell.row, cell.col));
        // sort is stable: among equal positions the last pushed cell comes last
        let mut cells: Vec<Cell> = Vec::with_capacity(self.cells.len());
        for cell in self.cells.drain(..) {
            match cells.last_mut() {
                Some(last) if last.row == cell.row && last.col == cell.col => *last = cell,
                _ => cells.push(cell),
            }
        }
        self.cells = cells;
    }

    /// Number of columns in the used range.
    pub(crate) fn width(&self) -> usize {
        match (self.col_lower_bound, self.col_upper_bound) {
            (Some(lower), Some(upper)) => upper - lower + 1,
            _ => 0,
        }
    }

    /// Iterates the rows holding at least one cell, in order, each spread over the used
    /// column range. Rows without cells are not produced. Requires a finished sheet.
    pub(crate) fn rows(&self) -> impl Iterator<Item = Vec<Option<&Cell>>> + '_ {
        let col_lower = self.col_lower_bound.unwrap_or(0);
        let width = self.width();
        self.cells.chunk_by(|left, right| left.row == right.row).map(move |cells| {
            let mut record = vec![None; width];
            for cell in cells {
                record[cell.col - col_lower] = Some(cell);
            }
            record
        })
    }
}
