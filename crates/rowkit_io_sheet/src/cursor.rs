//! Row position tracking for writers.

/// Position of the row being written.
///
/// Owned and advanced by the writers; column functions and per-row consumers
/// only get a shared reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowCursor {
    n_row: usize,
    n_total: usize,
    n_sheet: usize,
}

impl RowCursor {
    /// Zero-based row index inside the current sheet (the header is row 0).
    pub fn row(&self) -> usize {
        self.n_row
    }

    /// Data rows processed so far across the whole export, including the
    /// current one.
    pub fn total(&self) -> usize {
        self.n_total
    }

    /// Zero-based index of the current sheet.
    pub fn sheet_index(&self) -> usize {
        self.n_sheet.saturating_sub(1)
    }

    pub(crate) fn plus_row(&mut self) {
        self.n_row += 1;
    }

    pub(crate) fn plus_total(&mut self) {
        self.n_total += 1;
    }

    /// Start a new sheet.
    pub(crate) fn init_row(&mut self) {
        self.n_row = 0;
        self.n_sheet += 1;
    }
}
