//! Column definitions for writers and readers.
//!
//! Write side: [`ColumnBuilder`] collects [`SpecColumn`]s in order. Each
//! `column*` call commits the pending definition and opens a new one, so at
//! any time there are N committed columns and at most one pending.
//!
//! Read side: [`SpecReadColumn`] applies one cell onto a target instance.

use tracing::error;

use crate::cell::{CellValue, EnumCellData};
use crate::conf::derive_default_body_format;
use crate::cursor::RowCursor;
use crate::error::{BoxError, SheetError};
use crate::spec::{EnumCellAlign, EnumDataFormat, EnumDataType, SpecCellFormat};
use crate::util::{derive_column_index, estimate_column_width};

/// Value function of a written column.
pub type FnColumnValue<R> = Box<dyn Fn(&R, &RowCursor) -> Result<EnumCellData, BoxError>>;

/// Setter of a read column.
pub type FnColumnSetter<T> = Box<dyn Fn(&mut T, &CellValue) -> Result<(), BoxError>>;

////////////////////////////////////////////////////////////////////////////////
// #region WriteColumn

/// Committed write column with its resolved type and style.
pub struct SpecColumn<R> {
    name: String,
    fn_value: FnColumnValue<R>,
    data_type: EnumDataType,
    format: SpecCellFormat,
    width: usize,
}

impl<R> SpecColumn<R> {
    /// Header text.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared output type.
    pub fn data_type(&self) -> EnumDataType {
        self.data_type
    }

    /// Resolved body style.
    pub fn format(&self) -> &SpecCellFormat {
        &self.format
    }

    /// Current width estimate in 1/256 character units.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Evaluate the value function; failures are logged and become `Null`.
    pub(crate) fn derive_value(&self, row: &R, cursor: &RowCursor) -> EnumCellData {
        match (self.fn_value)(row, cursor) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    column = %self.name,
                    n_row = cursor.row(),
                    n_total = cursor.total(),
                    error = %err,
                    "column value function failed"
                );
                EnumCellData::Null
            }
        }
    }

    /// Grow the width estimate to fit `text`.
    pub(crate) fn fit_width(&mut self, text: &str) {
        self.width = self.width.max(estimate_column_width(text));
    }
}

impl<R> std::fmt::Debug for SpecColumn<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecColumn")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("format", &self.format)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

struct SpecPendingColumn<R> {
    name: String,
    fn_value: FnColumnValue<R>,
    data_type: Option<EnumDataType>,
    num_format: Option<String>,
    align: EnumCellAlign,
    style: Option<SpecCellFormat>,
}

impl<R> SpecPendingColumn<R> {
    fn new(name: String, fn_value: FnColumnValue<R>) -> Self {
        Self {
            name,
            fn_value,
            data_type: None,
            num_format: None,
            align: EnumCellAlign::default(),
            style: None,
        }
    }

    /// Resolve type, then format, then style.
    fn commit(self) -> SpecColumn<R> {
        let data_type = self.data_type.unwrap_or_default();
        let num_format = self
            .num_format
            .or_else(|| data_type.default_format().map(ToString::to_string));
        let format = match self.style {
            Some(style) => {
                let mut style = style;
                if style.num_format.is_none() {
                    style.num_format = num_format;
                }
                style
            }
            None => derive_default_body_format(self.align.as_str(), num_format.as_deref()),
        };
        let width = estimate_column_width(&self.name);

        SpecColumn {
            name: self.name,
            fn_value: self.fn_value,
            data_type,
            format,
            width,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnBuilder

/// Order-preserving builder of write columns.
///
/// Modifiers (`data_type`, `format`, `align`, `style`) apply to the pending
/// column. A modifier with no column opened is reported by [`Self::build`].
pub struct ColumnBuilder<R> {
    l_columns: Vec<SpecColumn<R>>,
    pending: Option<SpecPendingColumn<R>>,
    if_skipping: bool,
    l_errors: Vec<String>,
}

impl<R> Default for ColumnBuilder<R> {
    fn default() -> Self {
        Self {
            l_columns: Vec::new(),
            pending: None,
            if_skipping: false,
            l_errors: Vec::new(),
        }
    }
}

impl<R> ColumnBuilder<R> {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a column whose value is computed from the row and cursor.
    pub fn column<F, V>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&R, &RowCursor) -> V + 'static,
        V: Into<EnumCellData>,
    {
        self.open(name.into(), Box::new(move |row, cursor| Ok(f(row, cursor).into())))
    }

    /// Open a column whose value function may fail.
    ///
    /// An `Err` is logged and the cell is written empty.
    pub fn column_try<F, V>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&R, &RowCursor) -> Result<V, BoxError> + 'static,
        V: Into<EnumCellData>,
    {
        self.open(name.into(), Box::new(move |row, cursor| f(row, cursor).map(Into::into)))
    }

    /// Open a column with the same value on every row.
    pub fn const_column(self, name: impl Into<String>, value: impl Into<EnumCellData>) -> Self {
        let value = value.into();
        self.open(name.into(), Box::new(move |_, _| Ok(value.clone())))
    }

    /// Open a column only when `condition` holds.
    ///
    /// When it does not, the pending column is still committed and modifiers
    /// up to the next `column*` call are ignored.
    pub fn column_if<F, V>(self, name: impl Into<String>, condition: bool, f: F) -> Self
    where
        F: Fn(&R, &RowCursor) -> V + 'static,
        V: Into<EnumCellData>,
    {
        if condition {
            return self.column(name, f);
        }
        let mut builder = self.commit_pending();
        builder.if_skipping = true;
        builder
    }

    /// Declared output type of the pending column.
    pub fn data_type(self, data_type: EnumDataType) -> Self {
        self.modify("data_type", |pending| pending.data_type = Some(data_type))
    }

    /// Number format code of the pending column.
    pub fn format(self, num_format: impl Into<String>) -> Self {
        let num_format = num_format.into();
        self.modify("format", |pending| pending.num_format = Some(num_format))
    }

    /// Number format preset of the pending column.
    pub fn format_preset(self, preset: EnumDataFormat) -> Self {
        self.format(preset.as_str())
    }

    /// Horizontal alignment of the pending column (ignored with `style`).
    pub fn align(self, align: EnumCellAlign) -> Self {
        self.modify("align", |pending| pending.align = align)
    }

    /// Full body style of the pending column.
    pub fn style(self, style: SpecCellFormat) -> Self {
        self.modify("style", |pending| pending.style = Some(style))
    }

    /// Number of committed columns.
    pub fn n_committed(&self) -> usize {
        self.l_columns.len()
    }

    /// Whether a column is pending.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Commit the pending column and return all columns in order.
    pub fn build(self) -> Result<Vec<SpecColumn<R>>, SheetError> {
        let builder = self.commit_pending();
        if !builder.l_errors.is_empty() {
            return Err(SheetError::Configuration(builder.l_errors.join("; ")));
        }
        Ok(builder.l_columns)
    }

    fn open(self, name: String, fn_value: FnColumnValue<R>) -> Self {
        let mut builder = self.commit_pending();
        builder.pending = Some(SpecPendingColumn::new(name, fn_value));
        builder
    }

    fn commit_pending(mut self) -> Self {
        if let Some(pending) = self.pending.take() {
            self.l_columns.push(pending.commit());
        }
        self.if_skipping = false;
        self
    }

    fn modify(mut self, op: &str, f: impl FnOnce(&mut SpecPendingColumn<R>)) -> Self {
        match self.pending.as_mut() {
            Some(pending) => f(pending),
            None if self.if_skipping => {}
            None => self.l_errors.push(format!("`{op}` called before any column")),
        }
        self
    }
}

/// Check the committed column count of a write call.
pub(crate) fn validate_column_count<R>(
    l_columns: &[SpecColumn<R>],
    n_min: usize,
) -> Result<(), SheetError> {
    if l_columns.len() < n_min {
        return Err(SheetError::Configuration(format!(
            "columns setting required: at least {n_min} column(s), got {}",
            l_columns.len()
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReadColumn

/// Read column: a setter plus the position of the cell it consumes.
///
/// Columns are positional by default (the n-th column reads the n-th cell).
pub struct SpecReadColumn<T> {
    fn_setter: FnColumnSetter<T>,
    idx_column: Option<usize>,
}

impl<T> SpecReadColumn<T> {
    /// Positional column.
    pub fn new<F>(setter: F) -> Self
    where
        F: Fn(&mut T, &CellValue) -> Result<(), BoxError> + 'static,
    {
        Self {
            fn_setter: Box::new(setter),
            idx_column: None,
        }
    }

    /// Pin the column to a cell reference such as `"C"` or `"AA10"`.
    pub fn at(mut self, reference: &str) -> Result<Self, SheetError> {
        let idx_column = derive_column_index(reference).map_err(SheetError::Configuration)?;
        self.idx_column = Some(idx_column);
        Ok(self)
    }

    /// Pin the column to a zero-based index.
    pub fn at_index(mut self, idx_column: usize) -> Self {
        self.idx_column = Some(idx_column);
        self
    }

    /// Cell index read by this column at position `idx_position`.
    pub fn derive_index(&self, idx_position: usize) -> usize {
        self.idx_column.unwrap_or(idx_position)
    }

    pub(crate) fn apply(&self, target: &mut T, cell: &CellValue) -> Result<(), BoxError> {
        (self.fn_setter)(target, cell)
    }
}

impl<T> std::fmt::Debug for SpecReadColumn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecReadColumn")
            .field("idx_column", &self.idx_column)
            .finish_non_exhaustive()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
