//! Streaming XLSX row writer with sheet rollover.
//!
//! Rows are pulled from the source once, in order. Every sheet starts with a
//! header row; a new sheet is started before data rows `T+1, 2T+1, ...` where
//! `T` is `rows_per_sheet`. Column widths are estimated from the header and the
//! first sampled rows of each sheet, then applied to every sheet at the end.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use rowkit_io_fs::TempResourceContainer;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::{debug, warn};

use crate::column::{ColumnBuilder, SpecColumn, validate_column_count};
use crate::conf::{N_COLUMNS_MIN, N_NCOLS_EXCEL_MAX, derive_default_header_format};
use crate::cursor::RowCursor;
use crate::error::{BoxError, SheetError};
use crate::handler::XlsxOutputHandler;
use crate::spec::{
    EnumCellWrite, SpecCellFormat, SpecSheetSummary, SpecWriteReport, SpecXlsxWriteOptions,
};
use crate::util::{convert_width_to_chars, create_sheet_identifier, if_rollover_before};

/// XLSX row writer.
///
/// Consumed by [`Self::write`] / [`Self::write_with`]; one writer produces
/// one workbook.
#[derive(Debug, Clone, Default)]
pub struct XlsxRowWriter {
    options: SpecXlsxWriteOptions,
}

impl XlsxRowWriter {
    /// Create writer with explicit options.
    pub fn new(options: SpecXlsxWriteOptions) -> Self {
        Self { options }
    }

    /// Writer options.
    pub fn options(&self) -> &SpecXlsxWriteOptions {
        &self.options
    }

    /// Write every row of `rows` and return the finished workbook handler.
    pub fn write<R, I>(
        self,
        columns: ColumnBuilder<R>,
        rows: I,
    ) -> Result<XlsxOutputHandler, SheetError>
    where
        I: IntoIterator,
        I::Item: Borrow<R>,
    {
        self.write_with(columns, rows, |_: &R, _: &RowCursor| Ok(()))
    }

    /// Like [`Self::write`], calling `consumer` after each row is written.
    ///
    /// An `Err` from `consumer` aborts the export with
    /// [`SheetError::RowCallback`].
    pub fn write_with<R, I, C>(
        self,
        columns: ColumnBuilder<R>,
        rows: I,
        mut consumer: C,
    ) -> Result<XlsxOutputHandler, SheetError>
    where
        I: IntoIterator,
        I::Item: Borrow<R>,
        C: FnMut(&R, &RowCursor) -> Result<(), BoxError>,
    {
        self.options.validate()?;
        let mut l_columns = columns.build()?;
        validate_column_count(&l_columns, N_COLUMNS_MIN)?;
        if l_columns.len() > N_NCOLS_EXCEL_MAX {
            return Err(SheetError::Configuration(format!(
                "too many columns: {} > {N_NCOLS_EXCEL_MAX}",
                l_columns.len()
            )));
        }

        let temp = if self.options.if_constant_memory {
            TempResourceContainer::create_dir(&self.options.temp)?
        } else {
            TempResourceContainer::empty()
        };
        let mut session = XlsxWriteSession::new(&self.options, &l_columns, temp)?;
        session.start_sheet(&l_columns)?;

        for item in rows {
            let row = item.borrow();
            session.write_row(&mut l_columns, row)?;
            consumer(row, &session.cursor).map_err(|err| SheetError::RowCallback {
                n_row: session.cursor.total(),
                message: err.to_string(),
            })?;
        }

        session.finish(&l_columns)
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region WriteSession

/// State of one write call. Field order matters: the workbook holds open
/// spool files inside the temp directory and must drop first.
struct XlsxWriteSession<'a> {
    workbook: Workbook,
    temp: TempResourceContainer,
    options: &'a SpecXlsxWriteOptions,
    fmt_header: Format,
    l_formats: Vec<Format>,
    cursor: RowCursor,
    report: SpecWriteReport,
    set_cols_mismatch_warned: BTreeSet<usize>,
}

impl<'a> XlsxWriteSession<'a> {
    fn new<R>(
        options: &'a SpecXlsxWriteOptions,
        l_columns: &[SpecColumn<R>],
        temp: TempResourceContainer,
    ) -> Result<Self, SheetError> {
        let mut workbook = Workbook::new();
        if let Some(path_dir) = temp.path_dir() {
            workbook
                .set_tempdir(path_dir)
                .map_err(derive_xlsx_write_error)?;
        }

        let fmt_header = derive_rust_xlsx_format(&derive_default_header_format(
            options.header_color,
            options.font_size_header,
        ));
        let l_formats = l_columns
            .iter()
            .map(|column| derive_rust_xlsx_format(column.format()))
            .collect();

        Ok(Self {
            workbook,
            temp,
            options,
            fmt_header,
            l_formats,
            cursor: RowCursor::default(),
            report: SpecWriteReport::default(),
            set_cols_mismatch_warned: BTreeSet::new(),
        })
    }

    /// Add a sheet and write its header row.
    fn start_sheet<R>(&mut self, l_columns: &[SpecColumn<R>]) -> Result<(), SheetError> {
        self.cursor.init_row();
        let idx_sheet = self.cursor.sheet_index();

        let worksheet = if self.options.if_constant_memory {
            self.workbook.add_worksheet_with_constant_memory()
        } else {
            self.workbook.add_worksheet()
        };
        if let Some(base_name) = &self.options.sheet_name {
            let sheet_name = if idx_sheet == 0 {
                base_name.clone()
            } else {
                create_sheet_identifier(base_name, idx_sheet + 1)
            };
            worksheet
                .set_name(sheet_name)
                .map_err(derive_xlsx_write_error)?;
        }

        let n_row = cast_row_num(self.cursor.row())?;
        for (idx_col, column) in l_columns.iter().enumerate() {
            worksheet
                .write_string_with_format(
                    n_row,
                    cast_col_num(idx_col)?,
                    column.name(),
                    &self.fmt_header,
                )
                .map_err(derive_xlsx_write_error)?;
        }

        let sheet_name = worksheet.name();
        debug!(sheet = %sheet_name, n_sheet = idx_sheet + 1, "sheet started");
        self.report.sheets.push(SpecSheetSummary {
            sheet_name,
            n_rows: 0,
        });
        Ok(())
    }

    fn write_row<R>(&mut self, l_columns: &mut [SpecColumn<R>], row: &R) -> Result<(), SheetError> {
        self.cursor.plus_total();
        if if_rollover_before(self.cursor.total(), self.options.rows_per_sheet) {
            self.start_sheet(l_columns)?;
        }
        self.cursor.plus_row();

        let n_row = cast_row_num(self.cursor.row())?;
        let if_sample_width = self.cursor.row() < self.options.width_sample_rows;
        let worksheet = self
            .workbook
            .worksheets_mut()
            .last_mut()
            .ok_or_else(|| SheetError::DocumentWrite("no worksheet to write to".to_string()))?;
        worksheet
            .set_row_height(n_row, self.options.row_height)
            .map_err(derive_xlsx_write_error)?;

        for (idx_col, column) in l_columns.iter_mut().enumerate() {
            let value = column.derive_value(row, &self.cursor);
            let write = match column.data_type().encode(&value) {
                Ok(write) => write,
                Err(msg) => {
                    warn!(column = %column.name(), error = %msg, "cell type mismatch; writing text form");
                    if self.set_cols_mismatch_warned.insert(idx_col) {
                        self.report
                            .warn(format!("column {:?}: {msg}", column.name()));
                    }
                    EnumCellWrite::String(value.to_string())
                }
            };
            write_cell_with_format(
                worksheet,
                n_row,
                cast_col_num(idx_col)?,
                &write,
                &self.l_formats[idx_col],
            )?;
            if if_sample_width {
                column.fit_width(&value.to_string());
            }
        }

        if let Some(summary) = self.report.sheets.last_mut() {
            summary.n_rows += 1;
        }
        self.report.n_rows += 1;
        Ok(())
    }

    /// Apply final widths to all sheets and hand the workbook over.
    fn finish<R>(mut self, l_columns: &[SpecColumn<R>]) -> Result<XlsxOutputHandler, SheetError> {
        let l_widths: Vec<usize> = l_columns.iter().map(SpecColumn::width).collect();
        for worksheet in self.workbook.worksheets_mut() {
            for (idx_col, n_width) in l_widths.iter().enumerate() {
                worksheet
                    .set_column_width(cast_col_num(idx_col)?, convert_width_to_chars(*n_width))
                    .map_err(derive_xlsx_write_error)?;
            }
        }
        self.report.column_widths = l_widths;
        debug!(
            n_rows = self.report.n_rows,
            n_sheets = self.report.sheets.len(),
            "workbook rows written"
        );

        Ok(XlsxOutputHandler::new(self.workbook, self.temp, self.report))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellWrite

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: u32,
    n_col: u16,
    value: &EnumCellWrite,
    format: &Format,
) -> Result<(), SheetError> {
    match value {
        EnumCellWrite::Blank => worksheet.write_blank(n_row, n_col, format),
        EnumCellWrite::String(val) => worksheet.write_string_with_format(n_row, n_col, val, format),
        EnumCellWrite::Number(val) => worksheet.write_number_with_format(n_row, n_col, *val, format),
        EnumCellWrite::DateTime(val) => {
            worksheet.write_datetime_with_format(n_row, n_col, val, format)
        }
        EnumCellWrite::Date(val) => worksheet.write_datetime_with_format(n_row, n_col, val, format),
        EnumCellWrite::Time(val) => worksheet.write_datetime_with_format(n_row, n_col, val, format),
    }
    .map_err(derive_xlsx_write_error)?;
    Ok(())
}

/// Translate a [`SpecCellFormat`] into an engine format.
pub(crate) fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(f64::from(val));
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, SheetError> {
    u32::try_from(value)
        .map_err(|_| SheetError::DocumentWrite(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, SheetError> {
    u16::try_from(value)
        .map_err(|_| SheetError::DocumentWrite(format!("column index overflow: {value}")))
}

pub(crate) fn derive_xlsx_write_error(err: XlsxError) -> SheetError {
    SheetError::DocumentWrite(format!("xlsx write error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
