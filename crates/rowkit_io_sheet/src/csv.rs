//! CSV row writer and reader.
//!
//! The writer spools rows into a temp file and hands it over as a
//! [`CsvOutputHandler`]. Quoting follows the usual rules: fields containing a
//! comma, a double quote or a line break are quoted with inner quotes doubled.
//! The reader shares the row dispatch of the XLSX reader.

use std::borrow::Borrow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use ::csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use rowkit_io_fs::TempResourceContainer;
use tracing::debug;

use crate::column::{ColumnBuilder, SpecReadColumn, validate_column_count};
use crate::conf::N_COLUMNS_MIN;
use crate::cursor::RowCursor;
use crate::error::{BoxError, SheetError};
use crate::handler::CsvOutputHandler;
use crate::reader::{RowDispatcher, RowValidator, derive_spool_options};
use crate::spec::{
    EnumLineTerminator, SpecCsvWriteOptions, SpecReadOptions, SpecReadOutcome, SpecReadReport,
    SpecWriteReport,
};

const C_BOM: &str = "\u{FEFF}";

////////////////////////////////////////////////////////////////////////////////
// #region CsvRowWriter

/// CSV row writer.
#[derive(Debug, Clone, Default)]
pub struct CsvRowWriter {
    options: SpecCsvWriteOptions,
}

impl CsvRowWriter {
    /// Create writer with explicit options.
    pub fn new(options: SpecCsvWriteOptions) -> Self {
        Self { options }
    }

    /// Writer options.
    pub fn options(&self) -> &SpecCsvWriteOptions {
        &self.options
    }

    /// Write every row of `rows` and return the spooled file handler.
    pub fn write<R, I>(self, columns: ColumnBuilder<R>, rows: I) -> Result<CsvOutputHandler, SheetError>
    where
        I: IntoIterator,
        I::Item: Borrow<R>,
    {
        self.write_with(columns, rows, |_: &R, _: &RowCursor| Ok(()))
    }

    /// Like [`Self::write`], calling `consumer` after each row is written.
    ///
    /// An `Err` from `consumer` aborts the export with
    /// [`SheetError::RowCallback`]; the spooled file is deleted.
    pub fn write_with<R, I, C>(
        self,
        columns: ColumnBuilder<R>,
        rows: I,
        mut consumer: C,
    ) -> Result<CsvOutputHandler, SheetError>
    where
        I: IntoIterator,
        I::Item: Borrow<R>,
        C: FnMut(&R, &RowCursor) -> Result<(), BoxError>,
    {
        let l_columns = columns.build()?;
        validate_column_count(&l_columns, N_COLUMNS_MIN)?;

        let temp = TempResourceContainer::create(&self.options.temp)?;
        let path_file = temp
            .path_file()
            .ok_or_else(|| SheetError::DocumentWrite("csv spool file is not available".to_string()))?;
        let mut buf_writer = BufWriter::new(File::create(path_file)?);
        if self.options.if_write_bom {
            buf_writer.write_all(C_BOM.as_bytes())?;
        }

        let mut writer = WriterBuilder::new()
            .terminator(derive_terminator(self.options.terminator))
            .quote_style(QuoteStyle::Necessary)
            .from_writer(buf_writer);

        let mut cursor = RowCursor::default();
        cursor.init_row();
        writer
            .write_record(l_columns.iter().map(|column| column.name()))
            .map_err(derive_csv_write_error)?;

        let mut report = SpecWriteReport::default();
        for item in rows {
            let row = item.borrow();
            cursor.plus_total();
            cursor.plus_row();
            let l_fields: Vec<String> = l_columns
                .iter()
                .map(|column| column.derive_value(row, &cursor).to_string())
                .collect();
            writer
                .write_record(&l_fields)
                .map_err(derive_csv_write_error)?;
            report.n_rows += 1;

            consumer(row, &cursor).map_err(|err| SheetError::RowCallback {
                n_row: cursor.total(),
                message: err.to_string(),
            })?;
        }

        writer
            .into_inner()
            .map_err(|err| SheetError::DocumentWrite(format!("csv write error: {}", err.error())))?
            .flush()?;
        debug!(n_rows = report.n_rows, "csv rows written");

        Ok(CsvOutputHandler::new(temp, report))
    }
}

fn derive_terminator(terminator: EnumLineTerminator) -> Terminator {
    match terminator {
        EnumLineTerminator::Lf => Terminator::Any(b'\n'),
        EnumLineTerminator::Crlf => Terminator::CRLF,
    }
}

fn derive_csv_write_error(err: ::csv::Error) -> SheetError {
    SheetError::DocumentWrite(format!("csv write error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CsvRowReader

/// CSV row reader.
///
/// The first record is the header. Records may be ragged; missing cells are
/// blank.
pub struct CsvRowReader<T> {
    temp: TempResourceContainer,
    dispatcher: RowDispatcher<T>,
}

impl<T> CsvRowReader<T> {
    /// Spool `input` and prepare the column mapping.
    pub fn new<I, F>(
        mut input: I,
        columns: Vec<SpecReadColumn<T>>,
        factory: F,
        options: SpecReadOptions,
    ) -> Result<Self, SheetError>
    where
        I: Read,
        F: Fn() -> T + 'static,
    {
        let dispatcher = RowDispatcher::new(columns, factory, &options)?;
        let temp = TempResourceContainer::spool(&mut input, &derive_spool_options(&options, ".csv"))?;
        Ok(Self { temp, dispatcher })
    }

    /// Run `validator` on every row whose setters all succeeded.
    pub fn with_validator(mut self, validator: impl RowValidator<T> + 'static) -> Self {
        self.dispatcher.set_validator(Box::new(validator));
        self
    }

    /// Parse the file and pass every data row's outcome to `callback`.
    pub fn read<F>(mut self, mut callback: F) -> Result<SpecReadReport, SheetError>
    where
        F: FnMut(SpecReadOutcome<T>),
    {
        let result = self.read_records(&mut callback);
        self.temp.close();
        result
    }

    /// Collect every outcome into a vector.
    pub fn read_all(self) -> Result<Vec<SpecReadOutcome<T>>, SheetError> {
        let mut l_outcomes = Vec::new();
        self.read(|outcome| l_outcomes.push(outcome))?;
        Ok(l_outcomes)
    }

    fn read_records<F>(&mut self, callback: &mut F) -> Result<SpecReadReport, SheetError>
    where
        F: FnMut(SpecReadOutcome<T>),
    {
        let path_file = self
            .temp
            .path_file()
            .ok_or_else(|| SheetError::DocumentRead("spooled input is not available".to_string()))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(File::open(path_file)?));

        let mut report = SpecReadReport::default();
        let mut record = StringRecord::new();
        let mut if_header_pending = true;
        while reader
            .read_record(&mut record)
            .map_err(derive_csv_read_error)?
        {
            let mut l_cells: Vec<String> = record.iter().map(ToString::to_string).collect();
            if if_header_pending {
                if let Some(first) = l_cells.first_mut()
                    && let Some(stripped) = first.strip_prefix(C_BOM)
                {
                    *first = stripped.to_string();
                }
                self.dispatcher.set_headers(l_cells);
                if_header_pending = false;
                continue;
            }
            self.dispatcher.emit(&l_cells, &mut report, callback);
        }

        debug!(n_rows = report.n_rows, n_rows_failed = report.n_rows_failed, "csv read");
        Ok(report)
    }
}

impl<T> std::fmt::Debug for CsvRowReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRowReader")
            .field("temp", &self.temp)
            .finish_non_exhaustive()
    }
}

fn derive_csv_read_error(err: ::csv::Error) -> SheetError {
    SheetError::DocumentRead(format!("csv read error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
