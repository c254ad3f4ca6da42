//! Streaming XLSX row reader and the row dispatch shared with the CSV reader.
//!
//! The input is spooled to a private temp file when the reader is created.
//! `read` walks the selected sheets cell by cell; the first row of every sheet
//! is its header and each later row becomes one [`SpecReadOutcome`].

use std::fs::File;
use std::io::{BufReader, Read};

use calamine::{DataRef, Reader, Xlsx, XlsxError, open_workbook};
use chrono::NaiveTime;
use rowkit_io_fs::{SpecTempResourceOptions, TempResourceContainer};
use tracing::{debug, warn};

use crate::cell::CellValue;
use crate::column::SpecReadColumn;
use crate::conf::{C_READ_DATE_FORMAT, C_READ_DATETIME_FORMAT, C_READ_TIME_FORMAT};
use crate::error::SheetError;
use crate::spec::{
    EnumSheetSelection, SpecNumberLocale, SpecReadOptions, SpecReadOutcome, SpecReadReport,
};

////////////////////////////////////////////////////////////////////////////////
// #region RowValidator

/// Validation of a fully mapped row.
///
/// Returns the violation messages; an empty list means the row is valid.
pub trait RowValidator<T> {
    fn validate(&self, target: &T) -> Vec<String>;
}

impl<T, F> RowValidator<T> for F
where
    F: Fn(&T) -> Vec<String>,
{
    fn validate(&self, target: &T) -> Vec<String> {
        self(target)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowDispatcher

/// Maps raw row cells onto fresh target instances.
pub(crate) struct RowDispatcher<T> {
    l_columns: Vec<SpecReadColumn<T>>,
    fn_factory: Box<dyn Fn() -> T>,
    validator: Option<Box<dyn RowValidator<T>>>,
    number_locale: SpecNumberLocale,
    if_trim_values: bool,
    l_headers: Vec<String>,
}

impl<T> RowDispatcher<T> {
    pub(crate) fn new<F>(
        l_columns: Vec<SpecReadColumn<T>>,
        factory: F,
        options: &SpecReadOptions,
    ) -> Result<Self, SheetError>
    where
        F: Fn() -> T + 'static,
    {
        if l_columns.is_empty() {
            return Err(SheetError::Configuration(
                "columns cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            l_columns,
            fn_factory: Box::new(factory),
            validator: None,
            number_locale: options.number_locale,
            if_trim_values: options.if_trim_values,
            l_headers: Vec::new(),
        })
    }

    pub(crate) fn set_validator(&mut self, validator: Box<dyn RowValidator<T>>) {
        self.validator = Some(validator);
    }

    /// Header names of the current sheet; used only in messages.
    pub(crate) fn set_headers(&mut self, l_headers: Vec<String>) {
        self.l_headers = l_headers;
    }

    /// Header name of column `idx_column`, or a positional label.
    pub(crate) fn derive_column_label(&self, idx_column: usize) -> String {
        match self.l_headers.get(idx_column) {
            Some(header) => header.clone(),
            None => format!("column#{idx_column}"),
        }
    }

    /// Build one outcome from the raw cells of a data row.
    ///
    /// Setter failures are isolated per column. The validator only runs when
    /// every setter succeeded.
    pub(crate) fn dispatch(&self, l_cells: &[String]) -> SpecReadOutcome<T> {
        let mut data = (self.fn_factory)();
        let mut l_messages = Vec::new();

        for (idx_position, column) in self.l_columns.iter().enumerate() {
            let idx_column = column.derive_index(idx_position);
            let text = l_cells.get(idx_column).map(|text| {
                if self.if_trim_values {
                    text.trim().to_string()
                } else {
                    text.clone()
                }
            });
            let cell = CellValue::from_option(idx_column, text).with_locale(self.number_locale);

            if let Err(err) = column.apply(&mut data, &cell) {
                let label = self.derive_column_label(idx_column);
                warn!(column = %label, idx_column, error = %err, "column mapping failed");
                l_messages.push(format!("Failed to set column: {label}"));
            }
        }

        let mut success = l_messages.is_empty();
        if success && let Some(validator) = &self.validator {
            let l_violations = validator.validate(&data);
            if !l_violations.is_empty() {
                success = false;
                l_messages.extend(l_violations);
            }
        }

        SpecReadOutcome {
            data,
            success,
            messages: l_messages,
        }
    }

    /// Dispatch a row, update `report` and hand the outcome to `callback`.
    pub(crate) fn emit<F>(&self, l_cells: &[String], report: &mut SpecReadReport, callback: &mut F)
    where
        F: FnMut(SpecReadOutcome<T>),
    {
        let outcome = self.dispatch(l_cells);
        report.n_rows += 1;
        if !outcome.success {
            report.n_rows_failed += 1;
        }
        callback(outcome);
    }
}

/// Spool options, falling back to `suffix` when none is configured.
pub(crate) fn derive_spool_options(options: &SpecReadOptions, suffix: &str) -> SpecTempResourceOptions {
    let mut temp = options.temp.clone();
    if temp.suffix.is_empty() {
        temp.suffix = suffix.to_string();
    }
    temp
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region XlsxRowReader

/// XLSX row reader.
///
/// Consumed by [`Self::read`]; the spooled input is deleted when `read`
/// returns, whatever the outcome.
pub struct XlsxRowReader<T> {
    temp: TempResourceContainer,
    dispatcher: RowDispatcher<T>,
    sheet: EnumSheetSelection,
}

impl<T> XlsxRowReader<T> {
    /// Spool `input` and prepare the column mapping.
    ///
    /// `columns` must not be empty; `factory` creates one target per row.
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
        let temp = TempResourceContainer::spool(&mut input, &derive_spool_options(&options, ".xlsx"))?;
        Ok(Self {
            temp,
            dispatcher,
            sheet: options.sheet,
        })
    }

    /// Run `validator` on every row whose setters all succeeded.
    pub fn with_validator(mut self, validator: impl RowValidator<T> + 'static) -> Self {
        self.dispatcher.set_validator(Box::new(validator));
        self
    }

    /// Parse the selected sheets and pass every data row's outcome to `callback`.
    pub fn read<F>(mut self, mut callback: F) -> Result<SpecReadReport, SheetError>
    where
        F: FnMut(SpecReadOutcome<T>),
    {
        let result = self.read_sheets(&mut callback);
        self.temp.close();
        result
    }

    /// Collect every outcome into a vector.
    pub fn read_all(self) -> Result<Vec<SpecReadOutcome<T>>, SheetError> {
        let mut l_outcomes = Vec::new();
        self.read(|outcome| l_outcomes.push(outcome))?;
        Ok(l_outcomes)
    }

    fn read_sheets<F>(&mut self, callback: &mut F) -> Result<SpecReadReport, SheetError>
    where
        F: FnMut(SpecReadOutcome<T>),
    {
        let path_file = self
            .temp
            .path_file()
            .ok_or_else(|| SheetError::DocumentRead("spooled input is not available".to_string()))?;
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path_file).map_err(derive_xlsx_read_error)?;
        let l_sheet_names = derive_selected_sheets(&workbook.sheet_names(), &self.sheet)?;

        let mut report = SpecReadReport::default();
        for sheet_name in l_sheet_names {
            let n_rows_before = report.n_rows;
            read_sheet(&mut workbook, &sheet_name, &mut self.dispatcher, &mut report, callback)?;
            debug!(
                sheet = %sheet_name,
                n_rows = report.n_rows - n_rows_before,
                "sheet read"
            );
            report.sheets.push(sheet_name);
        }
        Ok(report)
    }
}

impl<T> std::fmt::Debug for XlsxRowReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxRowReader")
            .field("temp", &self.temp)
            .field("sheet", &self.sheet)
            .finish_non_exhaustive()
    }
}

/// Stream one sheet: its first row is the header, later rows are dispatched.
fn read_sheet<T, F>(
    workbook: &mut Xlsx<BufReader<File>>,
    sheet_name: &str,
    dispatcher: &mut RowDispatcher<T>,
    report: &mut SpecReadReport,
    callback: &mut F,
) -> Result<(), SheetError>
where
    F: FnMut(SpecReadOutcome<T>),
{
    let mut cells = workbook
        .worksheet_cells_reader(sheet_name)
        .map_err(derive_xlsx_read_error)?;

    let mut if_header_pending = true;
    let mut n_row_current: Option<u32> = None;
    let mut l_cells: Vec<String> = Vec::new();

    let mut flush_row = |l_cells: Vec<String>, if_header_pending: &mut bool| {
        if *if_header_pending {
            dispatcher.set_headers(l_cells);
            *if_header_pending = false;
        } else {
            dispatcher.emit(&l_cells, report, callback);
        }
    };

    while let Some(cell) = cells.next_cell().map_err(derive_xlsx_read_error)? {
        let (n_row, n_col) = cell.get_position();
        if n_row_current != Some(n_row) {
            if n_row_current.is_some() {
                flush_row(std::mem::take(&mut l_cells), &mut if_header_pending);
            }
            n_row_current = Some(n_row);
        }

        let idx_col = n_col as usize;
        if l_cells.len() <= idx_col {
            l_cells.resize(idx_col + 1, String::new());
        }
        l_cells[idx_col] = render_cell_value(cell.get_value());
    }
    if n_row_current.is_some() {
        flush_row(l_cells, &mut if_header_pending);
    }
    Ok(())
}

/// Resolve the sheet names to read, in workbook order.
fn derive_selected_sheets(
    l_sheet_names: &[String],
    selection: &EnumSheetSelection,
) -> Result<Vec<String>, SheetError> {
    let l_selected = match selection {
        EnumSheetSelection::All => l_sheet_names.to_vec(),
        EnumSheetSelection::First => l_sheet_names.first().cloned().into_iter().collect(),
        EnumSheetSelection::Index(idx_sheet) => {
            let sheet_name = l_sheet_names.get(*idx_sheet).ok_or_else(|| {
                SheetError::DocumentRead(format!(
                    "sheet index {idx_sheet} out of range ({} sheets)",
                    l_sheet_names.len()
                ))
            })?;
            vec![sheet_name.clone()]
        }
        EnumSheetSelection::Name(name) => {
            if !l_sheet_names.contains(name) {
                return Err(SheetError::DocumentRead(format!("sheet not found: {name:?}")));
            }
            vec![name.clone()]
        }
    };

    if l_selected.is_empty() {
        return Err(SheetError::DocumentRead("workbook has no sheets".to_string()));
    }
    Ok(l_selected)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellRendering

/// Text form of a parsed cell, as a user would see it in the sheet.
pub fn render_cell_value(value: &DataRef<'_>) -> String {
    match value {
        DataRef::Empty => String::new(),
        DataRef::Int(val) => val.to_string(),
        DataRef::Float(val) => val.to_string(),
        DataRef::String(val) => val.clone(),
        DataRef::SharedString(val) => (*val).to_string(),
        DataRef::Bool(val) => (if *val { "TRUE" } else { "FALSE" }).to_string(),
        DataRef::DateTime(dt) => {
            if dt.is_duration() {
                return render_duration(dt.as_f64());
            }
            match dt.as_datetime() {
                Some(val) if dt.as_f64() < 1.0 => val.time().format(C_READ_TIME_FORMAT).to_string(),
                Some(val) if val.time() == NaiveTime::MIN => {
                    val.date().format(C_READ_DATE_FORMAT).to_string()
                }
                Some(val) => val.format(C_READ_DATETIME_FORMAT).to_string(),
                None => dt.as_f64().to_string(),
            }
        }
        DataRef::DateTimeIso(val) | DataRef::DurationIso(val) => val.clone(),
        DataRef::Error(err) => err.to_string(),
    }
}

/// `[h]:mm:ss` rendering of a day fraction; hours may exceed 24.
fn render_duration(f_days: f64) -> String {
    let n_seconds = (f_days * 86_400.0).round() as i64;
    let sign = if n_seconds < 0 { "-" } else { "" };
    let n_seconds = n_seconds.abs();
    format!(
        "{sign}{:02}:{:02}:{:02}",
        n_seconds / 3_600,
        (n_seconds % 3_600) / 60,
        n_seconds % 60
    )
}

fn derive_xlsx_read_error(err: XlsxError) -> SheetError {
    SheetError::DocumentRead(format!("xlsx read error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::cell::EnumCellData;
    use crate::column::ColumnBuilder;
    use crate::cursor::RowCursor;
    use crate::spec::{EnumDataType, SpecXlsxWriteOptions};
    use crate::writer::XlsxRowWriter;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Person {
        name: String,
        age: Option<i64>,
        joined: Option<NaiveDate>,
    }

    fn person_columns() -> Vec<SpecReadColumn<Person>> {
        vec![
            SpecReadColumn::new(|target: &mut Person, cell: &CellValue| {
                target.name = cell.as_str().to_string();
                Ok(())
            }),
            SpecReadColumn::new(|target: &mut Person, cell: &CellValue| {
                target.age = cell.as_long()?;
                Ok(())
            }),
            SpecReadColumn::new(|target: &mut Person, cell: &CellValue| {
                target.joined = cell.as_date()?;
                Ok(())
            }),
        ]
    }

    /// Workbook with `Name`, `Age` (text) and `Joined` columns.
    fn people_workbook(l_rows: &[(&str, &str)], rows_per_sheet: usize) -> Vec<u8> {
        let joined = NaiveDate::from_ymd_opt(2025, 7, 19).expect("date");
        let columns = ColumnBuilder::<(String, String)>::new()
            .column("Name", |row: &(String, String), _: &RowCursor| row.0.clone())
            .column("Age", |row: &(String, String), _: &RowCursor| row.1.clone())
            .column("Joined", move |_: &(String, String), _: &RowCursor| joined)
            .data_type(EnumDataType::Date);
        let rows: Vec<(String, String)> = l_rows
            .iter()
            .map(|(name, age)| (name.to_string(), age.to_string()))
            .collect();
        let options = SpecXlsxWriteOptions {
            rows_per_sheet,
            ..Default::default()
        };

        let mut handler = XlsxRowWriter::new(options)
            .write(columns, rows)
            .expect("write");
        let mut v_out = Vec::new();
        handler.consume(&mut v_out).expect("consume");
        v_out
    }

    fn read_options(dir_parent: &Path) -> SpecReadOptions {
        let mut options = SpecReadOptions::default();
        options.temp.dir_parent = Some(dir_parent.to_path_buf());
        options
    }

    fn count_entries(path: &Path) -> usize {
        std::fs::read_dir(path).expect("read_dir").count()
    }

    #[test]
    fn round_trip_through_writer() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let v_bytes = people_workbook(&[("Alice", "30"), ("Bob", "41")], 100);

        let l_outcomes = XlsxRowReader::new(
            Cursor::new(v_bytes),
            person_columns(),
            Person::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader")
        .read_all()
        .expect("read");

        let joined = NaiveDate::from_ymd_opt(2025, 7, 19);
        assert_eq!(l_outcomes.len(), 2);
        assert!(l_outcomes.iter().all(|outcome| outcome.success));
        assert_eq!(
            l_outcomes[0].data,
            Person {
                name: "Alice".to_string(),
                age: Some(30),
                joined,
            }
        );
        assert_eq!(l_outcomes[1].data.age, Some(41));
    }

    #[test]
    fn failing_setter_marks_only_its_row() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let v_bytes = people_workbook(
            &[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "abc"), ("f", "6")],
            100,
        );

        let mut l_outcomes = Vec::new();
        let report = XlsxRowReader::new(
            Cursor::new(v_bytes),
            person_columns(),
            Person::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader")
        .read(|outcome| l_outcomes.push(outcome))
        .expect("read");

        assert_eq!((report.n_rows, report.n_rows_failed), (6, 1));
        let l_success: Vec<bool> = l_outcomes.iter().map(|outcome| outcome.success).collect();
        assert_eq!(l_success, vec![true, true, true, true, false, true]);

        let failed = &l_outcomes[4];
        assert_eq!(failed.messages, vec!["Failed to set column: Age".to_string()]);
        assert_eq!(failed.data.name, "e");
        assert!(failed.data.joined.is_some());
    }

    #[test]
    fn validator_runs_after_successful_mapping() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let v_bytes = people_workbook(&[("Alice", "30"), ("Kid", "9"), ("Bad", "x")], 100);

        let l_outcomes = XlsxRowReader::new(
            Cursor::new(v_bytes),
            person_columns(),
            Person::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader")
        .with_validator(|person: &Person| {
            if person.age.unwrap_or_default() < 18 {
                vec!["age must be at least 18".to_string()]
            } else {
                Vec::new()
            }
        })
        .read_all()
        .expect("read");

        assert!(l_outcomes[0].success);
        assert!(l_outcomes[0].messages.is_empty());
        assert!(!l_outcomes[1].success);
        assert_eq!(l_outcomes[1].messages, vec!["age must be at least 18".to_string()]);
        assert_eq!(
            l_outcomes[2].messages,
            vec!["Failed to set column: Age".to_string()]
        );
    }

    #[test]
    fn cells_beyond_the_row_are_blank() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let v_bytes = people_workbook(&[("Alice", "30")], 100);
        let mut l_columns = person_columns();
        l_columns.push(SpecReadColumn::new(|target: &mut Person, cell: &CellValue| {
            if !cell.is_blank() {
                return Err("expected a blank cell".into());
            }
            target.name.push_str("!");
            Ok(())
        }));

        let l_outcomes = XlsxRowReader::new(
            Cursor::new(v_bytes),
            l_columns,
            Person::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader")
        .read_all()
        .expect("read");

        assert!(l_outcomes[0].success);
        assert_eq!(l_outcomes[0].data.name, "Alice!");
    }

    #[test]
    fn pinned_column_reads_its_cell() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let v_bytes = people_workbook(&[("Alice", "30")], 100);
        let l_columns = vec![
            SpecReadColumn::new(|target: &mut Person, cell: &CellValue| {
                target.age = cell.as_long()?;
                Ok(())
            })
            .at("B")
            .expect("reference"),
            SpecReadColumn::new(|target: &mut Person, cell: &CellValue| {
                target.name = cell.as_str().to_string();
                Ok(())
            })
            .at_index(0),
        ];

        let l_outcomes = XlsxRowReader::new(
            Cursor::new(v_bytes),
            l_columns,
            Person::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader")
        .read_all()
        .expect("read");

        assert_eq!(l_outcomes[0].data.name, "Alice");
        assert_eq!(l_outcomes[0].data.age, Some(30));
    }

    #[test]
    fn sheet_selection() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let l_rows = [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")];
        let v_bytes = people_workbook(&l_rows, 2);

        let read_with = |sheet: EnumSheetSelection| {
            let mut options = read_options(dir_tmp.path());
            options.sheet = sheet;
            let mut l_names = Vec::new();
            let report = XlsxRowReader::new(
                Cursor::new(v_bytes.clone()),
                person_columns(),
                Person::default,
                options,
            )
            .expect("reader")
            .read(|outcome| l_names.push(outcome.data.name))?;
            Ok::<_, SheetError>((report, l_names))
        };

        let (report, l_names) = read_with(EnumSheetSelection::All).expect("all");
        assert_eq!(l_names, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(report.sheets, vec!["Sheet1", "Sheet2", "Sheet3"]);

        let (_, l_names) = read_with(EnumSheetSelection::First).expect("first");
        assert_eq!(l_names, vec!["a", "b"]);

        let (_, l_names) = read_with(EnumSheetSelection::Name("Sheet2".to_string())).expect("name");
        assert_eq!(l_names, vec!["c", "d"]);

        let (_, l_names) = read_with(EnumSheetSelection::Index(2)).expect("index");
        assert_eq!(l_names, vec!["e"]);

        assert!(matches!(
            read_with(EnumSheetSelection::Name("Missing".to_string())),
            Err(SheetError::DocumentRead(_))
        ));
        assert_eq!(count_entries(dir_tmp.path()), 0);
    }

    #[test]
    fn temp_file_is_deleted_after_read() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let v_bytes = people_workbook(&[("Alice", "30")], 100);

        let reader = XlsxRowReader::new(
            Cursor::new(v_bytes),
            person_columns(),
            Person::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader");
        assert_eq!(count_entries(dir_tmp.path()), 1);

        reader.read(|_| {}).expect("read");
        assert_eq!(count_entries(dir_tmp.path()), 0);
    }

    #[test]
    fn corrupt_input_fails_and_cleans_up() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let reader = XlsxRowReader::new(
            Cursor::new(b"definitely not a workbook".to_vec()),
            person_columns(),
            Person::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader");

        let mut n_calls = 0;
        let result = reader.read(|_| n_calls += 1);
        assert!(matches!(result, Err(SheetError::DocumentRead(_))));
        assert_eq!(n_calls, 0);
        assert_eq!(count_entries(dir_tmp.path()), 0);
    }

    #[test]
    fn empty_columns_are_rejected_before_spooling() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let result = XlsxRowReader::<Person>::new(
            Cursor::new(Vec::new()),
            Vec::new(),
            Person::default,
            read_options(dir_tmp.path()),
        );
        assert!(matches!(result, Err(SheetError::Configuration(_))));
        assert_eq!(count_entries(dir_tmp.path()), 0);
    }

    #[test]
    fn dispatcher_labels_columns_without_header() {
        let l_columns = vec![
            SpecReadColumn::new(|_: &mut Person, _: &CellValue| Ok(())),
            SpecReadColumn::new(|_: &mut Person, cell: &CellValue| {
                cell.as_long()?;
                Ok(())
            }),
        ];
        let options = SpecReadOptions {
            if_trim_values: true,
            ..Default::default()
        };
        let mut dispatcher =
            RowDispatcher::new(l_columns, Person::default, &options).expect("dispatcher");
        dispatcher.set_headers(vec!["Only".to_string()]);

        let outcome = dispatcher.dispatch(&["x".to_string(), " 12 ".to_string()]);
        assert!(outcome.success);

        let outcome = dispatcher.dispatch(&["x".to_string(), "twelve".to_string()]);
        assert_eq!(outcome.messages, vec!["Failed to set column: column#1".to_string()]);
    }

    #[test]
    fn cell_values_render_like_the_sheet() {
        assert_eq!(render_cell_value(&DataRef::Empty), "");
        assert_eq!(render_cell_value(&DataRef::Float(3.0)), "3");
        assert_eq!(render_cell_value(&DataRef::Float(2.5)), "2.5");
        assert_eq!(render_cell_value(&DataRef::Int(-7)), "-7");
        assert_eq!(render_cell_value(&DataRef::Bool(true)), "TRUE");
        assert_eq!(render_cell_value(&DataRef::SharedString("hi")), "hi");
        assert_eq!(
            render_cell_value(&DataRef::Error(CellErrorType::Div0)),
            "#DIV/0!"
        );

        let date = ExcelDateTime::new(45943.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(render_cell_value(&DataRef::DateTime(date)), "2025-10-13");
        let datetime = ExcelDateTime::new(45943.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            render_cell_value(&DataRef::DateTime(datetime)),
            "2025-10-13 12:00:00"
        );
        let time = ExcelDateTime::new(0.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(render_cell_value(&DataRef::DateTime(time)), "12:00:00");
        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(render_cell_value(&DataRef::DateTime(duration)), "36:00:00");
    }

    #[test]
    fn typed_cells_reach_setters_as_text() {
        let dir_tmp = TempDir::new().expect("tempdir");
        let columns = ColumnBuilder::<i64>::new()
            .column("Id", |row: &i64, _: &RowCursor| *row)
            .data_type(EnumDataType::Long)
            .column("Flag", |row: &i64, _: &RowCursor| EnumCellData::Bool(*row > 1))
            .data_type(EnumDataType::BooleanToYn);
        let mut handler = XlsxRowWriter::default()
            .write(columns, vec![1_i64, 2])
            .expect("write");
        let mut v_bytes = Vec::new();
        handler.consume(&mut v_bytes).expect("consume");

        let l_columns = vec![
            SpecReadColumn::new(|target: &mut (i64, bool), cell: &CellValue| {
                target.0 = cell.as_long()?.unwrap_or_default();
                Ok(())
            }),
            SpecReadColumn::new(|target: &mut (i64, bool), cell: &CellValue| {
                target.1 = cell.as_boolean();
                Ok(())
            }),
        ];
        let l_outcomes = XlsxRowReader::new(
            Cursor::new(v_bytes),
            l_columns,
            <(i64, bool)>::default,
            read_options(dir_tmp.path()),
        )
        .expect("reader")
        .read_all()
        .expect("read");

        let l_data: Vec<(i64, bool)> = l_outcomes.into_iter().map(|outcome| outcome.data).collect();
        assert_eq!(l_data, vec![(1, false), (2, true)]);
    }
}
