//! `rowkit_io_sheet` v1:
//! Streaming row <-> sheet mapping for XLSX and CSV.
//!
//! Modules:
//! - `conf`    : constants and default presets
//! - `error`   : error taxonomy
//! - `spec`    : specs/models/options/reports
//! - `util`    : pure helper functions
//! - `cell`    : raw cell text coercion and written cell values
//! - `cursor`  : row position seen by column functions
//! - `column`  : write/read column definitions and the column builder
//! - `writer`  : XLSX row writer with sheet rollover
//! - `reader`  : XLSX row reader and shared row dispatch
//! - `csv`     : CSV row writer and reader
//! - `handler` : single-consumption output handlers
//! - `crypt`   : password encryption of finished workbooks
pub mod cell;
pub mod column;
pub mod conf;
pub mod crypt;
pub mod csv;
pub mod cursor;
pub mod error;
pub mod handler;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use cell::{CellValue, EnumCellData, EnumNumber};
pub use column::{ColumnBuilder, SpecColumn, SpecReadColumn};
pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_ROWS_PER_SHEET_DEFAULT,
    TUP_EXCEL_ILLEGAL,
};
pub use crate::csv::{CsvRowReader, CsvRowWriter};
pub use cursor::RowCursor;
pub use error::{BoxError, CellError, SheetError};
pub use handler::{CsvOutputHandler, XlsxOutputHandler};
pub use reader::{RowValidator, XlsxRowReader};
pub use spec::{
    EnumCellAlign, EnumDataFormat, EnumDataType, EnumLineTerminator, EnumSheetSelection,
    SpecCellFormat, SpecCsvWriteOptions, SpecNumberLocale, SpecReadOptions, SpecReadOutcome,
    SpecReadReport, SpecRgb, SpecSheetSummary, SpecWriteReport, SpecXlsxWriteOptions,
};
pub use writer::XlsxRowWriter;
