//! Error taxonomy for row/sheet interchange.

use rowkit_io_fs::TempResourceError;

/// Error type returned by user callbacks (value functions, setters, consumers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to interpret one cell's text as a typed value.
///
/// Raised by [`crate::cell::CellValue`] coercions. Readers turn it into a
/// per-row message; it never aborts a read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    /// Text is not a number in the requested locale.
    #[error("Failed to parse number (col {idx_column}): {text:?}")]
    InvalidNumberFormat {
        /// Zero-based column index.
        idx_column: usize,
        /// Offending raw text.
        text: String,
    },
    /// Text matches none of the date/time patterns tried.
    #[error("Cannot parse {target} (col {idx_column}): {text:?}")]
    DateParse {
        /// Zero-based column index.
        idx_column: usize,
        /// Offending raw text.
        text: String,
        /// Requested type name.
        target: &'static str,
    },
    /// Parsed number does not fit the requested type.
    #[error("Value out of range for {target} (col {idx_column}): {text:?}")]
    OutOfRange {
        /// Zero-based column index.
        idx_column: usize,
        /// Offending raw text.
        text: String,
        /// Requested type name.
        target: &'static str,
    },
}

/// Fatal failure of a write, read or transfer call.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Invalid column setup or options, reported before any row is processed.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Invalid call argument (e.g. blank password).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Input document is unreadable as a whole.
    #[error("Failed to read document: {0}")]
    DocumentRead(String),
    /// Output document could not be produced or transferred.
    #[error("Failed to write document: {0}")]
    DocumentWrite(String),
    /// Output handler was already consumed.
    #[error("Already consumed")]
    AlreadyConsumed,
    /// Password encryption of the finished document failed.
    #[error("encryption error: {0}")]
    Encryption(String),
    /// Per-row consumer aborted the export.
    #[error("row consumer aborted at row {n_row}: {message}")]
    RowCallback {
        /// 1-based cumulative row number.
        n_row: usize,
        /// Consumer error text.
        message: String,
    },
    /// Temp spool directory/file could not be acquired.
    #[error(transparent)]
    TempResource(#[from] TempResourceError),
    /// Sink or source IO failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
