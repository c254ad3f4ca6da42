//! Shared sheet specification models.

use rowkit_io_fs::SpecTempResourceOptions;
use rust_decimal::prelude::ToPrimitive;

use crate::cell::EnumCellData;
use crate::conf::{
    F_LUMINANCE_DARK_MAX, F_ROW_HEIGHT_DEFAULT, N_FONT_SIZE_HEADER_DEFAULT, N_NROWS_EXCEL_MAX,
    N_ROWS_PER_SHEET_DEFAULT, N_ROWS_WIDTH_SAMPLE_DEFAULT, RGB_HEADER_DEFAULT,
};
use crate::error::SheetError;
use crate::util::{calculate_luminance, sanitize_sheet_name};

////////////////////////////////////////////////////////////////////////////////
// #region ColorSpecification

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecRgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl SpecRgb {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived luminance in `0.0..=255.0`.
    pub fn luminance(&self) -> f64 {
        calculate_luminance(self.r, self.g, self.b)
    }

    /// Whether text on this fill should be light.
    pub fn is_dark(&self) -> bool {
        self.luminance() < F_LUMINANCE_DARK_MAX
    }

    /// `#RRGGBB` form accepted by the workbook engine.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for SpecRgb {
    fn default() -> Self {
        RGB_HEADER_DEFAULT
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification; `None` fields keep the engine default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<u32>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
    /// Font color (`#RRGGBB`).
    pub font_color: Option<String>,
}

/// Horizontal alignment of body cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumCellAlign {
    /// Engine default (text left, numbers right).
    General,
    /// Left aligned.
    Left,
    /// Centered (default).
    #[default]
    Center,
    /// Right aligned.
    Right,
}

impl EnumCellAlign {
    /// Alignment key understood by the format derivation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Common number format presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumDataFormat {
    /// `#,##0`
    Number,
    /// `#,##0.0`
    Number1,
    /// `#,##0.00`
    Number2,
    /// `#,##0.0000`
    Number4,
    /// `0.00%`
    Percent,
    /// `yyyy-mm-dd hh:mm:ss`
    DateTime,
    /// `yyyy-mm-dd`
    Date,
    /// `hh:mm:ss`
    Time,
    /// Korean won with unit suffix.
    CurrencyKrw,
    /// US dollar with two decimals.
    CurrencyUsd,
}

impl EnumDataFormat {
    /// Excel number format code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "#,##0",
            Self::Number1 => "#,##0.0",
            Self::Number2 => "#,##0.00",
            Self::Number4 => "#,##0.0000",
            Self::Percent => "0.00%",
            Self::DateTime => "yyyy-mm-dd hh:mm:ss",
            Self::Date => "yyyy-mm-dd",
            Self::Time => "hh:mm:ss",
            Self::CurrencyKrw => "#,##0\"원\"",
            Self::CurrencyUsd => "\"$\"#,##0.00",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataTypeDispatch

/// Declared output type of a written column.
///
/// A closed table: every variant maps to one encoding rule and one default
/// number format, see [`Self::default_format`] and [`Self::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumDataType {
    /// Any value, written as its text form.
    #[default]
    String,
    /// Boolean written as `Y` / `N`.
    BooleanToYn,
    /// 64-bit integer.
    Long,
    /// 32-bit integer.
    Integer,
    /// 64-bit float.
    Double,
    /// 32-bit float.
    Float,
    /// 64-bit float shown as a percentage.
    DoublePercent,
    /// 32-bit float shown as a percentage.
    FloatPercent,
    /// Date and time.
    DateTime,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Decimal written as a float.
    DecimalToDouble,
    /// Decimal truncated to an integer.
    DecimalToLong,
}

/// Primitive cell write resolved from a value and a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellWrite {
    /// Styled empty cell.
    Blank,
    /// Text cell.
    String(String),
    /// Numeric cell.
    Number(f64),
    /// Date-time cell.
    DateTime(chrono::NaiveDateTime),
    /// Date cell.
    Date(chrono::NaiveDate),
    /// Time cell.
    Time(chrono::NaiveTime),
}

impl EnumDataType {
    /// Number format applied when the column does not set one.
    pub fn default_format(&self) -> Option<&'static str> {
        match self {
            Self::String | Self::BooleanToYn => None,
            Self::Long | Self::Integer | Self::DecimalToLong => Some(EnumDataFormat::Number.as_str()),
            Self::Double | Self::Float | Self::DecimalToDouble => {
                Some(EnumDataFormat::Number2.as_str())
            }
            Self::DoublePercent | Self::FloatPercent => Some(EnumDataFormat::Percent.as_str()),
            Self::DateTime => Some(EnumDataFormat::DateTime.as_str()),
            Self::Date => Some(EnumDataFormat::Date.as_str()),
            Self::Time => Some(EnumDataFormat::Time.as_str()),
        }
    }

    /// Resolve how `value` is written under this type.
    ///
    /// `Err` carries a description of the mismatch; callers fall back to the
    /// value's text form.
    pub fn encode(&self, value: &EnumCellData) -> Result<EnumCellWrite, String> {
        if matches!(value, EnumCellData::Null) {
            return Ok(EnumCellWrite::Blank);
        }

        let write = match (self, value) {
            (Self::String, _) => Some(EnumCellWrite::String(value.to_string())),
            (Self::BooleanToYn, EnumCellData::Bool(val)) => Some(EnumCellWrite::String(
                if *val { "Y" } else { "N" }.to_string(),
            )),
            (Self::Long, EnumCellData::Long(val)) => Some(EnumCellWrite::Number(*val as f64)),
            (Self::Long | Self::Integer, EnumCellData::Int(val)) => {
                Some(EnumCellWrite::Number(f64::from(*val)))
            }
            (Self::Integer, EnumCellData::Long(val)) => i32::try_from(*val)
                .ok()
                .map(|val| EnumCellWrite::Number(f64::from(val))),
            (
                Self::Double | Self::Float | Self::DoublePercent | Self::FloatPercent,
                EnumCellData::Double(val),
            ) => Some(EnumCellWrite::Number(*val)),
            (
                Self::Double | Self::Float | Self::DoublePercent | Self::FloatPercent,
                EnumCellData::Float(val),
            ) => Some(EnumCellWrite::Number(f64::from(*val))),
            (
                Self::Double | Self::Float | Self::DoublePercent | Self::FloatPercent,
                EnumCellData::Long(val),
            ) => Some(EnumCellWrite::Number(*val as f64)),
            (
                Self::Double | Self::Float | Self::DoublePercent | Self::FloatPercent,
                EnumCellData::Int(val),
            ) => Some(EnumCellWrite::Number(f64::from(*val))),
            (Self::DateTime, EnumCellData::DateTime(val)) => Some(EnumCellWrite::DateTime(*val)),
            (Self::Date, EnumCellData::Date(val)) => Some(EnumCellWrite::Date(*val)),
            (Self::Time, EnumCellData::Time(val)) => Some(EnumCellWrite::Time(*val)),
            (Self::DecimalToDouble, EnumCellData::Decimal(val)) => {
                val.to_f64().map(EnumCellWrite::Number)
            }
            (Self::DecimalToLong, EnumCellData::Decimal(val)) => val
                .trunc()
                .to_i64()
                .map(|val| EnumCellWrite::Number(val as f64)),
            _ => None,
        };

        write.ok_or_else(|| format!("{self:?} column cannot hold {}", value.kind()))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LocaleSpecification

/// Digit grouping and decimal symbols used by numeric parsing.
///
/// The default is the Korean convention (`1,234.5`), never the ambient
/// system locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecNumberLocale {
    /// Thousands grouping symbol.
    pub grouping: char,
    /// Decimal symbol.
    pub decimal: char,
}

impl SpecNumberLocale {
    /// Korean convention: `1,234.5`.
    pub const fn korea() -> Self {
        Self {
            grouping: ',',
            decimal: '.',
        }
    }

    /// US convention: `1,234.5`.
    pub const fn us() -> Self {
        Self {
            grouping: ',',
            decimal: '.',
        }
    }

    /// German convention: `1.234,5`.
    pub const fn germany() -> Self {
        Self {
            grouping: '.',
            decimal: ',',
        }
    }

    /// French convention: `1 234,5` with a narrow no-break space.
    pub const fn france() -> Self {
        Self {
            grouping: '\u{202F}',
            decimal: ',',
        }
    }
}

impl Default for SpecNumberLocale {
    fn default() -> Self {
        Self::korea()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Options of the XLSX row writer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecXlsxWriteOptions {
    /// Data rows per sheet before rolling over into a new sheet.
    pub rows_per_sheet: usize,
    /// Header fill color.
    pub header_color: SpecRgb,
    /// Header font size in points.
    pub font_size_header: u32,
    /// Data row height in points.
    pub row_height: f64,
    /// Column widths are estimated from data rows `1..width_sample_rows` of each sheet.
    pub width_sample_rows: usize,
    /// Base sheet name; engine defaults (`Sheet1`, `Sheet2`, ...) when `None`.
    pub sheet_name: Option<String>,
    /// Stream finished rows to temp files instead of keeping them in memory.
    pub if_constant_memory: bool,
    /// Placement of the constant-memory temp directory.
    pub temp: SpecTempResourceOptions,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            rows_per_sheet: N_ROWS_PER_SHEET_DEFAULT,
            header_color: RGB_HEADER_DEFAULT,
            font_size_header: N_FONT_SIZE_HEADER_DEFAULT,
            row_height: F_ROW_HEIGHT_DEFAULT,
            width_sample_rows: N_ROWS_WIDTH_SAMPLE_DEFAULT,
            sheet_name: None,
            if_constant_memory: true,
            temp: SpecTempResourceOptions::with_suffix(".xlsx"),
        }
    }
}

impl SpecXlsxWriteOptions {
    /// Check option ranges before any row is processed.
    pub fn validate(&self) -> Result<(), SheetError> {
        let n_rows_data_max = N_NROWS_EXCEL_MAX - 1;
        if self.rows_per_sheet == 0 || self.rows_per_sheet > n_rows_data_max {
            return Err(SheetError::Configuration(format!(
                "rows_per_sheet must be in 1..={n_rows_data_max}, got {}",
                self.rows_per_sheet
            )));
        }
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            return Err(SheetError::Configuration(format!(
                "row_height must be a positive number, got {}",
                self.row_height
            )));
        }
        if let Some(name) = &self.sheet_name
            && sanitize_sheet_name(name, "_") != *name
        {
            return Err(SheetError::Configuration(format!(
                "sheet_name is not a valid sheet name: {name:?}"
            )));
        }
        Ok(())
    }
}

/// CSV line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumLineTerminator {
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
}

impl Default for EnumLineTerminator {
    fn default() -> Self {
        if cfg!(windows) { Self::Crlf } else { Self::Lf }
    }
}

/// Options of the CSV row writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCsvWriteOptions {
    /// Row separator.
    pub terminator: EnumLineTerminator,
    /// Prefix the file with a UTF-8 byte order mark.
    pub if_write_bom: bool,
    /// Placement of the spooled CSV file.
    pub temp: SpecTempResourceOptions,
}

impl Default for SpecCsvWriteOptions {
    fn default() -> Self {
        Self {
            terminator: EnumLineTerminator::default(),
            if_write_bom: false,
            temp: SpecTempResourceOptions::with_suffix(".csv"),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReadOptions

/// Which sheets of a workbook are read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EnumSheetSelection {
    /// First sheet only (default).
    #[default]
    First,
    /// Zero-based sheet position.
    Index(usize),
    /// Sheet name.
    Name(String),
    /// Every sheet in order; each sheet's first row is its header.
    All,
}

/// Options shared by the XLSX and CSV row readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReadOptions {
    /// Sheets to read (ignored for CSV).
    pub sheet: EnumSheetSelection,
    /// Locale attached to every produced cell value.
    pub number_locale: SpecNumberLocale,
    /// Trim surrounding whitespace of raw cell text.
    pub if_trim_values: bool,
    /// Placement of the spooled input file.
    pub temp: SpecTempResourceOptions,
}

impl Default for SpecReadOptions {
    fn default() -> Self {
        Self {
            sheet: EnumSheetSelection::First,
            number_locale: SpecNumberLocale::default(),
            if_trim_values: false,
            temp: SpecTempResourceOptions::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One sheet produced by a write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSummary {
    /// Sheet name in the workbook.
    pub sheet_name: String,
    /// Data rows written (header excluded).
    pub n_rows: usize,
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecWriteReport {
    /// Sheets in creation order (empty for CSV).
    pub sheets: Vec<SpecSheetSummary>,
    /// Final column widths in 1/256 character units, applied to every sheet.
    pub column_widths: Vec<usize>,
    /// Data rows written in total.
    pub n_rows: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecWriteReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

/// Outcome of mapping one input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReadOutcome<T> {
    /// Populated instance (possibly partially on failure).
    pub data: T,
    /// Whether every setter and the validator succeeded.
    pub success: bool,
    /// Setter failures and validation messages, in order.
    pub messages: Vec<String>,
}

/// Per-read call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecReadReport {
    /// Sheets read (empty for CSV).
    pub sheets: Vec<String>,
    /// Data rows emitted.
    pub n_rows: usize,
    /// Data rows emitted with `success == false`.
    pub n_rows_failed: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
