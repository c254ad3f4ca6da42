//! Cell values: read-side text coercion and write-side typed data.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tracing::warn;

use crate::conf::{TUP_BOOLEAN_TRUE, TUP_DATE_PATTERNS, TUP_DATETIME_PATTERNS, TUP_TIME_PATTERNS};
use crate::error::CellError;
use crate::spec::SpecNumberLocale;
use crate::util::{EnumParsedValue, SpecParsedNumber, cleanse_number_text, parse_number_prefix};

////////////////////////////////////////////////////////////////////////////////
// #region ReadSide

/// Number produced by [`CellValue::as_number`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumNumber {
    /// Integral value within `i64`.
    Long(i64),
    /// Any other value.
    Double(f64),
}

impl EnumNumber {
    /// Value as `f64`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Long(val) => *val as f64,
            Self::Double(val) => *val,
        }
    }
}

impl fmt::Display for EnumNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(val) => write!(f, "{val}"),
            Self::Double(val) => write!(f, "{val}"),
        }
    }
}

/// Raw text of one parsed cell plus its zero-based column index.
///
/// Produced per cell by the readers and handed to column setters. Text is
/// never absent: a missing cell is the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellValue {
    idx_column: usize,
    text: String,
    locale: SpecNumberLocale,
}

impl CellValue {
    /// Cell with the default (Korean) number locale.
    pub fn new(idx_column: usize, text: impl Into<String>) -> Self {
        Self {
            idx_column,
            text: text.into(),
            locale: SpecNumberLocale::default(),
        }
    }

    /// Cell whose text may be missing; `None` becomes `""`.
    pub fn from_option(idx_column: usize, text: Option<String>) -> Self {
        Self::new(idx_column, text.unwrap_or_default())
    }

    /// Replace the locale used by the number coercions.
    pub fn with_locale(mut self, locale: SpecNumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Zero-based column index.
    pub fn idx_column(&self) -> usize {
        self.idx_column
    }

    /// Raw text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Locale used by [`Self::as_number`].
    pub fn locale(&self) -> SpecNumberLocale {
        self.locale
    }

    /// Whether the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    // #region Numbers

    /// Parse the text as a number using the cell's locale.
    pub fn as_number(&self) -> Result<Option<EnumNumber>, CellError> {
        self.as_number_in(&self.locale)
    }

    /// Parse the text as a number using an explicit locale.
    ///
    /// Blank text is `None`. Currency/percent symbols and spaces are removed
    /// before parsing.
    pub fn as_number_in(&self, locale: &SpecNumberLocale) -> Result<Option<EnumNumber>, CellError> {
        Ok(self.parse_number(locale)?.map(|parsed| match parsed.value {
            EnumParsedValue::Long(val) => EnumNumber::Long(val),
            EnumParsedValue::Double(val) => EnumNumber::Double(val),
        }))
    }

    /// Number truncated to `i64`.
    pub fn as_long(&self) -> Result<Option<i64>, CellError> {
        let Some(number) = self.as_number()? else {
            return Ok(None);
        };
        match number {
            EnumNumber::Long(val) => Ok(Some(val)),
            EnumNumber::Double(val) => {
                let val_trunc = val.trunc();
                if val_trunc >= i64::MIN as f64 && val_trunc < i64::MAX as f64 {
                    Ok(Some(val_trunc as i64))
                } else {
                    Err(self.create_out_of_range("i64"))
                }
            }
        }
    }

    /// Number truncated to `i64`, then checked against `i32` bounds.
    pub fn as_int(&self) -> Result<Option<i32>, CellError> {
        match self.as_long()? {
            None => Ok(None),
            Some(val) => i32::try_from(val)
                .map(Some)
                .map_err(|_| self.create_out_of_range("i32")),
        }
    }

    /// Number as `f64`.
    pub fn as_double(&self) -> Result<Option<f64>, CellError> {
        Ok(self.as_number()?.map(|number| number.as_f64()))
    }

    /// Number as `f32`.
    pub fn as_float(&self) -> Result<Option<f32>, CellError> {
        Ok(self.as_double()?.map(|val| val as f32))
    }

    /// Number as an exact decimal, built from the canonical digit string.
    pub fn as_decimal(&self) -> Result<Option<Decimal>, CellError> {
        let Some(parsed) = self.parse_number(&self.locale)? else {
            return Ok(None);
        };
        Decimal::from_str(&parsed.text_canonical)
            .map(Some)
            .map_err(|_| self.create_out_of_range("decimal"))
    }

    fn parse_number(&self, locale: &SpecNumberLocale) -> Result<Option<SpecParsedNumber>, CellError> {
        if self.is_blank() {
            return Ok(None);
        }
        let c_cleansed = cleanse_number_text(&self.text);
        match parse_number_prefix(&c_cleansed, locale) {
            Some(parsed) => Ok(Some(parsed)),
            None => {
                warn!(
                    idx_column = self.idx_column,
                    text = %self.text,
                    "failed to parse number"
                );
                Err(CellError::InvalidNumberFormat {
                    idx_column: self.idx_column,
                    text: self.text.clone(),
                })
            }
        }
    }

    // #endregion
    // #region Boolean

    /// `true` for `true`, `1`, `y`, `yes` (case-insensitive, trimmed); never fails.
    pub fn as_boolean(&self) -> bool {
        let c_val = self.text.trim().to_lowercase();
        TUP_BOOLEAN_TRUE.contains(&c_val.as_str())
    }

    // #endregion
    // #region Temporal

    /// Date from the first matching default pattern, then ISO.
    pub fn as_date(&self) -> Result<Option<NaiveDate>, CellError> {
        if self.is_blank() {
            return Ok(None);
        }
        for c_pattern in TUP_DATE_PATTERNS {
            if let Ok(date) = NaiveDate::parse_from_str(&self.text, c_pattern) {
                return Ok(Some(shift_two_digit_year(date, c_pattern)));
            }
        }
        NaiveDate::from_str(&self.text)
            .map(Some)
            .map_err(|_| self.create_date_error("date"))
    }

    /// Date parsed with exactly `format` (chrono `strftime` syntax).
    pub fn as_date_with_format(&self, format: &str) -> Result<Option<NaiveDate>, CellError> {
        if self.is_blank() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&self.text, format)
            .map(Some)
            .map_err(|_| self.create_date_error("date"))
    }

    /// Date-time from the first matching default pattern, then ISO.
    pub fn as_datetime(&self) -> Result<Option<NaiveDateTime>, CellError> {
        if self.is_blank() {
            return Ok(None);
        }
        for c_pattern in TUP_DATETIME_PATTERNS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(&self.text, c_pattern) {
                let date = shift_two_digit_year(datetime.date(), c_pattern);
                return Ok(Some(date.and_time(datetime.time())));
            }
        }
        NaiveDateTime::from_str(&self.text)
            .map(Some)
            .map_err(|_| self.create_date_error("date-time"))
    }

    /// Date-time parsed with exactly `format` (chrono `strftime` syntax).
    pub fn as_datetime_with_format(
        &self,
        format: &str,
    ) -> Result<Option<NaiveDateTime>, CellError> {
        if self.is_blank() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(&self.text, format)
            .map(Some)
            .map_err(|_| self.create_date_error("date-time"))
    }

    /// Time from the first matching default pattern, then ISO.
    pub fn as_time(&self) -> Result<Option<NaiveTime>, CellError> {
        if self.is_blank() {
            return Ok(None);
        }
        for c_pattern in TUP_TIME_PATTERNS {
            if let Ok(time) = NaiveTime::parse_from_str(&self.text, c_pattern) {
                return Ok(Some(time));
            }
        }
        NaiveTime::from_str(&self.text)
            .map(Some)
            .map_err(|_| self.create_date_error("time"))
    }

    /// Time parsed with exactly `format` (chrono `strftime` syntax).
    pub fn as_time_with_format(&self, format: &str) -> Result<Option<NaiveTime>, CellError> {
        if self.is_blank() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(&self.text, format)
            .map(Some)
            .map_err(|_| self.create_date_error("time"))
    }

    // #endregion

    fn create_out_of_range(&self, target: &'static str) -> CellError {
        CellError::OutOfRange {
            idx_column: self.idx_column,
            text: self.text.clone(),
            target,
        }
    }

    fn create_date_error(&self, target: &'static str) -> CellError {
        CellError::DateParse {
            idx_column: self.idx_column,
            text: self.text.clone(),
            target,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Two-digit years resolve into 2000..=2099.
fn shift_two_digit_year(date: NaiveDate, pattern: &str) -> NaiveDate {
    if !pattern.contains("%y") || date.year() >= 2000 {
        return date;
    }
    date.with_year(date.year() + 100).unwrap_or(date)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteSide

/// Value produced by a column function for one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellData {
    /// No value; written as a styled empty cell.
    #[default]
    Null,
    /// Text.
    String(String),
    /// Boolean.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Exact decimal.
    Decimal(Decimal),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time.
    DateTime(NaiveDateTime),
    /// Time of day.
    Time(NaiveTime),
}

impl EnumCellData {
    /// Short variant name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Time(_) => "time",
        }
    }
}

/// Default text form: what CSV writes and what a mismatched XLSX cell falls back to.
impl fmt::Display for EnumCellData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::String(val) => f.write_str(val),
            Self::Bool(val) => write!(f, "{val}"),
            Self::Int(val) => write!(f, "{val}"),
            Self::Long(val) => write!(f, "{val}"),
            Self::Float(val) => write!(f, "{val}"),
            Self::Double(val) => write!(f, "{val}"),
            Self::Decimal(val) => write!(f, "{val}"),
            Self::Date(val) => write!(f, "{val}"),
            Self::DateTime(val) => write!(f, "{val}"),
            Self::Time(val) => write!(f, "{val}"),
        }
    }
}

macro_rules! impl_from_cell_data {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for EnumCellData {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_cell_data!(
    String => String,
    bool => Bool,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    NaiveTime => Time,
);

impl From<&str> for EnumCellData {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<&String> for EnumCellData {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<u32> for EnumCellData {
    fn from(value: u32) -> Self {
        Self::Long(i64::from(value))
    }
}

impl From<usize> for EnumCellData {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(val) => Self::Long(val),
            Err(_) => Self::String(value.to_string()),
        }
    }
}

impl<T: Into<EnumCellData>> From<Option<T>> for EnumCellData {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> CellValue {
        CellValue::new(0, text)
    }

    #[test]
    fn missing_text_becomes_empty() {
        let value = CellValue::from_option(3, None);
        assert_eq!(value.as_str(), "");
        assert_eq!(value.idx_column(), 3);
        assert!(value.is_blank());
    }

    #[test]
    fn blank_numbers_are_none() {
        assert_eq!(cell("").as_number(), Ok(None));
        assert_eq!(cell("   ").as_long(), Ok(None));
        assert_eq!(cell(" ").as_decimal(), Ok(None));
    }

    #[test]
    fn number_parsing_cases() {
        assert_eq!(cell("123").as_int(), Ok(Some(123)));
        assert_eq!(cell("1,234,567").as_long(), Ok(Some(1_234_567)));
        assert_eq!(
            cell("$1234.56").as_decimal(),
            Ok(Some(Decimal::new(123_456, 2)))
        );
        assert_eq!(cell("12.34%").as_decimal(), Ok(Some(Decimal::new(1234, 2))));
        assert_eq!(cell("1234원").as_int(), Ok(Some(1234)));
        assert_eq!(cell("€ 99.5").as_double(), Ok(Some(99.5)));
        assert_eq!(cell("12.7").as_long(), Ok(Some(12)));
        assert_eq!(cell("-3.5").as_number(), Ok(Some(EnumNumber::Double(-3.5))));
    }

    #[test]
    fn invalid_number_reports_text_and_column() {
        let value = CellValue::new(4, "not a number");
        assert_eq!(
            value.as_number(),
            Err(CellError::InvalidNumberFormat {
                idx_column: 4,
                text: "not a number".to_string(),
            })
        );
    }

    #[test]
    fn int_out_of_range() {
        assert!(matches!(
            cell("3000000000").as_int(),
            Err(CellError::OutOfRange { target: "i32", .. })
        ));
        assert_eq!(cell("2147483647").as_int(), Ok(Some(i32::MAX)));
    }

    #[test]
    fn decimal_keeps_digits_beyond_f64() {
        assert_eq!(
            cell("0.1000000000000000055").as_decimal(),
            Ok(Some(
                Decimal::from_str("0.1000000000000000055").expect("decimal")
            ))
        );
    }

    #[test]
    fn locale_controls_symbols() {
        let value = cell("1.234,5").with_locale(SpecNumberLocale::germany());
        assert_eq!(value.as_double(), Ok(Some(1234.5)));
        assert_eq!(cell("1.234,5").as_double(), Ok(Some(1.234)));
    }

    #[test]
    fn boolean_tokens() {
        for c_text in ["Y", "yes", "1", "true", "TRUE", " Yes "] {
            assert!(cell(c_text).as_boolean(), "{c_text:?}");
        }
        for c_text in ["", "0", "no", "N", "false", "maybe"] {
            assert!(!cell(c_text).as_boolean(), "{c_text:?}");
        }
    }

    #[test]
    fn date_fallback_order() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 19).expect("date");
        assert_eq!(cell("2025-07-19").as_date(), Ok(Some(date)));
        assert_eq!(cell("2025/07/19").as_date(), Ok(Some(date)));
        assert_eq!(cell("07/19/25").as_date(), Ok(Some(date)));
        assert_eq!(cell("7/19/25").as_date(), Ok(Some(date)));
        assert_eq!(
            cell("12/31/99").as_date(),
            Ok(Some(NaiveDate::from_ymd_opt(2099, 12, 31).expect("date")))
        );
        assert!(matches!(
            cell("19.07.2025").as_date(),
            Err(CellError::DateParse { .. })
        ));
        assert_eq!(cell("").as_date(), Ok(None));
    }

    #[test]
    fn datetime_fallback_order() {
        let datetime = NaiveDate::from_ymd_opt(2025, 7, 19)
            .and_then(|date| date.and_hms_opt(10, 30, 0))
            .expect("datetime");
        assert_eq!(cell("2025-07-19 10:30:00").as_datetime(), Ok(Some(datetime)));
        assert_eq!(cell("2025-07-19 10:30").as_datetime(), Ok(Some(datetime)));
        assert_eq!(cell("2025/07/19 10:30").as_datetime(), Ok(Some(datetime)));
        assert_eq!(cell("07/19/25 10:30:00").as_datetime(), Ok(Some(datetime)));
        assert_eq!(cell("2025-07-19T10:30:00").as_datetime(), Ok(Some(datetime)));
        assert!(cell("2025-07-19").as_datetime().is_err());
    }

    #[test]
    fn time_fallback_order() {
        let time = NaiveTime::from_hms_opt(8, 5, 0).expect("time");
        assert_eq!(cell("08:05:00").as_time(), Ok(Some(time)));
        assert_eq!(cell("08:05").as_time(), Ok(Some(time)));
        assert!(cell("8 o'clock").as_time().is_err());
    }

    #[test]
    fn explicit_formats_do_not_fall_back() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 19).expect("date");
        assert_eq!(cell("19.07.2025").as_date_with_format("%d.%m.%Y"), Ok(Some(date)));
        assert!(cell("2025-07-19").as_date_with_format("%d.%m.%Y").is_err());
        assert!(
            cell("2025-07-19 10:30")
                .as_datetime_with_format("%Y-%m-%d %H:%M:%S")
                .is_err()
        );
        assert_eq!(
            cell("10h30").as_time_with_format("%Hh%M"),
            Ok(NaiveTime::from_hms_opt(10, 30, 0))
        );
    }

    #[test]
    fn cell_data_conversions_and_text_form() {
        assert_eq!(EnumCellData::from(Some(5_i64)), EnumCellData::Long(5));
        assert_eq!(EnumCellData::from(None::<String>), EnumCellData::Null);
        assert_eq!(EnumCellData::from("x"), EnumCellData::String("x".to_string()));
        assert_eq!(EnumCellData::Null.to_string(), "");
        assert_eq!(EnumCellData::Double(1234.5).to_string(), "1234.5");
        assert_eq!(EnumCellData::Bool(true).to_string(), "true");
        assert_eq!(
            EnumCellData::from(NaiveDate::from_ymd_opt(2025, 1, 2).expect("date")).to_string(),
            "2025-01-02"
        );
    }
}
