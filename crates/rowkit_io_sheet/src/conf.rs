//! Sheet constants and default preset factories.

use crate::spec::{SpecCellFormat, SpecRgb};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Default number of data rows per sheet before rollover.
pub const N_ROWS_PER_SHEET_DEFAULT: usize = 1_000_000;
/// Rows per sheet sampled for column width estimation.
pub const N_ROWS_WIDTH_SAMPLE_DEFAULT: usize = 100;
/// Minimum number of columns a write call accepts.
pub const N_COLUMNS_MIN: usize = 2;

/// Width contributed by one logical character, in 1/256 character units.
pub const N_WIDTH_PER_CHAR: usize = 250;
/// Width padding added to every estimate, in 1/256 character units.
pub const N_WIDTH_PADDING: usize = 1_024;
/// Maximum column width Excel accepts, in 1/256 character units.
pub const N_WIDTH_MAX: usize = 255 * 256;

/// Default data row height in points.
pub const F_ROW_HEIGHT_DEFAULT: f64 = 20.0;
/// Default header font size in points.
pub const N_FONT_SIZE_HEADER_DEFAULT: u32 = 11;
/// Fill colors whose luminance is below this are treated as dark.
pub const F_LUMINANCE_DARK_MAX: f64 = 128.0;

/// Default header fill color.
pub const RGB_HEADER_DEFAULT: SpecRgb = SpecRgb::new(255, 255, 255);

/// Lower-cased tokens read as `true`.
pub const TUP_BOOLEAN_TRUE: [&str; 4] = ["true", "1", "y", "yes"];
/// Currency and percent symbols removed before numeric parsing.
pub const TUP_NUMBER_SYMBOLS_STRIPPED: [char; 5] = ['$', '₩', '€', '%', '원'];

/// Date patterns tried in order when no explicit format is given.
pub const TUP_DATE_PATTERNS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%y", "%-m/%-d/%y"];
/// Date-time patterns tried in order when no explicit format is given.
pub const TUP_DATETIME_PATTERNS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%-m/%-d/%y %H:%M:%S",
    "%-m/%-d/%y %H:%M",
];
/// Time patterns tried in order when no explicit format is given.
pub const TUP_TIME_PATTERNS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Date rendering used when reading date cells.
pub const C_READ_DATE_FORMAT: &str = "%Y-%m-%d";
/// Date-time rendering used when reading date-time cells.
pub const C_READ_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Time rendering used when reading time cells.
pub const C_READ_TIME_FORMAT: &str = "%H:%M:%S";

/// Build the header style for a fill color.
///
/// The font flips to white on dark fills so the header stays readable.
pub fn derive_default_header_format(rgb_fill: SpecRgb, font_size: u32) -> SpecCellFormat {
    let rgb_font = if rgb_fill.is_dark() {
        SpecRgb::new(255, 255, 255)
    } else {
        SpecRgb::new(0, 0, 0)
    };

    SpecCellFormat {
        font_size: Some(font_size),
        bold: Some(true),
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        border: Some(1),
        bg_color: Some(rgb_fill.to_hex()),
        font_color: Some(rgb_font.to_hex()),
        ..Default::default()
    }
}

/// Build the body style shared by all data cells of one column.
pub fn derive_default_body_format(align: &str, num_format: Option<&str>) -> SpecCellFormat {
    SpecCellFormat {
        align: Some(align.to_string()),
        valign: Some("vcenter".to_string()),
        border: Some(1),
        text_wrap: Some(true),
        num_format: num_format.map(ToString::to_string),
        ..Default::default()
    }
}
