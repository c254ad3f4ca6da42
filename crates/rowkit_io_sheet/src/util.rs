//! Stateless helper utilities used by writers and readers.

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_WIDTH_MAX, N_WIDTH_PADDING, N_WIDTH_PER_CHAR,
    TUP_EXCEL_ILLEGAL, TUP_NUMBER_SYMBOLS_STRIPPED,
};
use crate::spec::SpecNumberLocale;

////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Count display units of `text`: 1 per ASCII char, 2 per any other char.
pub fn estimate_logical_length(text: &str) -> usize {
    text.chars()
        .map(|chr| if chr.is_ascii() { 1 } else { 2 })
        .sum()
}

/// Estimate a column width for `text` in 1/256 character units, capped at the
/// engine maximum.
pub fn estimate_column_width(text: &str) -> usize {
    usize::min(
        N_WIDTH_MAX,
        estimate_logical_length(text)
            .saturating_mul(N_WIDTH_PER_CHAR)
            .saturating_add(N_WIDTH_PADDING),
    )
}

/// Convert 1/256 character units into the engine's character width.
pub fn convert_width_to_chars(width: usize) -> f64 {
    width as f64 / 256.0
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Color

/// Perceived luminance (`0.299 R + 0.587 G + 0.114 B`).
pub fn calculate_luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellReference

/// Decode the column part of a cell reference to a zero-based index.
///
/// `"A1"` -> 0, `"C5"` -> 2, `"AA10"` -> 26. A bare column (`"AB"`) is
/// accepted; letters are case-insensitive.
pub fn derive_column_index(reference: &str) -> Result<usize, String> {
    let c_letters: String = reference
        .trim()
        .chars()
        .take_while(|chr| chr.is_ascii_alphabetic())
        .collect();
    let c_rest = &reference.trim()[c_letters.len()..];

    if c_letters.is_empty() {
        return Err(format!("Cell reference has no column letters: {reference:?}"));
    }
    if !c_rest.chars().all(|chr| chr.is_ascii_digit()) {
        return Err(format!("Invalid cell reference: {reference:?}"));
    }

    let mut n_idx = 0usize;
    for chr in c_letters.chars() {
        let n_digit = (chr.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n_idx = n_idx
            .checked_mul(26)
            .and_then(|val| val.checked_add(n_digit))
            .ok_or_else(|| format!("Cell reference column overflow: {reference:?}"))?;
    }
    Ok(n_idx - 1)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Create suffixed sheet name (`base_2`, `base_3`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{part_idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

/// Whether a sheet must be started before writing the `n_total`-th data row
/// (1-based), given `rows_per_sheet` rows per sheet.
///
/// True for rows `T+1, 2T+1, 3T+1, ...`.
pub fn if_rollover_before(n_total: usize, rows_per_sheet: usize) -> bool {
    rows_per_sheet > 0 && n_total > rows_per_sheet && (n_total - 1) % rows_per_sheet == 0
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NumberParsing

/// Number parsed from cell text, with the canonical digit string it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecParsedNumber {
    /// `-?digits(.digits)?` with grouping removed and `.` as decimal symbol.
    pub text_canonical: String,
    /// Integral values that fit `i64` are kept exact.
    pub value: EnumParsedValue,
}

/// Integral or floating parse result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumParsedValue {
    /// Integral and within `i64`.
    Long(i64),
    /// Anything else.
    Double(f64),
}

/// Strip no-break spaces, currency/percent symbols and plain spaces.
///
/// Commas are kept: grouping and decimal separators are resolved by
/// [`parse_number_prefix`] against the number locale, so `"1,5"` reads as 1.5
/// under a `,`-decimal locale instead of 15.
pub fn cleanse_number_text(text: &str) -> String {
    text.replace('\u{00A0}', " ")
        .chars()
        .filter(|chr| !TUP_NUMBER_SYMBOLS_STRIPPED.contains(chr) && *chr != ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse the longest numeric prefix of already-cleansed text.
///
/// Grouping symbols are accepted between integer digits; parsing stops at the
/// first character that cannot continue the number (`"10kg"` -> 10). Returns
/// `None` when no digit leads the text.
pub fn parse_number_prefix(text: &str, locale: &SpecNumberLocale) -> Option<SpecParsedNumber> {
    let l_chars: Vec<char> = text.chars().collect();
    let mut n_pos = 0usize;

    let if_negative = l_chars.first() == Some(&'-');
    if if_negative {
        n_pos += 1;
    }

    let mut c_int = String::new();
    while n_pos < l_chars.len() {
        let chr = l_chars[n_pos];
        if chr.is_ascii_digit() {
            c_int.push(chr);
            n_pos += 1;
        } else if chr == locale.grouping
            && !c_int.is_empty()
            && l_chars.get(n_pos + 1).is_some_and(char::is_ascii_digit)
        {
            n_pos += 1;
        } else {
            break;
        }
    }

    let mut c_frac = String::new();
    if l_chars.get(n_pos) == Some(&locale.decimal) {
        let mut n_pos_frac = n_pos + 1;
        while let Some(chr) = l_chars.get(n_pos_frac)
            && chr.is_ascii_digit()
        {
            c_frac.push(*chr);
            n_pos_frac += 1;
        }
    }

    if c_int.is_empty() && c_frac.is_empty() {
        return None;
    }
    if c_int.is_empty() {
        c_int.push('0');
    }

    let c_frac_trimmed = c_frac.trim_end_matches('0');
    let c_sign = if if_negative { "-" } else { "" };
    let text_canonical = if c_frac_trimmed.is_empty() {
        format!("{c_sign}{c_int}")
    } else {
        format!("{c_sign}{c_int}.{c_frac_trimmed}")
    };

    let value = if c_frac_trimmed.is_empty()
        && let Ok(val) = text_canonical.parse::<i64>()
    {
        EnumParsedValue::Long(val)
    } else {
        EnumParsedValue::Double(text_canonical.parse::<f64>().ok()?)
    };

    Some(SpecParsedNumber {
        text_canonical,
        value,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
