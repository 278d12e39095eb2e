//! Tile value formatting
//!
//! Values are always shown as whole numbers. Rounding is half away from zero.

use super::types::UnitToken;

/// Shown for tiles without a value, whatever the unit
pub const NO_VALUE_PLACEHOLDER: &str = "—";

/// Render `value` for display in `unit`
pub fn format_value(value: Option<f64>, unit: UnitToken) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NO_VALUE_PLACEHOLDER.to_string();
    };

    let (negative, digits) = round_whole(value);
    let sign = if negative { "-" } else { "" };
    match unit {
        UnitToken::Currency => format!("{}${}", sign, group_thousands(&digits, ',')),
        UnitToken::Percent => format!("{}{}%", sign, digits),
        UnitToken::Plain => format!("{}{}", sign, digits),
    }
}

/// Sign and whole-number digits of `value`.
///
/// `f64::round` rounds half away from zero. Digits come from the float itself,
/// so magnitudes past `i64` print in full; -0 folds into 0.
fn round_whole(value: f64) -> (bool, String) {
    let rounded = value.round();
    (rounded < 0.0, format!("{:.0}", rounded.abs()))
}

fn group_thousands(int_part: &str, sep: char) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        let pos_from_end = len - i;
        out.push(ch);
        if pos_from_end > 1 && pos_from_end % 3 == 1 {
            out.push(sep);
        }
    }
    out
}
