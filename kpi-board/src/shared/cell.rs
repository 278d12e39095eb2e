//! Spreadsheet cell coercion
//!
//! Cells arrive as loosely-typed JSON (usually strings typed by a person).
//! Nothing here fails: anything that is not a usable number becomes `None`.

use serde_json::Value;

/// Coerce a raw cell into a number.
///
/// Accepts currency symbols, thousands separators and accounting-style
/// parenthesized negatives. `None` means "no value", never zero.
pub fn parse_number(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Null => None,
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_str(s),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text form of [`parse_number`].
pub fn parse_number_str(raw: &str) -> Option<f64> {
    let mut s = raw.trim();

    let paren_negative = s.len() >= 2 && s.starts_with('(') && s.ends_with(')');
    if paren_negative {
        s = &s[1..s.len() - 1];
    }

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if matches!(cleaned.as_str(), "" | "-" | "." | "-.") {
        return None;
    }

    let n: f64 = cleaned.parse().ok()?;
    if !n.is_finite() {
        return None;
    }

    Some(if paren_negative { -n } else { n })
}

/// Display text of a raw cell. Absent and null cells are empty.
pub fn cell_text(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Cell at `row`/`col` of a ragged grid, if present.
pub fn cell_at(rows: &[Vec<Value>], row: usize, col: usize) -> Option<&Value> {
    rows.get(row).and_then(|r| r.get(col))
}
