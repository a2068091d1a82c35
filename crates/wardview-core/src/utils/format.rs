use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Placeholder shown for empty or placeholder clinical values.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Backend markers that mean "no value" in free-text fields.
const EMPTY_MARKERS: [&str; 2] = ["no tiene", "campo no presente"];

/// Case-insensitive substring test. `needle` must already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(needle)
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Display a clinical free-text value, mapping the backend's "nothing here"
/// spellings to a single placeholder.
pub fn format_value(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim) else {
        return NOT_SPECIFIED.to_string();
    };
    let lower = value.to_lowercase();
    if value.is_empty() || lower == "null" || EMPTY_MARKERS.iter().any(|m| lower.contains(m)) {
        NOT_SPECIFIED.to_string()
    } else {
        value.to_string()
    }
}

/// Format a date as dd/mm/yyyy. Accepts RFC 3339 timestamps and plain
/// `YYYY-MM-DD`; anything else is shown as received.
pub fn format_date(date: Option<&str>) -> String {
    let date = match date.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => return NOT_SPECIFIED.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.format("%d/%m/%Y").to_string()
    } else if let Some(d) = date.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        d.format("%d/%m/%Y").to_string()
    } else {
        date.to_string()
    }
}

/// Flatten a free-form JSON block into `(label, value)` rows for display.
/// Nested objects use dotted labels.
pub fn value_lines(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    collect_value_lines(value, String::new(), &mut rows);
    rows
}

fn collect_value_lines(value: &Value, prefix: String, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                let label = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_value_lines(child, label, rows);
            }
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(scalar_display)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            rows.push((prefix, format_value(Some(&joined))));
        }
        other => rows.push((prefix, format_value(Some(&scalar_display(other))))),
    }
}

fn scalar_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
