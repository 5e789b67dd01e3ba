
use fancy_regex::Regex;
use itertools::Itertools;
use std::sync::LazyLock;
use tracing::debug;

use crate::table::Table;

pub const HELP_MESSAGE: &str =
    "I can help you analyze your data. Try asking about totals, averages, counts, or columns.";

pub const NO_NUMERIC_COLUMNS: &str = "No numeric columns found in the dataset.";

/// Questions the router can answer straight from the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Total,
    Average,
    Count,
    Columns,
}

// checked in order, the first match wins; keywords match anywhere in the question
static INTENT_PATTERNS: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Intent::Total,
            Regex::new(r"(?i)total").expect("valid regex"),
        ),
        (
            Intent::Average,
            Regex::new(r"(?i)average|mean").expect("valid regex"),
        ),
        (
            Intent::Count,
            Regex::new(
                r"(?i)count|how\s+many\s+(?:rows|records|entries)|number\s+of\s+(?:rows|records|entries)",
            )
            .expect("valid regex"),
        ),
        (
            Intent::Columns,
            Regex::new(r"(?i)columns").expect("valid regex"),
        ),
    ]
});

/// Match a question against the keyword shortcuts
#[inline]
pub fn classify(query: &str) -> Option<Intent> {
    INTENT_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(query).unwrap_or(false))
        .map(|(intent, _)| *intent)
}

/// Answer a question directly from the table when it matches a shortcut
#[inline]
pub fn route(query: &str, table: &Table) -> Option<String> {
    let intent = classify(query)?;
    debug!("Routing question to {:?} shortcut", intent);
    Some(answer(intent, table))
}

/// Compute the direct answer for an intent
#[inline]
pub fn answer(intent: Intent, table: &Table) -> String {
    match intent {
        Intent::Total => table.first_numeric_column().map_or_else(
            || NO_NUMERIC_COLUMNS.to_string(),
            |column| {
                let total = column.numbers().fold(0.0, |acc, v| acc + v);
                format!(
                    "The total for {} is {}",
                    column.name(),
                    format_number(total, 2)
                )
            },
        ),
        Intent::Average => table.first_numeric_column().map_or_else(
            || NO_NUMERIC_COLUMNS.to_string(),
            |column| {
                let values: Vec<f64> = column.numbers().collect();
                format!(
                    "The average for {} is {}",
                    column.name(),
                    format_number(crate::stats::mean(&values), 2)
                )
            },
        ),
        Intent::Count => format!("The total number of records is {}", table.row_count()),
        Intent::Columns => format!(
            "The columns in the dataset are: {}",
            table.column_names().join(", ")
        ),
    }
}

/// Format with a fixed number of decimals and `,` between thousands
#[inline]
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(i, f)| (i, Some(f)));

    let grouped = integer
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|group| String::from_utf8_lossy(group))
        .join(",");

    let sign = if value.is_sign_negative() { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
