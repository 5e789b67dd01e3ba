
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::{CellValue, Column, Table, TableError};

/// Tokens read as missing values
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "-NaN",
    "-nan",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Load a CSV file from disk
#[inline]
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Table, TableError> {
    let path = path.as_ref();

    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        let extension = extension.to_ascii_lowercase();
        if extension == "xlsx" || extension == "xls" {
            return Err(TableError::UnsupportedFormat(extension));
        }
    }

    let bytes = fs::read(path)?;
    let table = load_bytes(&bytes)?;

    info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Parse CSV content, inferring a type for every column
#[inline]
pub fn load_bytes(bytes: &[u8]) -> Result<Table, TableError> {
    let text = decode_text(bytes);
    if text.trim().is_empty() {
        return Err(TableError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(TableError::NoColumns);
    }
    let names = column_names(&headers);

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record?;
        for (cells, field) in raw_columns.iter_mut().zip(record.iter()) {
            cells.push(field.to_string());
        }
    }

    if raw_columns.first().is_none_or(Vec::is_empty) {
        return Err(TableError::NoRows);
    }

    let columns = names
        .into_iter()
        .zip(raw_columns)
        .map(|(name, cells)| parse_column(name, cells))
        .collect();

    Table::new(columns)
}

/// Decode as UTF-8, falling back to Latin-1 when the bytes are not valid UTF-8
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            debug!("Input is not valid UTF-8 ({}), decoding as Latin-1", e);
            Cow::Owned(bytes.iter().copied().map(char::from).collect())
        }
    }
}

/// Fill blank header cells and suffix duplicates so every column name is unique
fn column_names(headers: &csv::StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// Pick the narrowest type every non-missing cell parses as: number, boolean,
/// datetime, then text
fn parse_column(name: String, cells: Vec<String>) -> Column {
    let present = || cells.iter().filter(|c| !is_missing(c));

    let parsers: [fn(&str) -> Option<CellValue>; 3] = [parse_number, parse_boolean, parse_datetime];
    for parser in parsers {
        if present().next().is_some() && present().all(|c| parser(c).is_some()) {
            let values = cells
                .iter()
                .map(|c| {
                    if is_missing(c) {
                        CellValue::Missing
                    } else {
                        parser(c).unwrap_or(CellValue::Missing)
                    }
                })
                .collect();
            return Column::new(name, values);
        }
    }

    let values = cells
        .into_iter()
        .map(|c| {
            if is_missing(&c) {
                CellValue::Missing
            } else {
                CellValue::Text(c)
            }
        })
        .collect();
    Column::new(name, values)
}

fn parse_number(cell: &str) -> Option<CellValue> {
    cell.parse::<f64>().ok().map(CellValue::Number)
}

fn parse_boolean(cell: &str) -> Option<CellValue> {
    if cell.eq_ignore_ascii_case("true") {
        Some(CellValue::Boolean(true))
    } else if cell.eq_ignore_ascii_case("false") {
        Some(CellValue::Boolean(false))
    } else {
        None
    }
}

fn parse_datetime(cell: &str) -> Option<CellValue> {
    if let Ok(value) = DateTime::parse_from_rfc3339(cell) {
        return Some(CellValue::DateTime(value.naive_utc()));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(cell, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .map(CellValue::DateTime)
}
