// In-memory tabular data
// Tables are immutable once built; the loader module turns CSV files into tables

pub mod loader;

#[cfg(test)]
mod tests;

use chrono::{NaiveDateTime, NaiveTime};
use std::fmt::{self, Write as _};
use thiserror::Error;

pub use loader::{load_bytes, load_path};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("The file contains no data")]
    EmptyFile,
    #[error("The table contains no columns")]
    NoColumns,
    #[error("The table contains no rows")]
    NoRows,
    #[error("Column '{column}' has {found} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("Unsupported file format: .{0} (only CSV files can be loaded)")]
    UnsupportedFormat(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    Numeric,
    Boolean,
    DateTime,
    Text,
}

impl fmt::Display for ColumnType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn natural_type(&self) -> Option<ColumnType> {
        match self {
            Self::Missing => None,
            Self::Number(_) => Some(ColumnType::Numeric),
            Self::Boolean(_) => Some(ColumnType::Boolean),
            Self::DateTime(_) => Some(ColumnType::DateTime),
            Self::Text(_) => Some(ColumnType::Text),
        }
    }
}

impl fmt::Display for CellValue {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("NaN"),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    write!(f, "{:.0}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Self::Boolean(true) => f.write_str("True"),
            Self::Boolean(false) => f.write_str("False"),
            Self::DateTime(value) => {
                if value.time() == NaiveTime::MIN {
                    write!(f, "{}", value.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A named, typed column of values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnType,
    values: Vec<CellValue>,
}

impl Column {
    /// Build a column, inferring its type from the values.
    ///
    /// A column whose non-missing values all share one variant takes that
    /// variant's type. Mixed columns and columns with no values are text.
    #[inline]
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = infer_kind(&values);
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    #[inline]
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(CellValue::Number).collect())
    }

    #[inline]
    pub fn text<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            values
                .into_iter()
                .map(|value| CellValue::Text(value.into()))
                .collect(),
        )
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    #[inline]
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnType::Numeric
    }

    #[inline]
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Non-missing numeric values in row order
    #[inline]
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(CellValue::as_number)
    }
}

fn infer_kind(values: &[CellValue]) -> ColumnType {
    let mut kind = None;
    for value_kind in values.iter().filter_map(CellValue::natural_type) {
        match kind {
            None => kind = Some(value_kind),
            Some(existing) if existing != value_kind => return ColumnType::Text,
            Some(_) => {}
        }
    }
    kind.unwrap_or(ColumnType::Text)
}

/// An immutable table of equally sized columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    #[inline]
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let Some(first) = columns.first() else {
            return Err(TableError::NoColumns);
        };
        let row_count = first.len();

        if let Some(column) = columns.iter().find(|c| c.len() != row_count) {
            return Err(TableError::LengthMismatch {
                column: column.name.clone(),
                expected: row_count,
                found: column.len(),
            });
        }

        Ok(Self { columns, row_count })
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[inline]
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    /// Leftmost column whose values are all numeric
    #[inline]
    pub fn first_numeric_column(&self) -> Option<&Column> {
        self.numeric_columns().next()
    }

    /// Cells of row `index`, left to right
    #[inline]
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Render the table as aligned plain text, one line per row.
    ///
    /// The first line holds the column names. Every following line starts
    /// with the row index. Cells are right-aligned to the widest entry of
    /// their column and separated by two spaces.
    #[inline]
    pub fn to_text(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| c.values.iter().map(ToString::to_string).collect())
            .collect();

        let index_width = self.row_count.saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&rendered)
            .map(|(column, cells)| {
                cells
                    .iter()
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.row_count + 1);

        let mut header = " ".repeat(index_width);
        for (column, width) in self.columns.iter().zip(&widths) {
            let _ = write!(header, "  {:>width$}", column.name, width = *width);
        }
        lines.push(header);

        for row in 0..self.row_count {
            let mut line = format!("{:<width$}", row, width = index_width);
            for (cells, width) in rendered.iter().zip(&widths) {
                let _ = write!(line, "  {:>width$}", cells[row], width = *width);
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}
