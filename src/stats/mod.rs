// Descriptive statistics over a loaded table


use itertools::Itertools;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::table::{CellValue, Column, ColumnType, Table};

/// Count, mean, spread and quartiles of a numeric column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summary of a non-numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

/// `describe` of a numeric column extended with its distribution shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailedSummary {
    pub summary: NumericSummary,
    /// Adjusted Fisher-Pearson sample skewness, NaN below three values
    pub skew: f64,
    /// Bias-corrected excess kurtosis, NaN below four values
    pub kurtosis: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Describe a column.
///
/// Numeric columns get count, mean, sample standard deviation, min,
/// quartiles and max, all over the non-missing values. Values that cannot be
/// computed (the mean of nothing, the deviation of a single value) are NaN.
/// Every other column gets count, unique, most frequent value and its
/// frequency.
#[inline]
pub fn describe(column: &Column) -> ColumnSummary {
    if column.is_numeric() {
        let values: Vec<f64> = column.numbers().collect();
        ColumnSummary::Numeric(numeric_summary(&values))
    } else {
        ColumnSummary::Categorical(categorical_summary(column))
    }
}

/// Numeric summary plus skewness and kurtosis, `None` for non-numeric columns
#[inline]
pub fn detailed_describe(column: &Column) -> Option<DetailedSummary> {
    if !column.is_numeric() {
        return None;
    }
    let values: Vec<f64> = column.numbers().collect();
    Some(DetailedSummary {
        summary: numeric_summary(&values),
        skew: skew(&values),
        kurtosis: kurtosis(&values),
    })
}

fn numeric_summary(values: &[f64]) -> NumericSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    NumericSummary {
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

fn categorical_summary(column: &Column) -> CategoricalSummary {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut count = 0;
    for (position, value) in column.values().iter().enumerate() {
        if value.is_missing() {
            continue;
        }
        count += 1;
        counts
            .entry(value.to_string())
            .or_insert((0, position))
            .0 += 1;
    }

    // most frequent value, first seen wins ties
    let top = counts
        .iter()
        .max_by(|(_, (freq_a, first_a)), (_, (freq_b, first_b))| {
            freq_a.cmp(freq_b).then(first_b.cmp(first_a))
        })
        .map(|(value, (freq, _))| (value.clone(), *freq));

    CategoricalSummary {
        count,
        unique: counts.len(),
        freq: top.as_ref().map_or(0, |(_, freq)| *freq),
        top: top.map(|(value, _)| value),
    }
}

/// Arithmetic mean, NaN for no values
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with one delta degree of freedom, NaN below two values
#[inline]
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Sums of squared, cubed and fourth-power deviations from the mean
fn central_sums(values: &[f64]) -> (f64, f64, f64) {
    let mean = mean(values);
    values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), v| {
        let d = v - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    })
}

/// Sample skewness with the small-sample adjustment; constant input gives 0
#[inline]
pub fn skew(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 {
        return f64::NAN;
    }
    let (m2, m3, _) = central_sums(values);
    if m2 == 0.0 {
        return 0.0;
    }
    (n * (n - 1.0).sqrt() / (n - 2.0)) * (m3 / m2.powf(1.5))
}

/// Sample excess kurtosis with the small-sample adjustment; constant input
/// gives 0
#[inline]
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 4 {
        return f64::NAN;
    }
    let (m2, _, m4) = central_sums(values);
    let denominator = (n - 2.0) * (n - 3.0) * m2 * m2;
    if denominator == 0.0 {
        return 0.0;
    }
    let adjustment = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    n * (n + 1.0) * (n - 1.0) * m4 / denominator - adjustment
}

/// Quantile of already sorted values using linear interpolation between the
/// two closest ranks
#[inline]
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let position = (len - 1) as f64 * q.clamp(0.0, 1.0);
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}

impl NumericSummary {
    fn rows(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

impl fmt::Display for ColumnSummary {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(summary) => write_numeric_rows(f, &summary.rows()),
            Self::Categorical(summary) => {
                let top = summary.top.as_deref().unwrap_or("NaN");
                let rows = [
                    ("count", summary.count.to_string()),
                    ("unique", summary.unique.to_string()),
                    ("top", top.to_string()),
                    ("freq", summary.freq.to_string()),
                ];
                write_rows(f, &rows)
            }
        }
    }
}

impl fmt::Display for DetailedSummary {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = self.summary.rows();
        rows.push(("skew", self.skew));
        rows.push(("kurtosis", self.kurtosis));
        write_numeric_rows(f, &rows)
    }
}

fn write_numeric_rows(f: &mut fmt::Formatter<'_>, rows: &[(&str, f64)]) -> fmt::Result {
    let rows: Vec<(&str, String)> = rows
        .iter()
        .map(|(label, value)| (*label, format_number(*value, 6)))
        .collect();
    write_rows(f, &rows)
}

/// One `label  value` line per row, labels left and values right aligned
fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[(&str, String)]) -> fmt::Result {
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or(0);
    for (position, (label, value)) in rows.iter().enumerate() {
        if position > 0 {
            f.write_str("\n")?;
        }
        write!(f, "{:<label_width$}  {:>width$}", label, value)?;
    }
    Ok(())
}

fn format_number(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// Dataset-wide counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub rows: usize,
    pub columns: usize,
    pub missing_values: usize,
    pub duplicate_rows: usize,
    pub column_types: BTreeMap<ColumnType, usize>,
}

#[inline]
pub fn overview(table: &Table) -> Overview {
    let mut column_types = BTreeMap::new();
    for column in table.columns() {
        *column_types.entry(column.kind()).or_insert(0) += 1;
    }

    Overview {
        rows: table.row_count(),
        columns: table.column_count(),
        missing_values: table.columns().iter().map(Column::missing_count).sum(),
        duplicate_rows: duplicate_rows(table),
        column_types,
    }
}

/// Rows identical to an earlier row
fn duplicate_rows(table: &Table) -> usize {
    let mut seen = HashSet::with_capacity(table.row_count());
    (0..table.row_count())
        .filter_map(|index| table.row(index))
        .filter(|row| !seen.insert(row.iter().copied().map(cell_key).join("\u{1f}")))
        .count()
}

fn cell_key(cell: &CellValue) -> String {
    format!("{:?}", cell)
}

/// Mean, deviation and range of a numeric column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericQuality {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Data quality metrics for one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnQuality {
    pub name: String,
    pub kind: ColumnType,
    pub missing: usize,
    pub missing_percentage: f64,
    pub unique_values: usize,
    /// Up to three non-missing values in row order
    pub sample_values: Vec<String>,
    pub numeric: Option<NumericQuality>,
}

#[inline]
pub fn quality_metrics(table: &Table) -> Vec<ColumnQuality> {
    table
        .columns()
        .iter()
        .map(|column| column_quality(column, table.row_count()))
        .collect()
}

fn column_quality(column: &Column, rows: usize) -> ColumnQuality {
    let missing = column.missing_count();
    let present = || column.values().iter().filter(|v| !v.is_missing());

    let numeric = column.is_numeric().then(|| {
        let values: Vec<f64> = column.numbers().collect();
        NumericQuality {
            mean: mean(&values),
            std: sample_std(&values),
            min: values.iter().copied().fold(f64::NAN, f64::min),
            max: values.iter().copied().fold(f64::NAN, f64::max),
        }
    });

    ColumnQuality {
        name: column.name().to_string(),
        kind: column.kind(),
        missing,
        missing_percentage: if rows == 0 {
            0.0
        } else {
            missing as f64 / rows as f64 * 100.0
        },
        unique_values: present().map(cell_key).unique().count(),
        sample_values: present().take(3).map(ToString::to_string).collect(),
        numeric,
    }
}

/// Pairwise Pearson correlations between numeric columns
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    #[inline]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Correlation matrix of every numeric column, `None` when there are none.
///
/// Each pair uses the rows where both values are present.
#[inline]
pub fn correlations(table: &Table) -> Option<CorrelationMatrix> {
    let columns: Vec<&Column> = table.numeric_columns().collect();
    if columns.is_empty() {
        return None;
    }

    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();

    Some(CorrelationMatrix {
        columns: columns.iter().map(|c| c.name().to_string()).collect(),
        values,
    })
}

fn pearson(a: &Column, b: &Column) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .values()
        .iter()
        .zip(b.values())
        .filter_map(|(x, y)| Some((x.as_number()?, y.as_number()?)))
        .unzip();

    if xs.len() < 2 {
        return f64::NAN;
    }

    let mean_x = mean(&xs);
    let mean_y = mean(&ys);
    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        covariance += (x - mean_x) * (y - mean_y);
        variance_x += (x - mean_x).powi(2);
        variance_y += (y - mean_y).powi(2);
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        f64::NAN
    } else {
        (covariance / denominator).clamp(-1.0, 1.0)
    }
}

impl fmt::Display for CorrelationMatrix {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .columns
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        let cell_width = label_width.max(9);

        write!(f, "{:label_width$}", "")?;
        for name in &self.columns {
            write!(f, "  {:>cell_width$}", name)?;
        }
        for (name, row) in self.columns.iter().zip(&self.values) {
            write!(f, "\n{:<label_width$}", name)?;
            for value in row {
                write!(f, "  {:>cell_width$}", format_number(*value, 6))?;
            }
        }
        Ok(())
    }
}
