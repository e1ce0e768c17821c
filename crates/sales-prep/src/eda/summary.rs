//! Descriptive statistics and missing-value counts.

use crate::error::Result;
use crate::utils::{
    DtypeCategory, columns_of_category, float_values, numeric_columns, observed_count, quartiles,
    require_column, string_mode,
};
use polars::prelude::*;
use serde::Serialize;
use std::io::{self, Write};
use tracing::info;

/// Summary statistics for one numeric column.
///
/// Quantiles use linear interpolation between closest ranks. Every field but
/// `count` is `None` when the column has no observed values (and `std` also
/// when it has only one).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    fn from_series(series: &Series) -> PolarsResult<Self> {
        let values = float_values(series)?;
        let (q25, median, q75) = match quartiles(&values)? {
            Some((q1, median, q3)) => (Some(q1), Some(median), Some(q3)),
            None => (None, None, None),
        };
        Ok(Self {
            name: series.name().to_string(),
            count: observed_count(&values),
            mean: values.mean(),
            std: values.std(1),
            min: values.min(),
            q25,
            median,
            q75,
            max: values.max(),
        })
    }

    fn rows(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("count", Some(self.count as f64)),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Count, distinct values and most frequent value of one text column.
///
/// `top` ties go to the smallest value, as in the mode fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalStats {
    pub name: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl CategoricalStats {
    fn from_series(series: &Series) -> PolarsResult<Self> {
        let text = series.cast(&DataType::String)?;
        let observed = text.drop_nulls();
        let top = string_mode(&observed);
        let freq = match &top {
            Some(top) => observed
                .str()?
                .into_iter()
                .filter(|v| *v == Some(top.as_str()))
                .count(),
            None => 0,
        };
        Ok(Self {
            name: series.name().to_string(),
            count: observed.len(),
            unique: observed.n_unique()?,
            top,
            freq,
        })
    }

    fn rows(&self) -> [(&'static str, String); 4] {
        [
            ("count", self.count.to_string()),
            ("unique", self.unique.to_string()),
            ("top", self.top.clone().unwrap_or_else(|| "NaN".to_string())),
            ("freq", self.freq.to_string()),
        ]
    }
}

/// Descriptive statistics for every numeric column, in frame order.
pub fn describe(df: &DataFrame) -> Result<Vec<ColumnStats>> {
    numeric_columns(df)
        .iter()
        .map(|name| -> Result<ColumnStats> {
            Ok(ColumnStats::from_series(require_column(df, name)?)?)
        })
        .collect()
}

/// Statistics for every text column, in frame order.
///
/// The summary falls back to these when a frame has no numeric columns.
pub fn describe_categorical(df: &DataFrame) -> Result<Vec<CategoricalStats>> {
    columns_of_category(df, DtypeCategory::Categorical)
        .iter()
        .map(|name| -> Result<CategoricalStats> {
            Ok(CategoricalStats::from_series(require_column(df, name)?)?)
        })
        .collect()
}

/// Null count of every column, in frame order.
pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect()
}

/// Print descriptive statistics and missing-value counts to stdout.
pub fn eda_summary(df: &DataFrame) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_eda_summary(df, &mut handle)
}

/// Write descriptive statistics and missing-value counts to `out`.
pub fn write_eda_summary<W: Write>(df: &DataFrame, out: &mut W) -> Result<()> {
    info!("Generating descriptive statistics...");
    let stats = describe(df)?;
    if stats.is_empty() {
        write_categorical_table(&describe_categorical(df)?, out)?;
    } else {
        write_stats_table(&stats, out)?;
    }

    info!("Checking for missing values...");
    writeln!(out, "\nMissing Values:")?;
    let counts = missing_counts(df);
    let name_width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, count) in counts {
        writeln!(out, "{name:<name_width$}    {count}")?;
    }
    Ok(())
}

fn write_stats_table<W: Write>(stats: &[ColumnStats], out: &mut W) -> io::Result<()> {
    let widths: Vec<usize> = stats.iter().map(|s| s.name.len().max(12)).collect();

    write!(out, "{:<6}", "")?;
    for (s, width) in stats.iter().zip(&widths) {
        write!(out, "  {:>width$}", s.name)?;
    }
    writeln!(out)?;

    for row in 0..8 {
        let label = stats[0].rows()[row].0;
        write!(out, "{label:<6}")?;
        for (s, width) in stats.iter().zip(&widths) {
            let cell = match s.rows()[row].1 {
                Some(v) => format!("{v:.6}"),
                None => "NaN".to_string(),
            };
            write!(out, "  {cell:>width$}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_categorical_table<W: Write>(stats: &[CategoricalStats], out: &mut W) -> io::Result<()> {
    if stats.is_empty() {
        return writeln!(out, "No columns to describe");
    }

    let cells: Vec<[(&'static str, String); 4]> = stats.iter().map(CategoricalStats::rows).collect();
    let widths: Vec<usize> = stats
        .iter()
        .zip(&cells)
        .map(|(s, rows)| {
            rows.iter()
                .map(|(_, cell)| cell.len())
                .fold(s.name.len(), usize::max)
        })
        .collect();

    write!(out, "{:<6}", "")?;
    for (s, width) in stats.iter().zip(&widths) {
        write!(out, "  {:>width$}", s.name)?;
    }
    writeln!(out)?;

    for row in 0..4 {
        write!(out, "{:<6}", cells[0][row].0)?;
        for (rows, width) in cells.iter().zip(&widths) {
            write!(out, "  {:>width$}", rows[row].1)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_numeric_columns() {
        let df = df![
            "Sales" => [Some(100.0), None, Some(90.0), Some(110.0), Some(80.0)],
            "Region" => ["a", "b", "c", "d", "e"],
        ]
        .unwrap();

        let stats = describe(&df).unwrap();
        assert_eq!(stats.len(), 1);

        let sales = &stats[0];
        assert_eq!(sales.name, "Sales");
        assert_eq!(sales.count, 4);
        assert_eq!(sales.mean, Some(95.0));
        assert_eq!(sales.min, Some(80.0));
        assert_eq!(sales.q25, Some(87.5));
        assert_eq!(sales.median, Some(95.0));
        assert_eq!(sales.q75, Some(102.5));
        assert_eq!(sales.max, Some(110.0));
        let expected_std = (500.0f64 / 3.0).sqrt();
        assert!((sales.std.unwrap() - expected_std).abs() < 1e-12);
    }

    #[test]
    fn test_describe_all_null_column() {
        let df = df!["x" => [None::<f64>, None]].unwrap();
        let stats = describe(&df).unwrap();
        assert_eq!(stats[0].count, 0);
        assert_eq!(stats[0].mean, None);
        assert_eq!(stats[0].max, None);
    }

    #[test]
    fn test_missing_counts() {
        let df = df![
            "Sales" => [Some(1.0), None, None],
            "Promo" => [Some(1i64), Some(0), None],
            "Store" => ["a", "b", "c"],
        ]
        .unwrap();

        assert_eq!(
            missing_counts(&df),
            vec![
                ("Sales".to_string(), 2),
                ("Promo".to_string(), 1),
                ("Store".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_write_eda_summary_layout() {
        let df = df![
            "Sales" => [Some(100.0), None, Some(90.0)],
            "Promo" => [1i64, 0, 1],
        ]
        .unwrap();

        let mut buf = Vec::new();
        write_eda_summary(&df, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("Sales") && lines[0].contains("Promo"));
        assert!(lines[1].starts_with("count"));
        assert!(lines[1].contains("2.000000"));
        assert!(lines[2].contains("95.000000"));
        assert!(out.contains("\nMissing Values:\n"));
        assert!(out.contains("Sales    1"));
        assert!(out.contains("Promo    0"));
    }

    #[test]
    fn test_describe_ignores_nan() {
        let df = df!["Sales" => [1.0, f64::NAN, 3.0]].unwrap();
        let stats = describe(&df).unwrap();
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].mean, Some(2.0));
        assert_eq!(stats[0].max, Some(3.0));
    }

    #[test]
    fn test_describe_categorical() {
        let df = df![
            "Store" => [Some("North"), Some("South"), None, Some("North")],
            "Sales" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();

        assert_eq!(
            describe_categorical(&df).unwrap(),
            vec![CategoricalStats {
                name: "Store".to_string(),
                count: 3,
                unique: 2,
                top: Some("North".to_string()),
                freq: 2,
            }]
        );
    }

    #[test]
    fn test_write_eda_summary_falls_back_to_text_columns() {
        let df = df![
            "Store" => [Some("b"), None, Some("a"), Some("b")],
            "StateHoliday" => ["0", "a", "0", "0"],
        ]
        .unwrap();
        let mut buf = Vec::new();
        write_eda_summary(&df, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("Store") && lines[0].contains("StateHoliday"));
        assert!(lines[1].starts_with("count"));
        assert!(lines[2].starts_with("unique"));
        assert!(lines[3].starts_with("top"));
        assert!(lines[3].trim_end().ends_with('0'));
        assert!(lines[4].starts_with("freq"));
        assert!(out.contains("Store           1"));
    }

    #[test]
    fn test_write_eda_summary_empty_frame() {
        let mut buf = Vec::new();
        write_eda_summary(&DataFrame::empty(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("No columns to describe"));
    }
}
