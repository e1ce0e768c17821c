//! Calendar feature derivation.

use crate::config::DEFAULT_DATE_COLUMN;
use crate::error::{Result, SalesPrepError};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a single date value in any of the accepted layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Derive `Year`, `Month` and `Day` from the `Date` column, if there is one.
pub fn feature_engineering(df: DataFrame) -> Result<DataFrame> {
    derive_date_features(df, DEFAULT_DATE_COLUMN)
}

/// Derive `Year`, `Month` and `Day` from `date_column`.
///
/// Existing columns with those names are overwritten. Null dates give null
/// features; any other unparseable value is an error. Without the column
/// the frame is returned as-is.
pub fn derive_date_features(mut df: DataFrame, date_column: &str) -> Result<DataFrame> {
    if df.column(date_column).is_ok() {
        let dates = parse_date_column(&df, date_column)?;

        let year: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.year())).collect();
        let month: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.month() as i32)).collect();
        let day: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.day() as i32)).collect();

        df.with_column(Series::new("Year".into(), year))?;
        df.with_column(Series::new("Month".into(), month))?;
        df.with_column(Series::new("Day".into(), day))?;
        debug!("Derived Year/Month/Day from '{}'", date_column);
    }

    info!("Feature engineering complete");
    Ok(df)
}

fn parse_date_column(df: &DataFrame, date_column: &str) -> Result<Vec<Option<NaiveDate>>> {
    let series = df.column(date_column)?.as_materialized_series();
    let as_text = series.cast(&DataType::String)?;

    as_text
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(text) => parse_date(text)
                .map(Some)
                .ok_or_else(|| SalesPrepError::DateParse {
                    column: date_column.to_string(),
                    row,
                    value: text.to_string(),
                }),
        })
        .collect()
}
