//! CSV loading.
//!
//! [`load_data`] is the pipeline entry point and tolerates a missing file;
//! [`read_csv`] is the strict reader used by the EDA path.

use crate::error::{Result, ResultExt};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Cell contents read as missing values.
pub const NULL_MARKERS: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// Number of rows sampled for schema inference on the first attempt.
const INFER_SCHEMA_ROWS: usize = 100;

fn read_with_inference(path: &Path, infer_rows: Option<usize>) -> PolarsResult<DataFrame> {
    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());

    CsvReadOptions::default()
        .with_infer_schema_length(infer_rows)
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b',')
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
}

/// Read a comma-separated file with a header row.
///
/// The schema is inferred from the first rows. When a later value does not
/// fit that schema (a column of integers that turns to text further down)
/// the file is read again with inference over every row. Fails if the file
/// is missing or cannot be parsed either way.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();

    let df = match read_with_inference(path, Some(INFER_SCHEMA_ROWS)) {
        Ok(df) => df,
        Err(err @ PolarsError::IO { .. }) => return Err(err.into()),
        Err(err) => {
            debug!("Sampled schema did not fit {}: {}", path.display(), err);
            read_with_inference(path, None)
                .context(format!("Reading {} with full schema inference", path.display()))?
        }
    };

    debug!("Read {:?} from {}", df.shape(), path.display());
    Ok(df)
}

/// Load the dataset from a CSV file.
///
/// A missing file is not an error: an empty frame (zero rows, zero columns)
/// is returned and the miss is logged. Every other failure propagates.
pub fn load_data(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        error!("File not found at {}", path.display());
        return Ok(DataFrame::empty());
    }

    let df = read_csv(path)?;
    info!("Data loaded successfully from {}", path.display());
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "sales_prep_loader_{}_{}.csv",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file_returns_empty_frame() {
        let df = load_data("/definitely/not/here/sales.csv").unwrap();
        assert_eq!(df.shape(), (0, 0));
    }

    #[test]
    fn test_read_csv_missing_file_is_error() {
        assert!(read_csv("/definitely/not/here/sales.csv").is_err());
    }

    #[test]
    fn test_load_preserves_column_order() {
        let path = write_temp_csv("order", "Store,Date,Sales,Promo\na,2023-01-01,1,0\n");
        let df = load_data(&path).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Store", "Date", "Sales", "Promo"]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_late_text_value_widens_column() {
        let mut contents = String::from("Store,Sales,StateHoliday\n");
        for i in 0..149 {
            contents.push_str(&format!("{},{},0\n", i % 3, 5000 + i));
        }
        contents.push_str("1,5200,a\n");
        let path = write_temp_csv("late_text", &contents);

        let df = load_data(&path).unwrap();
        assert_eq!(df.height(), 150);

        let holiday = df.column("StateHoliday").unwrap();
        assert_eq!(holiday.dtype(), &DataType::String);
        let holiday = holiday.as_materialized_series().str().unwrap();
        assert_eq!(holiday.get(0), Some("0"));
        assert_eq!(holiday.get(149), Some("a"));
        assert!(crate::utils::is_numeric_dtype(df.column("Sales").unwrap().dtype()));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_reads_missing_markers_as_null() {
        let path = write_temp_csv("nulls", "Sales,Region\n100,NA\n,west\nN/A,east\n");
        let df = load_data(&path).unwrap();
        assert_eq!(df.column("Sales").unwrap().null_count(), 2);
        assert_eq!(df.column("Region").unwrap().null_count(), 1);
        assert!(crate::utils::is_numeric_dtype(df.column("Sales").unwrap().dtype()));
        fs::remove_file(path).ok();
    }
}
