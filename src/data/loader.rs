// ============================================================
// Layer 4: CSV Loader
// ============================================================
// Reads the accident table from a CSV file with the `csv` crate.
//
// Schema (implicit, taken from the header row):
//   cause_code_individual → the class label (kept as text)
//   year                  → split key, dropped afterwards
//   every other column    → a numeric feature, in file order
//
// Any cell that does not parse aborts the load. A half-read
// table would silently shift the feature statistics.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{io::Read, path::PathBuf};

use crate::domain::error::DataError;
use crate::domain::record::{AccidentRecord, LoadedTable, LABEL_COLUMN, YEAR_COLUMN};
use crate::domain::traits::RecordSource;

/// Loads the accident table from a CSV file on disk.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<LoadedTable> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Cannot open '{}'", self.path.display()))?;

        let table = read_table(file)
            .with_context(|| format!("Cannot parse '{}'", self.path.display()))?;

        tracing::info!(
            "Loaded {} rows with {} feature columns from '{}'",
            table.records.len(),
            table.feature_count(),
            self.path.display(),
        );
        Ok(table)
    }
}

/// Parse a CSV stream into a LoadedTable.
///
/// Split out from CsvLoader so the parsing rules can be exercised
/// against in-memory strings.
pub fn read_table<R: Read>(input: R) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();

    let label_idx = column_index(&headers, LABEL_COLUMN)?;
    let year_idx  = column_index(&headers, YEAR_COLUMN)?;

    // (column position, column name) for every feature column
    let feature_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_idx && *i != year_idx)
        .map(|(i, name)| (i, name.to_string()))
        .collect();

    let mut records = Vec::new();

    for (row_idx, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Malformed CSV row {}", row_idx + 1))?;

        let features = feature_columns
            .iter()
            .map(|(col, name)| parse_feature(row.get(*col).unwrap_or(""), row_idx + 1, name))
            .collect::<Result<Vec<f32>, DataError>>()?;

        let label = row.get(label_idx).unwrap_or("").to_string();
        let year  = parse_year(row.get(year_idx).unwrap_or(""), row_idx + 1)?;

        records.push(AccidentRecord::new(features, label, year));
    }

    tracing::debug!("Parsed {} records", records.len());

    Ok(LoadedTable {
        feature_names: feature_columns.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, DataError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DataError::missing_column(column))
}

fn parse_feature(value: &str, row: usize, column: &str) -> Result<f32, DataError> {
    value.parse::<f32>().map_err(|_| DataError::InvalidValue {
        row,
        column: column.to_string(),
        value:  value.to_string(),
    })
}

/// Years may be written as integers or as floats such as "2020.0"
/// (pandas writes integer columns with missing values that way).
fn parse_year(value: &str, row: usize) -> Result<i32, DataError> {
    if let Ok(year) = value.parse::<i32>() {
        return Ok(year);
    }
    match value.parse::<f64>() {
        Ok(y) if y.fract() == 0.0 => Ok(y as i32),
        _ => Err(DataError::InvalidValue {
            row,
            column: YEAR_COLUMN.to_string(),
            value:  value.to_string(),
        }),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
speed,year,light,cause_code_individual,weather
50,2019,1,A12,0.5
30,2020,0,B07,1.5
70,2018.0,1,A12,2.0
";

    #[test]
    fn test_label_and_year_are_not_features() {
        let table = read_table(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.feature_names, vec!["speed", "light", "weather"]);
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[0].features, vec![50.0, 1.0, 0.5]);
        assert_eq!(table.records[1].label, "B07");
        assert_eq!(table.records[1].year, 2020);
    }

    #[test]
    fn test_float_year_is_accepted() {
        let table = read_table(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.records[2].year, 2018);
    }

    #[test]
    fn test_missing_label_column_is_an_error() {
        let err = read_table("speed,year\n1,2019\n".as_bytes()).unwrap_err();
        let data_err = err.downcast_ref::<DataError>().unwrap();
        assert!(matches!(data_err, DataError::MissingColumn { column } if column == LABEL_COLUMN));
    }

    #[test]
    fn test_non_numeric_feature_is_an_error() {
        let csv = "speed,year,cause_code_individual\nfast,2019,A\n";
        let err = read_table(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("speed"));
    }

    #[test]
    fn test_loader_reads_from_disk() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("step1.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();

        let table = CsvLoader::new(&path).load_all().unwrap();
        assert_eq!(table.feature_count(), 3);
        assert_eq!(table.records.len(), 3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(CsvLoader::new("does/not/exist.csv").load_all().is_err());
    }
}
