// Patient dataset - CSV loading and column access
// The table is loaded once and is read-only afterwards

use crate::error::{DatasetError, DatasetResult};
use chrono::{DateTime, NaiveDate, Utc};
use csv::StringRecord;
use std::io::Read;
use std::path::{Path, PathBuf};

// ============================================================================
// COLUMN NAMES
// ============================================================================

pub const AGE: &str = "Age";
pub const GENDER: &str = "Gender";
pub const MEDICAL_CONDITION: &str = "Medical Condition";
pub const ADMISSION_TYPE: &str = "Admission Type";
pub const INSURANCE_PROVIDER: &str = "Insurance Provider";
pub const BILLING_AMOUNT: &str = "Billing Amount";
pub const DATE_OF_ADMISSION: &str = "Date of Admission";
pub const DISCHARGE_DATE: &str = "Discharge Date";

/// Columns every view references by name. Loading fails without them.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    AGE,
    GENDER,
    MEDICAL_CONDITION,
    ADMISSION_TYPE,
    INSURANCE_PROVIDER,
    BILLING_AMOUNT,
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cell texts read as missing values, the same set pandas' `read_csv` uses
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Empty cells and NA markers; any spelling of `nan` counts
fn is_missing(cell: &str) -> bool {
    let unsigned = cell.strip_prefix('-').unwrap_or(cell);
    cell.is_empty() || unsigned.eq_ignore_ascii_case("nan") || MISSING_MARKERS.contains(&cell)
}

// ============================================================================
// DATASET
// ============================================================================

/// In-memory table of patient records.
///
/// Cells are kept as the text found in the file; typed views are produced
/// on demand by `numeric_column` and `date_column`.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    headers: Vec<String>,
    records: Vec<StringRecord>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Load a CSV file with a header row
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, path)
    }

    /// Load from any reader. `source` is only recorded for display.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> DatasetResult<Self> {
        let mut rdr = csv::Reader::from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(DatasetError::Empty);
        }

        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                return Err(DatasetError::MissingColumn(required.to_string()));
            }
        }

        let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Parsed {} records with {} columns from {}",
            records.len(),
            headers.len(),
            source.display()
        );

        Ok(Self {
            source: source.to_path_buf(),
            headers,
            records,
            loaded_at: Utc::now(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.headers.len())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// First `n` records as owned rows (fewer if the table is shorter)
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        self.records
            .iter()
            .take(n)
            .map(|record| record.iter().map(str::to_string).collect())
            .collect()
    }

    /// Text cells of a column, one per record
    pub fn column(&self, name: &str) -> DatasetResult<Vec<&str>> {
        let index = self.require_index(name)?;
        Ok(self
            .records
            .iter()
            .map(|record| record.get(index).unwrap_or(""))
            .collect())
    }

    /// Numeric cells of a column. Empty and NA cells count as missing and are skipped.
    pub fn numeric_column(&self, name: &str) -> DatasetResult<Vec<f64>> {
        Ok(self
            .numeric_cells(name)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Numeric cells aligned with the records, `None` for missing cells.
    ///
    /// Infinite values are rejected along with non-numeric text.
    pub fn numeric_cells(&self, name: &str) -> DatasetResult<Vec<Option<f64>>> {
        let cells = self.column(name)?;
        let mut values = Vec::with_capacity(cells.len());

        for (row, cell) in cells.into_iter().enumerate() {
            let trimmed = cell.trim();
            if is_missing(trimmed) {
                values.push(None);
                continue;
            }

            let value = trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DatasetError::InvalidNumber {
                    column: name.to_string(),
                    row,
                    value: cell.to_string(),
                })?;
            values.push(Some(value));
        }

        Ok(values)
    }

    /// ISO dates aligned with the records; unparseable cells become `None`
    pub fn date_column(&self, name: &str) -> DatasetResult<Vec<Option<NaiveDate>>> {
        Ok(self
            .column(name)?
            .into_iter()
            .map(|cell| NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT).ok())
            .collect())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_index(&self, name: &str) -> DatasetResult<usize> {
        self.column_index(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }
}
