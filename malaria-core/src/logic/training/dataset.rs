//! Spreadsheet dataset loading and preprocessing
//!
//! Reads the monthly case spreadsheet either directly from a workbook
//! (`.xlsx`, `.xlsm`, `.xls`, `.ods`) or from a CSV export. Title rows above
//! the header are skipped; the header is the first row that names the
//! target column.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use ndarray::{Array1, Array2};

/// Spreadsheet column holding the mean temperature
pub const COL_TEMPERATURE: &str = "avg temp";
/// Spreadsheet column holding relative humidity
pub const COL_HUMIDITY: &str = "humidity (%)";
/// Spreadsheet column holding the rainy day count
pub const COL_RAINY_DAYS: &str = "rainy days";
/// Spreadsheet column holding the monthly case count (target)
pub const COL_CASES: &str = "sick of malaria";

/// File extensions read through the workbook reader
const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Training dataset in canonical feature order
#[derive(Clone, Debug)]
pub struct Dataset {
    /// Shape: [n, 4]: temperature, humidity, rainy_days, previous_cases
    pub features: Array2<f64>,
    /// Cases divided by `max_cases`, in [0, 1]
    pub targets: Array1<f64>,
    /// Largest monthly case count, 1.0 when no positive count exists
    pub max_cases: f64,
}

impl Dataset {
    /// Load a workbook or CSV, picked by file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_workbook = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);

        if is_workbook {
            Self::from_workbook(path)
        } else {
            Self::from_csv(path)
        }
    }

    /// Load the first sheet of a workbook
    pub fn from_workbook<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook {}", path.display()))?;
        let range = workbook
            .worksheet_range_at(0)
            .with_context(|| format!("Workbook {} has no sheets", path.display()))?
            .with_context(|| format!("Failed to read first sheet of {}", path.display()))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Self::from_rows(rows)
    }

    /// Load dataset from CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv_reader()
            .from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_rows(read_records(reader)?)
    }

    pub fn from_csv_str(content: &str) -> Result<Self> {
        let reader = csv_reader().from_reader(content.as_bytes());
        Self::from_rows(read_records(reader)?)
    }

    /// Build from raw sheet rows, title rows included
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        let header_idx = rows
            .iter()
            .position(|row| row.iter().any(|c| normalize(c) == COL_CASES))
            .with_context(|| format!("Spreadsheet must contain '{}' column", COL_CASES))?;
        let header: Vec<String> = rows[header_idx].iter().map(|c| normalize(c)).collect();

        let column = |name: &str| header.iter().position(|h| h == name);
        let target_col = column(COL_CASES).context("target column vanished")?;
        let climate_cols = [
            column(COL_TEMPERATURE),
            column(COL_HUMIDITY),
            column(COL_RAINY_DAYS),
        ];
        for (col, name) in climate_cols.iter().zip([COL_TEMPERATURE, COL_HUMIDITY, COL_RAINY_DAYS]) {
            if col.is_none() {
                log::warn!("Column '{}' missing, filling with 0", name);
            }
        }

        let mut climate: [Vec<Option<f64>>; 3] = Default::default();
        let mut cases = Vec::new();

        for row in rows.iter().skip(header_idx + 1) {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            for (values, col) in climate.iter_mut().zip(climate_cols.iter()) {
                values.push(col.and_then(|c| cell(row, c)));
            }
            cases.push(cell(row, target_col).unwrap_or(0.0));
        }

        if cases.is_empty() {
            anyhow::bail!("Dataset is empty");
        }

        let n = cases.len();
        let filled: Vec<Vec<f64>> = climate.iter().map(|c| fill_with_median(c)).collect();

        let observed_max = cases.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let max_cases = if observed_max > 0.0 { observed_max } else { 1.0 };

        let mut features = Array2::<f64>::zeros((n, 4));
        for i in 0..n {
            features[[i, 0]] = filled[0][i];
            features[[i, 1]] = filled[1][i];
            features[[i, 2]] = filled[2][i];
            // lag-1 of the raw target; the first month has no history
            features[[i, 3]] = if i == 0 { 0.0 } else { cases[i - 1] };
        }
        let targets = Array1::from_iter(cases.iter().map(|c| c / max_cases));

        Ok(Self {
            features,
            targets,
            max_cases,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Lowercase with whitespace runs (including line breaks) collapsed
fn normalize(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn cell(row: &[String], idx: usize) -> Option<f64> {
    row.get(idx)
        .and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Replace missing values with the column median (0 if nothing is present)
fn fill_with_median(values: &[Option<f64>]) -> Vec<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    present.sort_by(|a, b| a.total_cmp(b));

    let median = match present.len() {
        0 => 0.0,
        n if n % 2 == 1 => present[n / 2],
        n => (present[n / 2 - 1] + present[n / 2]) / 2.0,
    };

    values.iter().map(|v| v.unwrap_or(median)).collect()
}

/// Headerless, ragged-row reader: header detection happens on our side
fn csv_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Malformed CSV record")?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}
