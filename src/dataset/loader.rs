//! CSV loader producing a typed [`Table`].

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{error, info};

use super::table::{Column, ColumnData, Table};
use crate::error::EstimateError;

const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Load a delimited file with a header row.
///
/// Fails with [`EstimateError::MissingInput`] before touching the parser when
/// the path does not exist.
pub fn load_table(path: &Path) -> Result<Table, EstimateError> {
    if !path.exists() {
        error!("File not found: {}", path.display());
        return Err(EstimateError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    info!("Loading data from {}", path.display());
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| EstimateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let table = read_table(reader).map_err(|source| EstimateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_columns(),
        path.display()
    );
    Ok(table)
}

/// Parse a table from any CSV source; used by [`load_table`] and tests.
pub fn read_table<R: Read>(mut reader: csv::Reader<R>) -> Result<Table, csv::Error> {
    let headers = normalize_headers(reader.headers()?.iter());
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    let mut rows = 0usize;
    for record in reader.records() {
        let record = record?;
        for (cells, cell) in raw.iter_mut().zip(record.iter()) {
            cells.push(cell.to_string());
        }
        rows += 1;
    }
    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();
    // The reader rejects ragged rows and `normalize_headers` never repeats a name.
    Ok(Table::from_parsed(columns, rows))
}

/// Blank headers become `Unnamed: <idx>`; repeats get `.1`, `.2`, ... until unused.
fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    raw.enumerate()
        .map(|(idx, name)| {
            let mut unique = if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name.to_string()
            };
            let mut count = counts.get(&unique).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(unique.clone(), count + 1);
                unique = format!("{unique}.{count}");
                count = counts.get(&unique).copied().unwrap_or(0);
            }
            counts.insert(unique.clone(), 1);
            unique
        })
        .collect()
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn infer_column(cells: Vec<String>) -> ColumnData {
    let has_missing = cells.iter().any(|cell| is_missing(cell));
    if !has_missing
        && !cells.is_empty()
        && let Some(values) = cells
            .iter()
            .map(|cell| parse_bool(cell))
            .collect::<Option<Vec<bool>>>()
    {
        return ColumnData::Boolean(values);
    }
    let numeric: Option<Vec<f64>> = cells
        .iter()
        .map(|cell| {
            if is_missing(cell) {
                Some(f64::NAN)
            } else {
                cell.trim().parse::<f64>().ok()
            }
        })
        .collect();
    match numeric {
        Some(values) => ColumnData::Numeric(values),
        None => ColumnData::Text(cells),
    }
}
