//! In-memory tabular data: named, typed, equal-length columns.

use std::collections::HashSet;

use ndarray::Array2;

use crate::error::EstimateError;

/// Values held by a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Floating point values; missing cells are NaN.
    Numeric(Vec<f64>),
    /// `True`/`False` indicator values.
    Boolean(Vec<bool>),
    /// Anything that did not parse as a number or boolean.
    Text(Vec<String>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Boolean(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn boolean(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self::new(name, ColumnData::Boolean(values))
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, ColumnData::Text(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of one cell. Booleans map to 1.0/0.0, text to `None`.
    pub fn value_f64(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Numeric(values) => values.get(row).copied(),
            ColumnData::Boolean(values) => values.get(row).map(|&v| if v { 1.0 } else { 0.0 }),
            ColumnData::Text(_) => None,
        }
    }

    /// Convert the whole column to numbers, rejecting text and missing cells.
    pub fn to_f64(&self) -> Result<Vec<f64>, EstimateError> {
        match &self.data {
            ColumnData::Text(_) => Err(EstimateError::NonNumeric {
                column: self.name.clone(),
            }),
            ColumnData::Boolean(values) => Ok(values
                .iter()
                .map(|&v| if v { 1.0 } else { 0.0 })
                .collect()),
            ColumnData::Numeric(values) => {
                if let Some(row) = values.iter().position(|v| v.is_nan()) {
                    return Err(EstimateError::MissingValue {
                        column: self.name.clone(),
                        row,
                    });
                }
                Ok(values.clone())
            }
        }
    }

    /// Grouping key for a cell, used when stratifying rows by category.
    pub fn stratum_key(&self, row: usize) -> String {
        match &self.data {
            // `-0.0` and `0.0` share a stratum.
            ColumnData::Numeric(values) => values.get(row).map(|&v| (v + 0.0).to_string()),
            ColumnData::Boolean(values) => values.get(row).map(|v| v.to_string()),
            ColumnData::Text(values) => values.get(row).cloned(),
        }
        .unwrap_or_default()
    }

    /// Copy the given rows, in the given order, into a new column.
    pub fn select(&self, rows: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(rows.iter().map(|&row| values[row]).collect())
            }
            ColumnData::Boolean(values) => {
                ColumnData::Boolean(rows.iter().map(|&row| values[row]).collect())
            }
            ColumnData::Text(values) => {
                ColumnData::Text(rows.iter().map(|&row| values[row].clone()).collect())
            }
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, EstimateError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(EstimateError::Validation(format!(
                    "Duplicate column '{}'",
                    column.name()
                )));
            }
            if column.len() != rows {
                return Err(EstimateError::Validation(format!(
                    "Column '{}' has {} rows, expected {rows}",
                    column.name(),
                    column.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub(crate) fn from_parsed(columns: Vec<Column>, rows: usize) -> Self {
        Self { columns, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing with a schema error when it is absent.
    pub fn require(&self, name: &str) -> Result<&Column, EstimateError> {
        self.column(name).ok_or_else(|| EstimateError::SchemaLookup {
            column: name.to_string(),
        })
    }

    /// Copy of the table without `name`.
    pub fn drop_column(&self, name: &str) -> Result<Table, EstimateError> {
        self.require(name)?;
        Ok(Table {
            columns: self
                .columns
                .iter()
                .filter(|c| c.name != name)
                .cloned()
                .collect(),
            rows: self.rows,
        })
    }

    /// Copy the given rows, in the given order, into a new table.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.select(rows)).collect(),
            rows: rows.len(),
        }
    }

    /// Row-major `rows x columns` matrix of all cells.
    pub fn to_matrix(&self) -> Result<Array2<f64>, EstimateError> {
        let mut matrix = Array2::zeros((self.rows, self.columns.len()));
        for (col_idx, column) in self.columns.iter().enumerate() {
            let values = column.to_f64()?;
            for (row, value) in values.into_iter().enumerate() {
                matrix[[row, col_idx]] = value;
            }
        }
        Ok(matrix)
    }
}
