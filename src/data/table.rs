use std::path::Path;

use polars::prelude::{Column, DataType, LazyCsvReader, LazyFileListReader, PlPath};

use crate::{
    data::row::{ACTION_COLUMNS, ActionRow},
    error::{DataError, GymError, GymResult, IoError, SystemError},
};

/// A dense, row-major matrix of `f64` values, one row per tick.
///
/// Tables are immutable once loaded. Column meaning is positional; typed access to the
/// action table goes through [`ActionRow`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickTable {
    values: Vec<f64>,
    num_rows: usize,
    num_columns: usize,
}

impl TickTable {
    /// Builds a table from a list of rows. Every row must have the same width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> GymResult<Self> {
        let num_columns = rows.first().map_or(0, Vec::len);
        let num_rows = rows.len();

        let mut values = Vec::with_capacity(num_rows * num_columns);
        for (row, fields) in rows.into_iter().enumerate() {
            if fields.len() != num_columns {
                return Err(DataError::RaggedTable {
                    row,
                    expected: num_columns,
                    found: fields.len(),
                }
                .into());
            }
            values.extend(fields);
        }

        Ok(Self {
            values,
            num_rows,
            num_columns,
        })
    }

    /// Reads a comma separated file of numeric columns.
    ///
    /// Every column is cast to `Float64`, so integer calendar columns (day of week, hour)
    /// are accepted as-is. Empty cells are rejected.
    pub fn from_csv(path: impl AsRef<Path>, has_header: bool) -> GymResult<Self> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(IoError::from)?;
        let path_str = path.to_str().ok_or_else(|| {
            IoError::ReadFailed(format!("path is not valid UTF-8: {}", path.display()))
        })?;

        let df = LazyCsvReader::new(PlPath::new(path_str))
            .with_has_header(has_header)
            .finish()
            .map_err(|e| convert_err(path, e))?
            .collect()
            .map_err(|e| convert_err(path, e))?;

        let num_rows = df.height();
        let columns = df
            .get_columns()
            .iter()
            .map(|column| column_values(path, column))
            .collect::<GymResult<Vec<_>>>()?;
        let num_columns = columns.len();

        let mut values = Vec::with_capacity(num_rows * num_columns);
        for row in 0..num_rows {
            values.extend(columns.iter().map(|column| column[row]));
        }

        tracing::debug!(
            path = %path.display(),
            rows = num_rows,
            columns = num_columns,
            "Loaded tick table"
        );

        Ok(Self {
            values,
            num_rows,
            num_columns,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Returns the row at `index`.
    pub fn row(&self, index: usize) -> GymResult<&[f64]> {
        if index >= self.num_rows {
            return Err(SystemError::IndexOutOfBounds(format!(
                "row {index} requested from a table with {} rows",
                self.num_rows
            ))
            .into());
        }
        let start = index * self.num_columns;
        Ok(&self.values[start..start + self.num_columns])
    }
}

/// One traded symbol's pair of aligned tables.
///
/// - `action`: raw prices used for execution economics (decoded through [`ActionRow`]).
/// - `observation`: pre-processed features handed to the agent verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolData {
    action: TickTable,
    observation: TickTable,
}

impl SymbolData {
    /// Pairs both tables. Misaligned row counts are a fatal configuration error.
    pub fn new(action: TickTable, observation: TickTable) -> GymResult<Self> {
        if action.num_rows() != observation.num_rows() {
            return Err(DataError::RowCountMismatch {
                action: action.num_rows(),
                observation: observation.num_rows(),
            }
            .into());
        }
        if action.num_columns() < ACTION_COLUMNS {
            return Err(DataError::InsufficientColumns {
                required: ACTION_COLUMNS,
                found: action.num_columns(),
                msg: "action table needs High, Low, Close, NextOpen, Volume and calendar fields"
                    .to_string(),
            }
            .into());
        }
        Ok(Self {
            action,
            observation,
        })
    }

    /// Loads both tables from headerless CSV files.
    pub fn from_csv(action: impl AsRef<Path>, observation: impl AsRef<Path>) -> GymResult<Self> {
        Self::new(
            TickTable::from_csv(action, false)?,
            TickTable::from_csv(observation, false)?,
        )
    }

    pub fn action(&self) -> &TickTable {
        &self.action
    }

    pub fn observation(&self) -> &TickTable {
        &self.observation
    }

    pub fn num_rows(&self) -> usize {
        self.action.num_rows()
    }

    pub fn action_row(&self, index: usize) -> GymResult<ActionRow<'_>> {
        ActionRow::decode(self.action.row(index)?)
    }
}

// ================================================================================================
// Helper Functions
// ================================================================================================

fn column_values(path: &Path, column: &Column) -> GymResult<Vec<f64>> {
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| convert_err(path, e))?;
    let chunked = casted.f64().map_err(|e| convert_err(path, e))?;
    chunked
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                DataError::MissingValue {
                    column: column.name().to_string(),
                    row,
                }
                .into()
            })
        })
        .collect()
}

fn convert_err(path: &Path, e: polars::error::PolarsError) -> GymError {
    GymError::Data(DataError::DataFrame(format!(
        "Error while reading {}: {e}",
        path.display()
    )))
}
