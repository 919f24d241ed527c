//! Input adapters: the shapes a table can be built from.
//!
//! Each [`TableSource`] variant is one adapter; [`TableSource::into_columns`]
//! is the converter that reduces every shape to the canonical ordered
//! `(name, values)` pairs consumed by table construction and appends. A
//! shape no adapter can interpret (a flat sequence of scalars) fails with
//! a conversion error.

use snafu::ensure;

use crate::error::{ConversionSnafu, DimensionMismatchSnafu, InvalidArgumentSnafu, Result};
use crate::table::Table;
use crate::value::Value;

/// A convertible table-construction input.
#[derive(Debug, Clone)]
pub enum TableSource {
    /// The canonical form: a mapping of name to value sequence.
    Columns(Vec<(String, Vec<Value>)>),
    /// A sequence of rows, each a mapping of name to value.
    MappingRows(Vec<Vec<(String, Value)>>),
    /// A sequence of rows-as-sequences plus the column names.
    SequenceRows {
        /// Column names, one per row slot.
        names: Vec<String>,
        /// Rows; every row must hold exactly `names.len()` values.
        rows: Vec<Vec<Value>>,
    },
    /// Another table (copied).
    Table(Table),
    /// A single row snapshot, as produced by a row cursor.
    Row(Vec<(String, Value)>),
    /// A flat sequence of scalars; no adapter can interpret this.
    Flat(Vec<Value>),
}

impl TableSource {
    /// Reduce this source to ordered `(name, values)` pairs.
    ///
    /// `hint` orders names known to the consumer first (used by appends so
    /// incoming rows line up with existing columns); names not covered by
    /// the hint follow in encounter order.
    pub fn into_columns(self, hint: Option<&[String]>) -> Result<Vec<(String, Vec<Value>)>> {
        match self {
            TableSource::Columns(pairs) => {
                let mut seen = std::collections::HashSet::new();
                for (name, _) in &pairs {
                    ensure!(
                        seen.insert(name.clone()),
                        InvalidArgumentSnafu {
                            message: format!("duplicate column name `{name}`"),
                        }
                    );
                }
                Ok(pairs)
            }
            TableSource::MappingRows(rows) => mapping_rows_to_columns(&rows, hint),
            TableSource::SequenceRows { names, rows } => {
                ensure!(
                    !names.is_empty() || rows.is_empty(),
                    InvalidArgumentSnafu {
                        message: "rows-as-sequences input requires column names".to_string(),
                    }
                );
                for row in &rows {
                    ensure!(
                        row.len() == names.len(),
                        DimensionMismatchSnafu {
                            expected: names.len(),
                            actual: row.len(),
                        }
                    );
                }
                let mut columns: Vec<(String, Vec<Value>)> = names
                    .into_iter()
                    .map(|n| (n, Vec::with_capacity(rows.len())))
                    .collect();
                for row in rows {
                    for (slot, value) in columns.iter_mut().zip(row) {
                        slot.1.push(value);
                    }
                }
                Ok(columns)
            }
            TableSource::Table(table) => Ok(table
                .store()
                .iter()
                .map(|(name, column)| (name.to_string(), column.values().to_vec()))
                .collect()),
            TableSource::Row(pairs) => Ok(pairs
                .into_iter()
                .map(|(name, value)| (name, vec![value]))
                .collect()),
            TableSource::Flat(values) => ConversionSnafu {
                message: format!(
                    "a flat sequence of {} scalars has no column structure",
                    values.len()
                ),
            }
            .fail(),
        }
    }
}

/// Collect the union of row-mapping names (hint names first, then
/// encounter order) and transpose the rows, filling gaps with `Nil`.
fn mapping_rows_to_columns(
    rows: &[Vec<(String, Value)>],
    hint: Option<&[String]>,
) -> Result<Vec<(String, Vec<Value>)>> {
    let mut names: Vec<String> = Vec::new();
    if let Some(hint) = hint {
        for name in hint {
            if rows.iter().any(|row| row.iter().any(|(n, _)| n == name)) {
                names.push(name.clone());
            }
        }
    }
    for row in rows {
        for (name, _) in row {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    ensure!(
        !names.is_empty() || rows.is_empty(),
        ConversionSnafu {
            message: "rows carry no column names".to_string(),
        }
    );
    Ok(names
        .into_iter()
        .map(|name| {
            let values = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .find(|(n, _)| *n == name)
                        .map(|(_, v)| v.clone())
                        .unwrap_or(Value::Nil)
                })
                .collect();
            (name, values)
        })
        .collect())
}
