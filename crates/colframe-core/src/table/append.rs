//! Heterogeneous row appends.
//!
//! The incoming rows are coerced into columns using this table's column
//! names as a hint, then every existing column is extended: with the
//! incoming values when the name matches, with absence markers otherwise.
//! Columns present only in the incoming data are created and back-filled
//! with absence markers for all prior rows. The rectangular invariant
//! therefore survives appends between tables with disjoint column sets.

use snafu::ensure;

use crate::convert::TableSource;
use crate::error::{DimensionMismatchSnafu, Result};
use crate::table::Table;

impl Table {
    /// Append the rows of `source` to this table.
    pub fn append(&mut self, source: TableSource) -> Result<()> {
        let hint = self.column_names().to_vec();
        let pairs = source.into_columns(Some(&hint))?;
        let incoming_nrow = pairs.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (_, values) in &pairs {
            ensure!(
                values.len() == incoming_nrow,
                DimensionMismatchSnafu {
                    expected: incoming_nrow,
                    actual: values.len(),
                }
            );
        }
        if pairs.is_empty() {
            return Ok(());
        }
        self.store_mut().append_pairs(&pairs, incoming_nrow);
        self.sync();
        Ok(())
    }

    /// Append another table's rows.
    pub fn append_table(&mut self, other: &Table) -> Result<()> {
        self.append(TableSource::Table(other.clone()))
    }
}
