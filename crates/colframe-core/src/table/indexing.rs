//! Two-dimensional indexing and assignment dispatch.
//!
//! A selector list is an unordered mix of column names and row selectors.
//! Dispatch partitions the list and applies the first matching rule, in
//! priority order:
//!
//! 1. one single-integer row selector, no names: row access
//! 2. no row selectors, one name: column access
//! 3. one name, any row selectors: point or sub-column access
//! 4. no names, row selectors: row-subset table
//! 5. two or more names, no row selectors: column-subset table
//! 6. otherwise: the cross of selected rows and columns (hyper-set)
//!
//! Assignment follows the same partition. A sequence value across multiple
//! rows *and* multiple columns is deliberately an error
//! ([`crate::TableError::AmbiguousAssignment`]): row-major versus
//! column-major semantics are unresolved, and the ambiguity is preserved
//! rather than silently interpreted.

use snafu::ensure;

use crate::column::{ColumnSlice, Operand};
use crate::error::{AmbiguousAssignmentSnafu, KeyNotFoundSnafu, Result};
use crate::index::{self, RangeSelector, RowSelector};
use crate::table::Table;
use crate::value::Value;

/// One element of a mixed two-dimensional selector list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// A column name.
    Name(String),
    /// A row selector.
    Row(RowSelector),
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Selector::Name(name)
    }
}

impl From<i64> for Selector {
    fn from(i: i64) -> Self {
        Selector::Row(RowSelector::Index(i))
    }
}

impl From<RangeSelector> for Selector {
    fn from(r: RangeSelector) -> Self {
        Selector::Row(RowSelector::Range(r))
    }
}

impl From<RowSelector> for Selector {
    fn from(r: RowSelector) -> Self {
        Selector::Row(r)
    }
}

/// Result of a two-dimensional fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// A single cell.
    Scalar(Value),
    /// A whole column or sub-column, in selection order.
    Values(Vec<Value>),
    /// A whole row, in column order.
    Row(Vec<Value>),
    /// A row-subset, column-subset, or hyper-set table.
    Table(Table),
}

fn partition(selectors: &[Selector]) -> (Vec<String>, Vec<RowSelector>) {
    let mut names = Vec::new();
    let mut rows = Vec::new();
    for s in selectors {
        match s {
            Selector::Name(n) => names.push(n.clone()),
            Selector::Row(r) => rows.push(r.clone()),
        }
    }
    (names, rows)
}

impl Table {
    /// Two-dimensional fetch. See the module docs for the dispatch rules.
    pub fn get(&self, selectors: &[Selector]) -> Result<Fetched> {
        let (names, rows) = partition(selectors);
        for name in &names {
            ensure!(self.store().contains(name), KeyNotFoundSnafu { name });
        }
        match (names.len(), rows.as_slice()) {
            // (a) whole-row access
            (0, [RowSelector::Index(i)]) => Ok(Fetched::Row(self.row_values(*i)?)),
            // (b) whole-column access
            (1, []) => Ok(Fetched::Values(self.column(&names[0])?.values().to_vec())),
            // (c) point or sub-column access
            (1, _) => match self.column(&names[0])?.get(&rows)? {
                ColumnSlice::One(v) => Ok(Fetched::Scalar(v)),
                ColumnSlice::Many(vs) => Ok(Fetched::Values(vs)),
            },
            // (d) row-subset table
            (0, _) => {
                let positions = index::resolve_indices(&rows, self.nrow())?;
                Ok(Fetched::Table(self.subset_rows(&positions)))
            }
            // (e) column-subset table
            (_, []) => {
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                Ok(Fetched::Table(self.slice_columns(&refs)?))
            }
            // (f) hyper-set
            _ => {
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                let positions = index::resolve_indices(&rows, self.nrow())?;
                Ok(Fetched::Table(self.slice_columns(&refs)?.subset_rows(&positions)))
            }
        }
    }

    /// Two-dimensional assignment, following the same dispatch as
    /// [`Table::get`].
    ///
    /// Additional rules:
    ///
    /// - assigning a whole row accepts a scalar or a sequence of `ncol`
    ///   values;
    /// - assigning one or more whole columns accepts a scalar (broadcast)
    ///   or a sequence of `nrow` values;
    /// - assigning to an unknown single name with no row selectors creates
    ///   the column and resynchronizes the row cursor;
    /// - a sequence across multiple rows and multiple columns is an
    ///   [`crate::TableError::AmbiguousAssignment`].
    pub fn set(&mut self, selectors: &[Selector], value: Operand) -> Result<()> {
        let (names, rows) = partition(selectors);
        for name in &names {
            // Creating a brand-new column is permitted only for the
            // single-name, whole-column form.
            if !(rows.is_empty() && names.len() == 1) {
                ensure!(self.store().contains(name), KeyNotFoundSnafu { name });
            }
        }
        match (names.len(), rows.as_slice()) {
            // (a) whole-row assignment
            (0, [RowSelector::Index(i)]) => {
                self.seek_row(*i)?;
                self.row_mut().set_values(&value)
            }
            // (b) whole-column assignment, possibly creating the column
            (1, []) => {
                let values = match value {
                    Operand::Scalar(v) => {
                        let n = if self.ncol() == 0 { 1 } else { self.nrow() };
                        vec![v; n]
                    }
                    Operand::Values(vs) => vs,
                };
                self.set_column(&names[0], values)
            }
            // (c) point or sub-column assignment
            (1, _) => {
                self.store_mut().column_mut(&names[0])?.set(&rows, &value)?;
                self.sync();
                Ok(())
            }
            // (d) row-subset assignment
            (0, _) => {
                let positions = index::resolve_indices(&rows, self.nrow())?;
                let all_names = self.column_names().to_vec();
                self.assign_block(&all_names, &positions, value)
            }
            // (e) multi-column assignment
            (_, []) => {
                let positions: Vec<usize> = (0..self.nrow()).collect();
                self.assign_block(&names, &positions, value)
            }
            // (f) hyper-set assignment
            _ => {
                let positions = index::resolve_indices(&rows, self.nrow())?;
                self.assign_block(&names, &positions, value)
            }
        }
    }

    /// Assign `value` to the cross of `names` and row `positions`.
    ///
    /// Scalars broadcast to every selected cell. A sequence is accepted
    /// only when the selection is one-dimensional (a single row or a
    /// single column); a rectangular sequence assignment is ambiguous and
    /// fails without side effects.
    fn assign_block(
        &mut self,
        names: &[String],
        positions: &[usize],
        value: Operand,
    ) -> Result<()> {
        let selectors: Vec<RowSelector> = positions
            .iter()
            .map(|&p| RowSelector::Index(p as i64))
            .collect();
        match &value {
            Operand::Scalar(_) => {
                for name in names {
                    self.store_mut().column_mut(name)?.set(&selectors, &value)?;
                }
            }
            Operand::Values(vs) => {
                if names.len() == 1 {
                    self.store_mut().column_mut(&names[0])?.set(&selectors, &value)?;
                } else if positions.len() == 1 {
                    ensure!(
                        vs.len() == names.len(),
                        crate::error::DimensionMismatchSnafu {
                            expected: names.len(),
                            actual: vs.len(),
                        }
                    );
                    for (name, v) in names.iter().zip(vs) {
                        self.store_mut()
                            .column_mut(name)?
                            .set(&selectors, &Operand::Scalar(v.clone()))?;
                    }
                } else {
                    return AmbiguousAssignmentSnafu {
                        rows: positions.len(),
                        cols: names.len(),
                    }
                    .fail();
                }
            }
        }
        self.sync();
        Ok(())
    }
}
