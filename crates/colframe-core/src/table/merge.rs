//! Key-column merge (join) between two tables.
//!
//! The algorithm:
//!
//! 1. Split each side's columns into key columns and the rest.
//! 2. Group both sides' row positions by the key-column tuple.
//! 3. Pick the participating key groups: `Left` keeps exactly the left's
//!    keys; `Inner` keeps keys present on both sides; `Outer` keeps the
//!    left's keys in their original order, then right-only keys in the
//!    right's encounter order.
//! 4. Per key, emit the cross-product of matching rows (left x right).
//!    When one side has no match, emit one row per present-side row with
//!    that side's non-key values absent.
//! 5. Concatenate the per-key blocks in key-traversal order. Result
//!    columns: keys, then the left's non-key columns, then the right's.
//!
//! Neither input is mutated. Column-name collisions outside the key set
//! are not auto-renamed; they are rejected so the caller resolves them.

use std::collections::HashMap;

use log::debug;
use snafu::ensure;

use crate::error::{InvalidArgumentSnafu, Result};
use crate::table::Table;
use crate::value::{Value, ValueKey};

/// Which key groups participate in a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Keys present on both sides.
    Inner,
    /// Exactly the left side's keys.
    Left,
    /// Every key from either side; right-only keys trail.
    Outer,
}

/// Column buffers for the table under construction.
struct Emitter {
    names: Vec<String>,
    buffers: Vec<Vec<Value>>,
}

impl Emitter {
    fn new(names: Vec<String>) -> Self {
        let buffers = names.iter().map(|_| Vec::new()).collect();
        Emitter { names, buffers }
    }

    fn push_row(&mut self, row: impl IntoIterator<Item = Value>) {
        for (buffer, value) in self.buffers.iter_mut().zip(row) {
            buffer.push(value);
        }
    }

    fn into_table(self) -> Result<Table> {
        Table::from_pairs(self.names.into_iter().zip(self.buffers).collect())
    }
}

impl Table {
    /// Merge with `other` on the key columns `by`.
    ///
    /// Both inputs are left untouched; the result is freshly constructed.
    /// Non-key column names must be disjoint between the two sides.
    pub fn merge(&self, other: &Table, by: &[&str], how: JoinKind) -> Result<Table> {
        for name in by {
            self.column(name)?;
            other.column(name)?;
        }
        let left_rest = rest_names(self, by);
        let right_rest = rest_names(other, by);
        for name in &right_rest {
            ensure!(
                !left_rest.contains(name),
                InvalidArgumentSnafu {
                    message: format!(
                        "non-key column `{name}` exists on both sides; rename before merging"
                    ),
                }
            );
        }

        let left_groups = self.group_indexes(by)?;
        let right_groups = other.group_indexes(by)?;
        let right_by_key: HashMap<Vec<ValueKey>, usize> = right_groups
            .iter()
            .enumerate()
            .map(|(slot, (tuple, _))| (tuple.iter().map(Value::key).collect(), slot))
            .collect();
        let left_keys: std::collections::HashSet<Vec<ValueKey>> = left_groups
            .iter()
            .map(|(tuple, _)| tuple.iter().map(Value::key).collect())
            .collect();

        debug!(
            "merge {how:?} on {by:?}: {} left keys, {} right keys",
            left_groups.len(),
            right_groups.len()
        );

        let mut names: Vec<String> = by.iter().map(|n| n.to_string()).collect();
        names.extend(left_rest.iter().cloned());
        names.extend(right_rest.iter().cloned());
        let mut emitter = Emitter::new(names);

        for (tuple, left_rows) in &left_groups {
            let key: Vec<ValueKey> = tuple.iter().map(Value::key).collect();
            let right_rows = right_by_key
                .get(&key)
                .map(|&slot| right_groups[slot].1.as_slice());
            match (how, right_rows) {
                (JoinKind::Inner, None) => continue,
                (_, None) => {
                    for &l in left_rows {
                        emitter.push_row(
                            tuple
                                .iter()
                                .cloned()
                                .chain(values_at_row(self, &left_rest, l))
                                .chain(right_rest.iter().map(|_| Value::Nil)),
                        );
                    }
                }
                (_, Some(right_rows)) => {
                    for &l in left_rows {
                        for &r in right_rows {
                            emitter.push_row(
                                tuple
                                    .iter()
                                    .cloned()
                                    .chain(values_at_row(self, &left_rest, l))
                                    .chain(values_at_row(other, &right_rest, r)),
                            );
                        }
                    }
                }
            }
        }

        if how == JoinKind::Outer {
            for (tuple, right_rows) in &right_groups {
                let key: Vec<ValueKey> = tuple.iter().map(Value::key).collect();
                if left_keys.contains(&key) {
                    continue;
                }
                for &r in right_rows {
                    emitter.push_row(
                        tuple
                            .iter()
                            .cloned()
                            .chain(left_rest.iter().map(|_| Value::Nil))
                            .chain(values_at_row(other, &right_rest, r)),
                    );
                }
            }
        }

        emitter.into_table()
    }
}

fn rest_names(table: &Table, by: &[&str]) -> Vec<String> {
    table
        .column_names()
        .iter()
        .filter(|n| !by.contains(&n.as_str()))
        .cloned()
        .collect()
}

fn values_at_row(table: &Table, names: &[String], row: usize) -> Vec<Value> {
    names
        .iter()
        .map(|name| {
            table
                .column(name)
                .map(|c| c.values()[row].clone())
                .unwrap_or(Value::Nil)
        })
        .collect()
}
