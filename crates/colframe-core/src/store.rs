//! Insertion-ordered name-to-column mapping owning the rectangular
//! invariant.
//!
//! The store is the one place allowed to change row count or row order:
//! the two structural primitives ([`ColumnStore::subset_to`] and
//! [`ColumnStore::remove_at`]) rewrite *every* column to the same
//! retained/removed absolute positions, so sibling columns can never drift
//! apart. Columns carry no independent notion of row identity.
//!
//! Every structurally mutating operation bumps a generation counter; the
//! owning table compares it against its row cursor's last-synced
//! generation and resynchronizes the cursor's accessor registry. This is a
//! hard post-condition of mutation, not an optimization: stale accessors
//! are a correctness bug.
//!
//! A closed set of operations (`replace`, `transform_keys`,
//! `transform_values`) would bypass the synchronization contract; they
//! exist only to fail.

use std::collections::HashMap;

use log::debug;
use snafu::ensure;

use crate::column::Column;
use crate::error::{
    DimensionMismatchSnafu, ForbiddenMutationSnafu, InvalidArgumentSnafu, KeyNotFoundSnafu,
    Result,
};
use crate::value::Value;

/// Ordered mapping from column name to [`Column`], all of equal length.
#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    order: Vec<String>,
    columns: HashMap<String, Column>,
    generation: u64,
}

impl ColumnStore {
    /// Create an empty store.
    pub fn new() -> Self {
        ColumnStore::default()
    }

    /// Row count: the length of any column, 0 when the store is empty.
    pub fn nrow(&self) -> usize {
        self.order
            .first()
            .map(|name| self.columns[name].len())
            .unwrap_or(0)
    }

    /// Column count.
    pub fn ncol(&self) -> usize {
        self.order.len()
    }

    /// `(nrow, ncol)`.
    pub fn dim(&self) -> (usize, usize) {
        (self.nrow(), self.ncol())
    }

    /// Column names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// True iff a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Generation counter, bumped by every structural mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns.get(name).ok_or_else(|| {
            KeyNotFoundSnafu { name }.build()
        })
    }

    /// Mutably borrow a column by name. Value-level writes through this
    /// reference cannot change the column's length.
    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns.get_mut(name).ok_or_else(|| {
            KeyNotFoundSnafu { name }.build()
        })
    }

    /// Iterate `(name, column)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), &self.columns[name]))
    }

    fn validate_name(name: &str) -> Result<()> {
        ensure!(
            !name.is_empty(),
            InvalidArgumentSnafu {
                message: "column name must be a non-empty string".to_string(),
            }
        );
        Ok(())
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    /// Insert or replace a column.
    ///
    /// When the store holds exactly one column and `name` matches it, the
    /// replacement may have any length (it re-establishes the row count).
    /// Otherwise the new column's length must equal the current row count,
    /// or the store must be empty.
    pub fn set(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        Self::validate_name(name)?;
        let column = Column::from_values(values);
        let sole_column = self.ncol() == 1 && self.order[0] == name;
        if !self.order.is_empty() && !sole_column {
            ensure!(
                column.len() == self.nrow(),
                DimensionMismatchSnafu {
                    expected: self.nrow(),
                    actual: column.len(),
                }
            );
        }
        if !self.contains(name) {
            self.order.push(name.to_string());
        }
        self.columns.insert(name.to_string(), column);
        self.touch();
        Ok(())
    }

    /// Rename a column, keeping its position in the ordering.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        Self::validate_name(new)?;
        ensure!(
            !self.contains(new) || old == new,
            InvalidArgumentSnafu {
                message: format!("column `{new}` already exists"),
            }
        );
        let column = self
            .columns
            .remove(old)
            .ok_or_else(|| KeyNotFoundSnafu { name: old }.build())?;
        if let Some(slot) = self.order.iter().position(|n| n == old) {
            self.order[slot] = new.to_string();
        }
        self.columns.insert(new.to_string(), column);
        self.touch();
        Ok(())
    }

    /// Remove a column and return it.
    pub fn delete(&mut self, name: &str) -> Result<Column> {
        let column = self
            .columns
            .remove(name)
            .ok_or_else(|| KeyNotFoundSnafu { name }.build())?;
        self.order.retain(|n| n != name);
        self.touch();
        Ok(column)
    }

    /// Remove every column for which `predicate` returns true.
    pub fn delete_if<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&str, &Column) -> bool,
    {
        let doomed: Vec<String> = self
            .order
            .iter()
            .filter(|name| predicate(name, &self.columns[*name]))
            .cloned()
            .collect();
        for name in &doomed {
            self.columns.remove(name);
        }
        self.order.retain(|n| !doomed.contains(n));
        if !doomed.is_empty() {
            self.touch();
        }
    }

    /// Union with `pairs`, returning a new store. Existing names are
    /// overwritten; lengths are checked before anything is copied.
    pub fn merge(&self, pairs: &[(String, Vec<Value>)]) -> Result<ColumnStore> {
        let mut out = self.clone();
        out.merge_in_place(pairs)?;
        Ok(out)
    }

    /// Union with `pairs` in place.
    ///
    /// All lengths are validated against the resulting row count before
    /// any column is written, so a failed merge leaves the store intact.
    pub fn merge_in_place(&mut self, pairs: &[(String, Vec<Value>)]) -> Result<()> {
        let expected = if self.order.is_empty() {
            pairs.first().map(|(_, v)| v.len()).unwrap_or(0)
        } else {
            self.nrow()
        };
        for (name, values) in pairs {
            Self::validate_name(name)?;
            ensure!(
                values.len() == expected,
                DimensionMismatchSnafu {
                    expected,
                    actual: values.len(),
                }
            );
        }
        for (name, values) in pairs {
            if !self.contains(name) {
                self.order.push(name.clone());
            }
            self.columns
                .insert(name.clone(), Column::from_values(values.clone()));
        }
        if !pairs.is_empty() {
            self.touch();
        }
        Ok(())
    }

    /// Projection onto `names`, in the requested order, as a new store.
    pub fn slice(&self, names: &[&str]) -> Result<ColumnStore> {
        let mut out = ColumnStore::new();
        for name in names {
            let column = self.column(name)?;
            out.order.push(name.to_string());
            out.columns.insert(name.to_string(), column.clone());
        }
        Ok(out)
    }

    /// Projection onto `names` in place, dropping every other column.
    pub fn slice_in_place(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            ensure!(self.contains(name), KeyNotFoundSnafu { name: *name });
        }
        self.order = names.iter().map(|n| n.to_string()).collect();
        self.columns.retain(|name, _| names.contains(&name.as_str()));
        self.touch();
        Ok(())
    }

    /// Sort the *name* ordering lexicographically. Row order is untouched.
    pub fn sort_names(&mut self) {
        self.order.sort();
        self.touch();
    }

    /// Drop every column.
    pub fn clear(&mut self) {
        self.order.clear();
        self.columns.clear();
        self.touch();
    }

    /// Remove the first `count` rows from every column.
    pub fn shift(&mut self, count: usize) {
        let count = count.min(self.nrow());
        let positions: Vec<usize> = (0..count).collect();
        self.remove_at(&positions);
    }

    /// Rewrite every column to the values at `positions`, in that order.
    ///
    /// Duplicated positions duplicate rows; this is the permutation /
    /// subset primitive behind sorting and row selection. Positions must
    /// be pre-resolved absolute indices.
    pub(crate) fn subset_to(&mut self, positions: &[usize]) {
        debug!(
            "subset_to: {} of {} rows retained across {} columns",
            positions.len(),
            self.nrow(),
            self.ncol()
        );
        for column in self.columns.values_mut() {
            column.subset_to(positions);
        }
        self.touch();
    }

    /// Remove the rows at `positions` (sorted, deduplicated) from every
    /// column.
    pub(crate) fn remove_at(&mut self, positions: &[usize]) {
        debug!(
            "remove_at: dropping {} of {} rows across {} columns",
            positions.len(),
            self.nrow(),
            self.ncol()
        );
        for column in self.columns.values_mut() {
            column.remove_at_sorted(positions);
        }
        self.touch();
    }

    /// Extend every column by `incoming_nrow` rows.
    ///
    /// Existing columns named in `pairs` receive the paired values; other
    /// existing columns are padded with their absent filler. Names present
    /// only in `pairs` become new columns back-filled with absence markers
    /// for all prior rows. Every value list in `pairs` must hold exactly
    /// `incoming_nrow` values; the caller validates this, so the extension
    /// applies atomically.
    pub(crate) fn append_pairs(&mut self, pairs: &[(String, Vec<Value>)], incoming_nrow: usize) {
        let old_nrow = self.nrow();
        debug!(
            "append_pairs: {} incoming rows, {} incoming columns onto {:?}",
            incoming_nrow,
            pairs.len(),
            self.dim()
        );
        for name in self.order.clone() {
            let incoming = pairs.iter().find(|(n, _)| *n == name);
            let Some(column) = self.columns.get_mut(&name) else {
                continue;
            };
            let filler = column.absent_value();
            match incoming {
                // Incoming gaps arrive as `Nil`; numeric-like columns
                // represent absence with their sentinel.
                Some((_, values)) => column.extend(values.iter().map(|v| {
                    if v.is_nil() {
                        filler.clone()
                    } else {
                        v.clone()
                    }
                })),
                None => {
                    column.extend(std::iter::repeat_with(|| filler.clone()).take(incoming_nrow));
                }
            }
        }
        for (name, values) in pairs {
            if self.contains(name) {
                continue;
            }
            let mut padded = vec![Value::Nil; old_nrow];
            padded.extend(values.iter().cloned());
            self.order.push(name.clone());
            self.columns.insert(name.clone(), Column::from_values(padded));
        }
        self.touch();
    }

    /// Forbidden: wholesale replacement of the column mapping.
    pub fn replace(&mut self) -> Result<()> {
        ForbiddenMutationSnafu {
            operation: "replace",
        }
        .fail()
    }

    /// Forbidden: bulk key rewriting outside `rename`.
    pub fn transform_keys(&mut self) -> Result<()> {
        ForbiddenMutationSnafu {
            operation: "transform_keys",
        }
        .fail()
    }

    /// Forbidden: bulk value rewriting outside the column primitives.
    pub fn transform_values(&mut self) -> Result<()> {
        ForbiddenMutationSnafu {
            operation: "transform_values",
        }
        .fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_values(vals: &[i64]) -> Vec<Value> {
        vals.iter().map(|&v| Value::Int(v)).collect()
    }

    fn sample() -> ColumnStore {
        let mut store = ColumnStore::new();
        store.set("a", int_values(&[1, 2, 3])).unwrap();
        store.set("b", int_values(&[4, 5, 6])).unwrap();
        store
    }

    #[test]
    fn set_enforces_equal_length_after_first_column() {
        let mut store = ColumnStore::new();
        store.set("a", int_values(&[1, 2, 3])).unwrap();
        assert!(store.set("b", int_values(&[1, 2])).is_err());
        store.set("b", int_values(&[4, 5, 6])).unwrap();
        assert_eq!(store.dim(), (3, 2));
    }

    #[test]
    fn sole_column_may_be_replaced_with_new_length() {
        let mut store = ColumnStore::new();
        store.set("a", int_values(&[1, 2, 3])).unwrap();
        store.set("a", int_values(&[9])).unwrap();
        assert_eq!(store.dim(), (1, 1));

        // With a sibling present the rule no longer applies.
        let mut store = sample();
        assert!(store.set("a", int_values(&[9])).is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut store = ColumnStore::new();
        assert!(store.set("", int_values(&[1])).is_err());
    }

    #[test]
    fn rename_keeps_ordering_position() {
        let mut store = sample();
        store.rename("a", "alpha").unwrap();
        assert_eq!(store.names(), ["alpha", "b"]);
        assert!(store.rename("missing", "x").is_err());
        assert!(store.rename("alpha", "b").is_err());
    }

    #[test]
    fn delete_and_delete_if_update_order() {
        let mut store = sample();
        let gone = store.delete("a").unwrap();
        assert_eq!(gone.len(), 3);
        assert_eq!(store.names(), ["b"]);

        let mut store = sample();
        store.delete_if(|name, _| name == "b");
        assert_eq!(store.names(), ["a"]);
    }

    #[test]
    fn merge_validates_before_writing() {
        let mut store = sample();
        let bad = vec![
            ("c".to_string(), int_values(&[7, 8, 9])),
            ("d".to_string(), int_values(&[1])),
        ];
        assert!(store.merge_in_place(&bad).is_err());
        // Nothing was applied.
        assert_eq!(store.dim(), (3, 2));

        store
            .merge_in_place(&[("c".to_string(), int_values(&[7, 8, 9]))])
            .unwrap();
        assert_eq!(store.names(), ["a", "b", "c"]);
    }

    #[test]
    fn slice_projects_in_requested_order() {
        let store = sample();
        let projected = store.slice(&["b", "a"]).unwrap();
        assert_eq!(projected.names(), ["b", "a"]);
        assert!(store.slice(&["nope"]).is_err());

        let mut store = sample();
        assert!(store.slice_in_place(&["b", "nope"]).is_err());
        assert_eq!(store.ncol(), 2);
        store.slice_in_place(&["b"]).unwrap();
        assert_eq!(store.names(), ["b"]);
    }

    #[test]
    fn shift_drops_leading_rows_everywhere() {
        let mut store = sample();
        store.shift(2);
        assert_eq!(store.dim(), (1, 2));
        assert_eq!(store.column("a").unwrap().values(), &[Value::Int(3)]);
        assert_eq!(store.column("b").unwrap().values(), &[Value::Int(6)]);
    }

    #[test]
    fn structural_primitives_keep_columns_aligned() {
        let mut store = sample();
        store.subset_to(&[2, 0]);
        assert_eq!(store.column("a").unwrap().values(), &[Value::Int(3), Value::Int(1)]);
        assert_eq!(store.column("b").unwrap().values(), &[Value::Int(6), Value::Int(4)]);

        let mut store = sample();
        store.remove_at(&[1]);
        assert_eq!(store.dim(), (2, 2));
        assert_eq!(store.column("b").unwrap().values(), &[Value::Int(4), Value::Int(6)]);
    }

    #[test]
    fn forbidden_operations_fail_loudly() {
        let mut store = sample();
        assert!(store.replace().is_err());
        assert!(store.transform_keys().is_err());
        assert!(store.transform_values().is_err());
        assert_eq!(store.dim(), (3, 2));
    }

    #[test]
    fn generation_bumps_on_structural_mutation() {
        let mut store = ColumnStore::new();
        let g0 = store.generation();
        store.set("a", int_values(&[1])).unwrap();
        assert!(store.generation() > g0);
        let g1 = store.generation();
        store.rename("a", "b").unwrap();
        assert!(store.generation() > g1);
    }
}
