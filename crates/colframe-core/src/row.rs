//! The reusable row cursor and its borrowed access types.
//!
//! A [`RowView`] is not a copied row: it is a position into the owning
//! table's column set plus a registry of accessor names. Reads and writes
//! through it hit the underlying columns directly. The registry must always
//! equal the table's current column names; the table resynchronizes it
//! (via [`RowView::resync_accessors`]) after every store mutation, keyed by
//! the store's generation counter so the resync is idempotent and cheap to
//! skip when nothing changed.
//!
//! Borrowed access happens through [`RowRef`] (shared) and [`RowMut`]
//! (exclusive), which pair the cursor with the column store for the
//! duration of the access.

use log::debug;
use snafu::ensure;

use crate::column::Operand;
use crate::error::{DimensionMismatchSnafu, KeyNotFoundSnafu, Result};
use crate::index::{resolve_index, RowSelector};
use crate::store::ColumnStore;
use crate::value::Value;

/// A reusable cursor into one table: a position plus an accessor-name
/// registry kept equal to the table's current column names.
#[derive(Debug, Clone, Default)]
pub struct RowView {
    position: usize,
    accessors: Vec<String>,
    synced_generation: u64,
}

impl RowView {
    /// Create a cursor at position 0 with an empty registry.
    pub fn new() -> Self {
        RowView::default()
    }

    /// Current absolute position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor. Valid positions lie in `[-nrow, nrow - 1]`;
    /// negative positions count from the end.
    pub fn set_position(&mut self, position: i64, nrow: usize) -> Result<()> {
        self.position = resolve_index(position, nrow)?;
        Ok(())
    }

    /// The accessor-name registry, in column order.
    pub fn accessors(&self) -> &[String] {
        &self.accessors
    }

    /// True iff `name` is a registered accessor.
    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors.iter().any(|n| n == name)
    }

    /// True iff the registry reflects store generation `generation`.
    pub fn is_synced(&self, generation: u64) -> bool {
        self.synced_generation == generation
    }

    /// Diff the remembered registry against the table's current column
    /// names: register accessors for newly present names, drop accessors
    /// for names no longer present. Idempotent; invoked by the table after
    /// every store mutation.
    pub fn resync_accessors(&mut self, names: &[String], generation: u64) {
        let added: Vec<&String> = names
            .iter()
            .filter(|n| !self.accessors.contains(n))
            .collect();
        let removed: Vec<&String> = self
            .accessors
            .iter()
            .filter(|n| !names.contains(n))
            .collect();
        if !added.is_empty() || !removed.is_empty() {
            debug!(
                "resync_accessors: +{} -{} accessors",
                added.len(),
                removed.len()
            );
        }
        self.accessors = names.to_vec();
        self.synced_generation = generation;
    }
}

/// Shared access to the row under a cursor.
#[derive(Debug)]
pub struct RowRef<'a> {
    store: &'a ColumnStore,
    view: &'a RowView,
}

impl<'a> RowRef<'a> {
    pub(crate) fn new(store: &'a ColumnStore, view: &'a RowView) -> Self {
        RowRef { store, view }
    }

    /// The cursor position this row reads from.
    pub fn position(&self) -> usize {
        self.view.position()
    }

    /// Read the named field at the cursor position.
    pub fn get(&self, name: &str) -> Result<Value> {
        ensure!(self.view.has_accessor(name), KeyNotFoundSnafu { name });
        self.store.column(name)?.value_at(self.view.position() as i64)
    }

    /// Whole-row read, ordered by the current column names.
    pub fn values(&self) -> Vec<Value> {
        self.view
            .accessors()
            .iter()
            .map(|name| {
                self.store
                    .column(name)
                    .and_then(|c| c.value_at(self.view.position() as i64))
                    .unwrap_or(Value::Nil)
            })
            .collect()
    }

    /// Snapshot the row as ordered `(name, value)` pairs.
    pub fn to_pairs(&self) -> Vec<(String, Value)> {
        self.view
            .accessors()
            .iter()
            .cloned()
            .zip(self.values())
            .collect()
    }
}

/// Exclusive access to the row under a cursor.
#[derive(Debug)]
pub struct RowMut<'a> {
    store: &'a mut ColumnStore,
    view: &'a RowView,
}

impl<'a> RowMut<'a> {
    pub(crate) fn new(store: &'a mut ColumnStore, view: &'a RowView) -> Self {
        RowMut { store, view }
    }

    /// The cursor position this row writes to.
    pub fn position(&self) -> usize {
        self.view.position()
    }

    /// Read the named field at the cursor position.
    pub fn get(&self, name: &str) -> Result<Value> {
        RowRef::new(self.store, self.view).get(name)
    }

    /// Write the named field at the cursor position.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        ensure!(self.view.has_accessor(name), KeyNotFoundSnafu { name });
        let position = self.view.position() as i64;
        self.store
            .column_mut(name)?
            .set(&[RowSelector::Index(position)], &Operand::Scalar(value))
    }

    /// Whole-row write. A scalar broadcasts to every column; a sequence
    /// must hold exactly `ncol` values.
    pub fn set_values(&mut self, value: &Operand) -> Result<()> {
        let names: Vec<String> = self.view.accessors().to_vec();
        match value {
            Operand::Scalar(v) => {
                for name in &names {
                    self.set(name, v.clone())?;
                }
            }
            Operand::Values(vs) => {
                ensure!(
                    vs.len() == names.len(),
                    DimensionMismatchSnafu {
                        expected: names.len(),
                        actual: vs.len(),
                    }
                );
                for (name, v) in names.iter().zip(vs) {
                    self.set(name, v.clone())?;
                }
            }
        }
        Ok(())
    }
}
