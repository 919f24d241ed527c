//! The table orchestrator.
//!
//! A [`Table`] owns one [`ColumnStore`] and one [`RowView`] cursor. It
//! delegates storage and shape concerns to the store, per-column algorithms
//! to [`crate::column::Column`], and row-wise access to the cursor, and it
//! keeps the cursor's accessor registry synchronized with the store's
//! column names after every structural mutation.
//!
//! The heavier operations live in submodules:
//!
//! - `indexing`: two-dimensional get/set dispatch over mixed selectors.
//! - `select`: row predicates and the sibling-synchronized row filters.
//! - `sort`: successive single-column sorts.
//! - `group`: key-tuple grouping into index sets and sub-tables.
//! - `merge`: inner/left/outer join on key columns.
//! - `append`: heterogeneous row appends with absence back-filling.

pub mod append;
pub mod group;
pub mod indexing;
pub mod merge;
pub mod select;
pub mod sort;

use std::fmt;

use crate::column::Column;
use crate::convert::TableSource;
use crate::error::Result;
use crate::row::{RowMut, RowRef, RowView};
use crate::store::ColumnStore;
use crate::value::Value;

/// An in-memory, mutable, column-oriented table: uniquely named columns of
/// identical length plus a reusable row cursor.
#[derive(Debug, Clone, Default)]
pub struct Table {
    store: ColumnStore,
    view: RowView,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Table::default()
    }

    /// Build a table from any convertible source.
    pub fn from_source(source: TableSource) -> Result<Self> {
        let pairs = source.into_columns(None)?;
        Table::from_pairs(pairs)
    }

    /// Build a table from ordered `(name, values)` pairs.
    pub fn from_pairs(pairs: Vec<(String, Vec<Value>)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, values) in pairs {
            table.store.set(&name, values)?;
        }
        table.sync();
        Ok(table)
    }

    /// Wrap an already-built store (used by row-subset construction).
    pub(crate) fn from_store(store: ColumnStore) -> Self {
        let mut table = Table {
            store,
            view: RowView::new(),
        };
        table.sync();
        table
    }

    /// Resynchronize the cursor's accessor registry with the store.
    ///
    /// Called after every mutation path; cheap when nothing changed.
    pub(crate) fn sync(&mut self) {
        if !self.view.is_synced(self.store.generation()) {
            self.view
                .resync_accessors(self.store.names(), self.store.generation());
        }
    }

    /// `(nrow, ncol)`.
    pub fn shape(&self) -> (usize, usize) {
        self.store.dim()
    }

    /// Row count.
    pub fn nrow(&self) -> usize {
        self.store.nrow()
    }

    /// Column count.
    pub fn ncol(&self) -> usize {
        self.store.ncol()
    }

    /// Column names in display order.
    pub fn column_names(&self) -> &[String] {
        self.store.names()
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &ColumnStore {
        &self.store
    }

    /// Store access for in-crate mutation paths; callers must `sync()`
    /// afterwards.
    pub(crate) fn store_mut(&mut self) -> &mut ColumnStore {
        &mut self.store
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.store.column(name)
    }

    // ---- column-set mutation (all funnel through the store + resync) ----

    /// Insert or replace a column. See [`ColumnStore::set`] for the
    /// length rules.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        self.store.set(name, values)?;
        self.sync();
        Ok(())
    }

    /// Rename a column in place.
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<()> {
        self.store.rename(old, new)?;
        self.sync();
        Ok(())
    }

    /// Remove a column and return it.
    pub fn delete_column(&mut self, name: &str) -> Result<Column> {
        let column = self.store.delete(name)?;
        self.sync();
        Ok(column)
    }

    /// Remove every column matching `predicate`.
    pub fn delete_columns_if<F>(&mut self, predicate: F)
    where
        F: FnMut(&str, &Column) -> bool,
    {
        self.store.delete_if(predicate);
        self.sync();
    }

    /// Union additional columns into the table.
    pub fn merge_columns(&mut self, pairs: &[(String, Vec<Value>)]) -> Result<()> {
        self.store.merge_in_place(pairs)?;
        self.sync();
        Ok(())
    }

    /// Non-mutating projection onto the named columns.
    pub fn slice_columns(&self, names: &[&str]) -> Result<Table> {
        Ok(Table::from_store(self.store.slice(names)?))
    }

    /// In-place projection onto the named columns.
    pub fn slice_columns_in_place(&mut self, names: &[&str]) -> Result<()> {
        self.store.slice_in_place(names)?;
        self.sync();
        Ok(())
    }

    /// Sort the column-name ordering; row order is untouched.
    pub fn sort_column_names(&mut self) {
        self.store.sort_names();
        self.sync();
    }

    /// Drop all columns and rows.
    pub fn clear(&mut self) {
        self.store.clear();
        self.sync();
    }

    // ---- row cursor ----

    /// Move the shared row cursor. Valid positions lie in
    /// `[-nrow, nrow - 1]`.
    pub fn seek_row(&mut self, position: i64) -> Result<()> {
        self.view.set_position(position, self.nrow())
    }

    /// The row under the cursor.
    pub fn row(&self) -> RowRef<'_> {
        RowRef::new(&self.store, &self.view)
    }

    /// Move the cursor and read the row there.
    pub fn row_at(&mut self, position: i64) -> Result<RowRef<'_>> {
        self.seek_row(position)?;
        Ok(self.row())
    }

    /// Exclusive access to the row under the cursor.
    pub fn row_mut(&mut self) -> RowMut<'_> {
        RowMut::new(&mut self.store, &self.view)
    }

    /// Move the cursor and write the row there.
    pub fn row_mut_at(&mut self, position: i64) -> Result<RowMut<'_>> {
        self.seek_row(position)?;
        Ok(self.row_mut())
    }

    /// Values of the row at `position`, in column order, without moving
    /// the cursor.
    pub fn row_values(&self, position: i64) -> Result<Vec<Value>> {
        let names = self.store.names();
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            out.push(self.store.column(name)?.value_at(position)?);
        }
        Ok(out)
    }

    // ---- serialization boundary ----

    /// Ordered per-row `(name, value)` mappings, one per row.
    ///
    /// This is the interface consumed by external encoders and statement
    /// builders; the core performs no encoding itself.
    pub fn to_row_mappings(&self) -> Vec<Vec<(String, Value)>> {
        let names = self.store.names().to_vec();
        (0..self.nrow())
            .map(|i| {
                names
                    .iter()
                    .map(|name| {
                        let value = self
                            .store
                            .column(name)
                            .and_then(|c| c.value_at(i as i64))
                            .unwrap_or(Value::Nil);
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        let positions: Vec<usize> = (0..n.min(self.nrow())).collect();
        self.subset_rows(&positions)
    }

    /// The last `n` rows as a new table.
    pub fn tail(&self, n: usize) -> Table {
        let n = n.min(self.nrow());
        let positions: Vec<usize> = (self.nrow() - n..self.nrow()).collect();
        self.subset_rows(&positions)
    }

    /// New table holding the rows at `positions`, in that order.
    pub(crate) fn subset_rows(&self, positions: &[usize]) -> Table {
        let mut store = self.store.clone();
        store.subset_to(positions);
        Table::from_store(store)
    }
}

impl PartialEq for Table {
    /// Equal iff the column names match in order and every column pair is
    /// equal under sentinel-aware value equality. Cursor state is not
    /// part of table identity.
    fn eq(&self, other: &Self) -> bool {
        self.store.names() == other.store.names()
            && self
                .store
                .iter()
                .zip(other.store.iter())
                .all(|((_, a), (_, b))| a == b)
    }
}

impl fmt::Display for Table {
    /// Windowed per-column formatting: a header row, up to ten data rows,
    /// and a shape footer. This is the routine pretty-printers build on.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WINDOW: usize = 10;
        let names = self.store.names();
        if names.is_empty() {
            return write!(f, "(empty table)");
        }
        let shown = self.nrow().min(WINDOW);
        let mut widths: Vec<usize> = names.iter().map(|n| n.len()).collect();
        let mut cells: Vec<Vec<String>> = Vec::with_capacity(shown);
        for i in 0..shown {
            let mut row = Vec::with_capacity(names.len());
            for (c, name) in names.iter().enumerate() {
                let text = self
                    .store
                    .column(name)
                    .and_then(|col| col.value_at(i as i64))
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                widths[c] = widths[c].max(text.len());
                row.push(text);
            }
            cells.push(row);
        }
        for (c, name) in names.iter().enumerate() {
            write!(f, "{:>width$}  ", name, width = widths[c])?;
        }
        writeln!(f)?;
        for row in &cells {
            for (c, text) in row.iter().enumerate() {
                write!(f, "{:>width$}  ", text, width = widths[c])?;
            }
            writeln!(f)?;
        }
        if self.nrow() > shown {
            writeln!(f, "... ({} more rows)", self.nrow() - shown)?;
        }
        write!(f, "[{} rows x {} columns]", self.nrow(), self.ncol())
    }
}
