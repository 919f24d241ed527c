//! In-memory, mutable, column-oriented table engine.
//!
//! This crate provides the foundational pieces for `colframe`:
//!
//! - A dynamically typed [`Value`] cell model with a dedicated absence
//!   marker and a numeric sentinel, plus hashable key forms for grouping
//!   (`value` module).
//! - Negative-index and open-range resolution shared by every positional
//!   surface (`index` module).
//! - A [`Column`] vector with element-wise arithmetic, lag/diff/cumulative
//!   transforms, stable sorting, and summary statistics (`column` module).
//! - A [`ColumnStore`] that owns named equal-length columns and applies
//!   every row mutation to all of them atomically (`store` module).
//! - Live row cursors whose accessor sets resynchronize with column
//!   renames, additions, and deletions (`row` module).
//! - The [`Table`] facade: 2-D mixed indexing, predicate selection, row
//!   sorting, grouping, key-column merges, and heterogeneous appends
//!   (`table` module and its submodules).
//! - Input adapters that reduce columns, row mappings, row sequences, and
//!   other tables to one canonical construction form (`convert` module).

#![deny(missing_docs)]

pub mod column;
pub mod convert;
pub mod error;
pub mod index;
pub mod row;
pub mod store;
pub mod table;
pub mod value;

#[cfg(test)]
pub(crate) mod test_util;

pub use column::{Column, ColumnSlice, Operand, SortOptions};
pub use convert::TableSource;
pub use error::{Result, TableError};
pub use index::{RangeSelector, RowSelector};
pub use row::{RowMut, RowRef, RowView};
pub use store::ColumnStore;
pub use table::indexing::{Fetched, Selector};
pub use table::merge::JoinKind;
pub use table::Table;
pub use value::{BinOp, Value, ValueKey};
