//! Error types and SNAFU context selectors for the table engine.
//!
//! This module centralizes the `TableError` enum used across the public API
//! and exposes context selectors (via `#[snafu(visibility(pub(crate)))]`) so
//! sibling modules can attach error context without re-exporting everything
//! at the crate root. Keep new variants here to ensure consistent
//! user-facing messages.
//!
//! All errors are synchronous and propagate immediately to the caller.
//! Bulk-mutating operations validate shape *before* applying any side
//! effect, so a failed call never leaves a table ragged.

use snafu::prelude::*;

/// Errors raised by table, column, store, and selector operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    /// A resolved absolute position fell outside `[-len, len - 1]`.
    ///
    /// Raised for row positions, column positional access, and lag steps
    /// exceeding the column length.
    #[snafu(display("Index {index} out of range for length {len}"))]
    IndexOutOfRange {
        /// The offending index as supplied by the caller (may be negative).
        index: i64,
        /// The length of the sequence being indexed.
        len: usize,
    },

    /// An open-ended range could not be resolved to a closed range.
    #[snafu(display(
        "Cannot resolve range (start: {start:?}, end: {end:?}) over {len} elements"
    ))]
    RangeBounds {
        /// Start bound as supplied, `None` when open.
        start: Option<i64>,
        /// End bound as supplied, `None` when open.
        end: Option<i64>,
        /// The length of the sequence being indexed.
        len: usize,
    },

    /// A column name was looked up that the table does not declare.
    #[snafu(display("Unknown column: {name}"))]
    KeyNotFound {
        /// The undeclared column name.
        name: String,
    },

    /// An assignment value's length disagrees with the target shape.
    ///
    /// Covers row writes (expected `ncol`), column writes (expected
    /// `nrow`), and multi-index writes (expected the resolved index count).
    #[snafu(display("Dimension mismatch: expected {expected} values, got {actual}"))]
    DimensionMismatch {
        /// Number of values the target shape requires.
        expected: usize,
        /// Number of values actually supplied.
        actual: usize,
    },

    /// Invalid construction or operation arguments (empty column name,
    /// missing names for rows-as-sequences input, non-numeric operand,
    /// integer division by zero, and similar).
    #[snafu(display("Invalid argument: {message}"))]
    InvalidArgument {
        /// Human-readable description of the rejected argument.
        message: String,
    },

    /// A sequence value was assigned across multiple rows *and* multiple
    /// columns at once.
    ///
    /// Row-major vs. column-major semantics for a rectangular block are
    /// deliberately undefined; callers must assign per row or per column.
    #[snafu(display(
        "Ambiguous assignment of a sequence across {rows} rows x {cols} columns; \
         assign a scalar, or one row/column at a time"
    ))]
    AmbiguousAssignment {
        /// Number of rows selected by the assignment.
        rows: usize,
        /// Number of columns selected by the assignment.
        cols: usize,
    },

    /// An operation was invoked that cannot preserve the equal-length
    /// column invariant and is therefore forbidden.
    #[snafu(display("Operation `{operation}` would bypass column synchronization"))]
    ForbiddenMutation {
        /// Name of the forbidden operation.
        operation: String,
    },

    /// No input adapter could interpret the constructor input.
    #[snafu(display("Cannot convert input into columns: {message}"))]
    Conversion {
        /// Why the conversion was rejected.
        message: String,
    },
}

/// Convenience result alias used throughout the crate.
pub type Result<T, E = TableError> = std::result::Result<T, E>;
