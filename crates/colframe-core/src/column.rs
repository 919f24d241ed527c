//! A single owned column of scalar values.
//!
//! A `Column` is a thin wrapper over `Vec<Value>` with positional access,
//! elementwise algebra, lag/diff, cumulative folds, and sort-permutation
//! computation. It deliberately knows nothing about sibling columns: any
//! operation that changes row count or row order goes through the owning
//! [`crate::store::ColumnStore`], which applies the same retained/removed
//! positions to every column so the table stays rectangular.
//!
//! Numeric-likeness is decided at construction: when the first non-absent
//! element is a float, every absence marker in the wrapped copy is eagerly
//! converted to the NaN sentinel.

use std::cmp::Ordering;

use snafu::ensure;

use crate::error::{DimensionMismatchSnafu, IndexOutOfRangeSnafu, Result};
use crate::index::{self, RowSelector};
use crate::value::{apply_binop, BinOp, Value};

/// Ordering options for column sorts.
#[derive(Debug, Clone, Copy)]
pub struct SortOptions {
    /// Place absent values (nil or the sentinel) before present ones.
    pub nils_first: bool,
    /// Sort present values ascending.
    pub asc: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        SortOptions {
            nils_first: true,
            asc: true,
        }
    }
}

/// Result of a positional fetch: one value or an ordered slice.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSlice {
    /// A single value, from a single-index selector.
    One(Value),
    /// An ordered multi-value fetch.
    Many(Vec<Value>),
}

/// Right-hand operand for elementwise algebra.
///
/// A sequence operand is paired elementwise (and must match the column
/// length); anything else broadcasts as a scalar.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Broadcast scalar.
    Scalar(Value),
    /// Pairwise sequence.
    Values(Vec<Value>),
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Scalar(v)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Scalar(Value::Int(v))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(Value::Float(v))
    }
}

impl From<Vec<Value>> for Operand {
    fn from(v: Vec<Value>) -> Self {
        Operand::Values(v)
    }
}

impl From<&Column> for Operand {
    fn from(c: &Column) -> Self {
        Operand::Values(c.values.clone())
    }
}

/// An owned, mutable sequence of scalar values.
#[derive(Debug, Clone, Default)]
pub struct Column {
    values: Vec<Value>,
}

impl Column {
    /// Wrap a copy of `values`.
    ///
    /// If the first non-absent element is a float, every `Nil` in the copy
    /// is converted to the NaN sentinel so the column is uniformly
    /// numeric-like.
    pub fn from_values(values: Vec<Value>) -> Self {
        let mut values = values;
        let numeric_like = values
            .iter()
            .find(|v| !v.is_absent())
            .is_some_and(|v| matches!(v, Value::Float(_)));
        if numeric_like {
            for v in values.iter_mut() {
                if v.is_nil() {
                    *v = Value::NAN;
                }
            }
        }
        Column { values }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True iff the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the underlying values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the column and return the underlying values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Iterate over the values.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// The filler used when this column must grow without data: the NaN
    /// sentinel for numeric-like columns, `Nil` otherwise.
    pub fn absent_value(&self) -> Value {
        match self.values.iter().find(|v| !v.is_absent()) {
            Some(Value::Float(_)) => Value::NAN,
            _ => match self.values.first() {
                Some(v) if v.is_nan() => Value::NAN,
                _ => Value::Nil,
            },
        }
    }

    /// Fetch the value at a single (possibly negative) index.
    pub fn value_at(&self, index: i64) -> Result<Value> {
        let pos = index::resolve_index(index, self.len())?;
        Ok(self.values[pos].clone())
    }

    /// Positional fetch over a selector list.
    ///
    /// A single integer selector yields [`ColumnSlice::One`]; a single
    /// range yields a bounded slice; a single `{start, len}` span yields a
    /// slice whose length may be clipped; anything else is an ordered
    /// multi-value fetch preserving duplicates.
    pub fn get(&self, selectors: &[RowSelector]) -> Result<ColumnSlice> {
        if let [RowSelector::Index(i)] = selectors {
            return Ok(ColumnSlice::One(self.value_at(*i)?));
        }
        let positions = index::resolve_indices(selectors, self.len())?;
        Ok(ColumnSlice::Many(self.values_at(&positions)))
    }

    /// Positional assignment over a selector list.
    ///
    /// A scalar operand broadcasts to every selected index; a sequence
    /// operand must match the resolved index count exactly.
    pub fn set(&mut self, selectors: &[RowSelector], value: &Operand) -> Result<()> {
        let positions = index::resolve_indices(selectors, self.len())?;
        match value {
            Operand::Scalar(v) => {
                for &p in &positions {
                    self.values[p] = v.clone();
                }
            }
            Operand::Values(vs) => {
                ensure!(
                    vs.len() == positions.len(),
                    DimensionMismatchSnafu {
                        expected: positions.len(),
                        actual: vs.len(),
                    }
                );
                for (&p, v) in positions.iter().zip(vs) {
                    self.values[p] = v.clone();
                }
            }
        }
        Ok(())
    }

    /// Ordered multi-value fetch by absolute positions. Positions must be
    /// pre-resolved and in bounds.
    pub(crate) fn values_at(&self, positions: &[usize]) -> Vec<Value> {
        positions.iter().map(|&p| self.values[p].clone()).collect()
    }

    /// Keep exactly the values at `positions`, in that order. Duplicated
    /// positions duplicate values; this is the store-level permutation /
    /// subset primitive.
    pub(crate) fn subset_to(&mut self, positions: &[usize]) {
        self.values = self.values_at(positions);
    }

    /// Remove the values at `positions` (sorted, deduplicated, absolute).
    pub(crate) fn remove_at_sorted(&mut self, positions: &[usize]) {
        let mut cursor = positions.iter().peekable();
        let mut kept = Vec::with_capacity(self.values.len().saturating_sub(positions.len()));
        for (i, v) in self.values.drain(..).enumerate() {
            if cursor.peek() == Some(&&i) {
                cursor.next();
            } else {
                kept.push(v);
            }
        }
        self.values = kept;
    }

    /// Append many values.
    pub(crate) fn extend(&mut self, values: impl IntoIterator<Item = Value>) {
        self.values.extend(values);
    }

    // ---- elementwise algebra ----

    /// Apply `op` elementwise, returning a new column.
    ///
    /// A sequence operand is paired position by position and must match
    /// this column's length; a scalar operand broadcasts.
    pub fn apply(&self, op: BinOp, rhs: &Operand) -> Result<Column> {
        let values = match rhs {
            Operand::Scalar(v) => self
                .values
                .iter()
                .map(|a| apply_binop(op, a, v))
                .collect::<Result<Vec<_>>>()?,
            Operand::Values(vs) => {
                ensure!(
                    vs.len() == self.len(),
                    DimensionMismatchSnafu {
                        expected: self.len(),
                        actual: vs.len(),
                    }
                );
                self.values
                    .iter()
                    .zip(vs)
                    .map(|(a, b)| apply_binop(op, a, b))
                    .collect::<Result<Vec<_>>>()?
            }
        };
        Ok(Column { values })
    }

    /// Apply `op` elementwise in place. Validation happens before any
    /// element is written, so a failed call leaves the column untouched.
    pub fn apply_in_place(&mut self, op: BinOp, rhs: &Operand) -> Result<()> {
        *self = self.apply(op, rhs)?;
        Ok(())
    }

    /// Elementwise `+`.
    pub fn add(&self, rhs: &Operand) -> Result<Column> {
        self.apply(BinOp::Add, rhs)
    }

    /// Elementwise `-`.
    pub fn subtract(&self, rhs: &Operand) -> Result<Column> {
        self.apply(BinOp::Subtract, rhs)
    }

    /// Elementwise `*`.
    pub fn multiply(&self, rhs: &Operand) -> Result<Column> {
        self.apply(BinOp::Multiply, rhs)
    }

    /// Elementwise `/`.
    pub fn divide(&self, rhs: &Operand) -> Result<Column> {
        self.apply(BinOp::Divide, rhs)
    }

    /// Elementwise exponentiation.
    pub fn power(&self, rhs: &Operand) -> Result<Column> {
        self.apply(BinOp::Power, rhs)
    }

    /// Elementwise remainder.
    pub fn modulo(&self, rhs: &Operand) -> Result<Column> {
        self.apply(BinOp::Modulo, rhs)
    }

    // ---- lag / diff / cumulative ----

    /// Shift values by `step` positions, inserting `empty` into the
    /// `|step|` vacated slots.
    ///
    /// A positive step shifts toward higher indices (vacating the front);
    /// a negative step shifts toward lower indices (vacating the back).
    /// `step == 0` is the identity; `|step| == len` yields an all-`empty`
    /// column; `|step| > len` is out of range.
    pub fn lag(&self, step: i64, empty: Value) -> Result<Column> {
        let n = self.len();
        let magnitude = step.unsigned_abs() as usize;
        ensure!(
            magnitude <= n,
            IndexOutOfRangeSnafu {
                index: step,
                len: n,
            }
        );
        let mut values = Vec::with_capacity(n);
        if step >= 0 {
            values.extend(std::iter::repeat_with(|| empty.clone()).take(magnitude));
            values.extend(self.values[..n - magnitude].iter().cloned());
        } else {
            values.extend(self.values[magnitude..].iter().cloned());
            values.extend(std::iter::repeat_with(|| empty.clone()).take(magnitude));
        }
        Ok(Column { values })
    }

    /// Elementwise difference against the column lagged by `step`, with
    /// the sentinel filling the vacated slots.
    pub fn diff(&self, step: i64) -> Result<Column> {
        let lagged = self.lag(step, Value::NAN)?;
        self.subtract(&Operand::Values(lagged.into_values()))
    }

    /// Running left-to-right fold, producing a same-length column of
    /// partial results.
    pub fn cumulative(&self, init: Value, op: BinOp) -> Result<Column> {
        let mut acc = init;
        let mut values = Vec::with_capacity(self.len());
        for v in &self.values {
            acc = apply_binop(op, &acc, v)?;
            values.push(acc.clone());
        }
        Ok(Column { values })
    }

    // ---- ordering ----

    /// Compute the permutation that sorts this column.
    ///
    /// Positions are partitioned into absent (nil or sentinel) and
    /// present; the present partition is sorted stably by natural value
    /// order, reversed when descending, and the absent partition is
    /// concatenated at the front or back per `nils_first`.
    pub fn sort_permutation(&self, options: SortOptions) -> Vec<usize> {
        self.sort_permutation_by(options, Value::compare_present)
    }

    /// Like [`Column::sort_permutation`] with a caller-supplied comparator
    /// for the present partition.
    pub fn sort_permutation_by<F>(&self, options: SortOptions, compare: F) -> Vec<usize>
    where
        F: Fn(&Value, &Value) -> Ordering,
    {
        let (absent, mut present): (Vec<usize>, Vec<usize>) =
            (0..self.len()).partition(|&i| self.values[i].is_absent());
        present.sort_by(|&a, &b| compare(&self.values[a], &self.values[b]));
        if !options.asc {
            present.reverse();
        }
        if options.nils_first {
            absent.into_iter().chain(present).collect()
        } else {
            present.into_iter().chain(absent).collect()
        }
    }

    /// Non-mutating sort: the sort permutation applied via value fetch.
    pub fn sorted(&self, options: SortOptions) -> Column {
        let perm = self.sort_permutation(options);
        Column {
            values: self.values_at(&perm),
        }
    }

    /// Non-mutating sort with a caller-supplied comparator.
    pub fn sorted_by<F>(&self, options: SortOptions, compare: F) -> Column
    where
        F: Fn(&Value, &Value) -> Ordering,
    {
        let perm = self.sort_permutation_by(options, compare);
        Column {
            values: self.values_at(&perm),
        }
    }

    // ---- statistics ----

    /// Sum of present numeric values; `Nil` when none are present.
    ///
    /// An all-integer column sums in integer arithmetic (wrapping, like
    /// the elementwise ops); any float widens the whole sum to float.
    pub fn sum(&self) -> Value {
        let mut int_acc: i64 = 0;
        let mut float_acc: f64 = 0.0;
        let mut all_int = true;
        let mut any = false;
        for v in &self.values {
            if v.is_absent() {
                continue;
            }
            match v {
                Value::Int(i) => {
                    any = true;
                    int_acc = int_acc.wrapping_add(*i);
                    float_acc += *i as f64;
                }
                Value::Float(f) => {
                    any = true;
                    all_int = false;
                    float_acc += f;
                }
                _ => {}
            }
        }
        if !any {
            Value::Nil
        } else if all_int {
            Value::Int(int_acc)
        } else {
            Value::Float(float_acc)
        }
    }

    /// Mean of present numeric values; `Nil` when none are present.
    pub fn mean(&self) -> Value {
        let present: Vec<f64> = self
            .values
            .iter()
            .filter(|v| !v.is_absent())
            .filter_map(Value::as_f64)
            .collect();
        if present.is_empty() {
            Value::Nil
        } else {
            Value::Float(present.iter().sum::<f64>() / present.len() as f64)
        }
    }

    /// Smallest present value by natural order; `Nil` when none.
    pub fn min(&self) -> Value {
        self.values
            .iter()
            .filter(|v| !v.is_absent())
            .min_by(|a, b| a.compare_present(b))
            .cloned()
            .unwrap_or(Value::Nil)
    }

    /// Largest present value by natural order; `Nil` when none.
    pub fn max(&self) -> Value {
        self.values
            .iter()
            .filter(|v| !v.is_absent())
            .max_by(|a, b| a.compare_present(b))
            .cloned()
            .unwrap_or(Value::Nil)
    }

    // ---- position queries used by row-filtering table operations ----

    /// Positions holding a present (non-absent) value.
    pub(crate) fn present_positions(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| !self.values[i].is_absent())
            .collect()
    }

    /// Positions whose value satisfies `predicate`.
    pub(crate) fn positions_where<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(&Value) -> bool,
    {
        (0..self.len())
            .filter(|&i| predicate(&self.values[i]))
            .collect()
    }

    /// Positions of first occurrences, by key form (sentinels collapse).
    pub(crate) fn unique_positions(&self) -> Vec<usize> {
        let mut seen = std::collections::HashSet::new();
        (0..self.len())
            .filter(|&i| seen.insert(self.values[i].key()))
            .collect()
    }
}

impl PartialEq for Column {
    /// Equal iff same length and position-wise raw-equal or both the
    /// numeric sentinel.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.same(b))
    }
}

impl PartialEq<[Value]> for Column {
    fn eq(&self, other: &[Value]) -> bool {
        self.len() == other.len()
            && self.values.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl PartialEq<Vec<Value>> for Column {
    fn eq(&self, other: &Vec<Value>) -> bool {
        self == other.as_slice()
    }
}

impl FromIterator<Value> for Column {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Column::from_values(iter.into_iter().collect())
    }
}
