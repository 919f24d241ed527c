//! Scalar values stored in table cells.
//!
//! Two distinct "no value" notions coexist:
//!
//! - [`Value::Nil`] is the generic absence marker used by non-numeric
//!   columns.
//! - `Value::Float(f64::NAN)` is the numeric sentinel used by numeric
//!   columns in place of an absence marker.
//!
//! Every non-numeric value answers [`Value::is_nan`] with `false`; only the
//! numeric sentinel answers `true`. This distinction matters for equality,
//! compaction, and sort placement: raw equality (`PartialEq`) follows IEEE
//! semantics where `NaN != NaN`, while column equality ([`Value::same`])
//! treats two sentinels as equal.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidArgumentSnafu, Result};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// The generic absence marker.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision float; `NAN` is the numeric sentinel.
    Float(f64),
    /// An owned string.
    Str(String),
}

impl Value {
    /// The numeric not-a-number sentinel.
    pub const NAN: Value = Value::Float(f64::NAN);

    /// True iff this is the generic absence marker.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// True iff this is the numeric sentinel. Always `false` for
    /// non-numeric values, including `Nil`.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    /// True iff this value is absent in either representation
    /// (`Nil` or the numeric sentinel).
    pub fn is_absent(&self) -> bool {
        self.is_nil() || self.is_nan()
    }

    /// True for `Int` and `Float` values (the sentinel included).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric view of this value, `None` for non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Column equality: raw-equal, or both the numeric sentinel.
    pub fn same(&self, other: &Value) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    }

    /// Hashable form of this value for group-by / join key tuples.
    ///
    /// Float bits are used directly, with all NaN payloads collapsed into
    /// one canonical key and `-0.0` folded into `0.0` so keys that compare
    /// equal group together.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Nil => ValueKey::Nil,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Int(i) => ValueKey::Int(*i),
            Value::Float(f) => {
                let canonical = if f.is_nan() {
                    f64::NAN
                } else if *f == 0.0 {
                    0.0
                } else {
                    *f
                };
                ValueKey::Float(canonical.to_bits())
            }
            Value::Str(s) => ValueKey::Str(s.clone()),
        }
    }

    /// Total order over *present* values, used by sort after the absent
    /// partition has been split off. Mixed types order by kind first
    /// (bools, then numbers, then strings), then by natural value order.
    pub fn compare_present(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Nil => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Float(_) => 2,
                Value::Str(_) => 3,
            }
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                // Present numerics are never NaN, so partial_cmp is total.
                let x = a.as_f64().unwrap_or(f64::NAN);
                let y = b.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, ""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_nan() => write!(f, "NaN"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Nil,
        }
    }
}

/// Hashable, `Eq` form of a [`Value`], produced by [`Value::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    /// Key form of the absence marker.
    Nil,
    /// Key form of a boolean.
    Bool(bool),
    /// Key form of an integer.
    Int(i64),
    /// Key form of a float, as canonicalized bits.
    Float(u64),
    /// Key form of a string.
    Str(String),
}

/// Elementwise binary operations supported by column algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Elementwise `+`.
    Add,
    /// Elementwise `-`.
    Subtract,
    /// Elementwise `*`.
    Multiply,
    /// Elementwise `/`.
    Divide,
    /// Elementwise exponentiation.
    Power,
    /// Elementwise remainder.
    Modulo,
}

/// Apply `op` to a pair of scalars.
///
/// Rules:
///
/// - Any absent operand (`Nil` or the sentinel) propagates the sentinel
///   instead of raising.
/// - Two `Int` operands stay in integer arithmetic: division and modulo
///   are Euclidean, and division/modulo by literal zero is an error.
/// - Any `Float` operand switches to IEEE float arithmetic, where
///   division by zero yields an infinity rather than an error.
/// - Non-numeric present operands are an error.
pub fn apply_binop(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    if lhs.is_absent() || rhs.is_absent() {
        return Ok(Value::NAN);
    }
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_binop(op, *a, *b),
        (a, b) if a.is_numeric() && b.is_numeric() => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            Ok(Value::Float(float_binop(op, x, y)))
        }
        (a, b) => InvalidArgumentSnafu {
            message: format!("non-numeric operand for {op:?}: {a:?} and {b:?}"),
        }
        .fail(),
    }
}

fn int_binop(op: BinOp, a: i64, b: i64) -> Result<Value> {
    match op {
        BinOp::Add => Ok(Value::Int(a.wrapping_add(b))),
        BinOp::Subtract => Ok(Value::Int(a.wrapping_sub(b))),
        BinOp::Multiply => Ok(Value::Int(a.wrapping_mul(b))),
        BinOp::Divide => {
            if b == 0 {
                InvalidArgumentSnafu {
                    message: "integer division by zero".to_string(),
                }
                .fail()
            } else {
                Ok(Value::Int(a.div_euclid(b)))
            }
        }
        BinOp::Modulo => {
            if b == 0 {
                InvalidArgumentSnafu {
                    message: "integer modulo by zero".to_string(),
                }
                .fail()
            } else {
                Ok(Value::Int(a.rem_euclid(b)))
            }
        }
        BinOp::Power => {
            if b >= 0 {
                match u32::try_from(b).ok().and_then(|e| a.checked_pow(e)) {
                    Some(v) => Ok(Value::Int(v)),
                    None => Ok(Value::Float((a as f64).powf(b as f64))),
                }
            } else {
                Ok(Value::Float((a as f64).powi(b as i32)))
            }
        }
    }
}

fn float_binop(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => a / b,
        BinOp::Modulo => a % b,
        BinOp::Power => a.powf(b),
    }
}
