//! Dynamically-typed field values and the comparison operators constraints use.
//!
//! Facts are declared as ordinary Rust types (see [`crate::fact::Fact`]), but the
//! network has to compare arbitrary named fields across schemas it knows nothing
//! about at compile time. `Value` is the bridge: [`Fact::get`](crate::fact::Fact::get)
//! returns one for any field the client cares to expose.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A field value extracted from a fact.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    /// Apply a comparison operator against another value. Values of mismatched
    /// variants compare as unequal/unordered (`Eq`/`Neq` answer accordingly,
    /// ordering operators return `false`), except `Contains`-style behavior is
    /// not part of this operator set (see [`Op`]).
    pub fn compare(&self, op: Op, other: &Value) -> bool {
        match op {
            Op::Eq => self.partial_cmp_cross(other) == Some(Ordering::Equal),
            Op::Neq => self.partial_cmp_cross(other) != Some(Ordering::Equal),
            Op::Gt => self.partial_cmp_cross(other) == Some(Ordering::Greater),
            Op::Gte => matches!(
                self.partial_cmp_cross(other),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            Op::Lt => self.partial_cmp_cross(other) == Some(Ordering::Less),
            Op::Lte => matches!(
                self.partial_cmp_cross(other),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
        }
    }

    /// Cross-type-aware ordering: same-variant values compare directly; an
    /// `Int`/`Float` pair compares numerically; anything else is incomparable.
    fn partial_cmp_cross(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

// Hash-Beta join keys need `Eq`/`Hash`. `f64` has neither, so we hash/compare
// its bit pattern instead of `PartialEq`'s float semantics — fine for join
// keys, which are never NaN in practice and never compared for ordering here.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Str(v) => v.hash(state),
            Value::Bool(v) => v.hash(state),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
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
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Comparison operators a constraint may use. `Eq` is implicit when a
/// constraint is built from a bare field name rather than an explicit op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}
