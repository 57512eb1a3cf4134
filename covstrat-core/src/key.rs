//! Stratification values and composite keys.
//!
//! A [`StratificationKey`] is the unit of grouping: the ordered values produced by
//! each configured stratifier, optionally followed by a measure such as the
//! coverage bucket. Keys are plain values, freely cloned and used as map keys.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use crate::consts::{DISABLED_LABEL, UNKNOWN_LABEL};
use crate::errors::{CovStratError, Result};

///
/// One stratification value: an integer bin, a floating point bin, a categorical
/// label, or one of the sentinels used when a dimension is switched off or cannot
/// be evaluated at a position.
///
#[derive(Debug, Clone)]
pub enum Value {
    Disabled,
    Unknown,
    Int(i64),
    Float(f64),
    Label(String),
}

impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::Disabled => 0,
            Value::Unknown => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Label(_) => 4,
        }
    }

    /// Integer view of a numeric value. Floats are truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Label(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Value::Disabled | Value::Unknown)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Disabled, Value::Disabled) | (Value::Unknown, Value::Unknown) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            // bit equality keeps Eq consistent with Hash and with total_cmp
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Label(a), Value::Label(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Disabled | Value::Unknown => {}
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Label(s) => s.hash(state),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Label(a), Value::Label(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Disabled => write!(f, "{}", DISABLED_LABEL),
            Value::Unknown => write!(f, "{}", UNKNOWN_LABEL),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Label(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Label(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Label(value)
    }
}

///
/// An ordered tuple of stratification values.
///
/// Ordering compares arity first and then the values from the last position
/// towards the first, so the trailing value dominates. For keys of one group that
/// differ only in their trailing coverage bucket, descending order walks the
/// buckets from the highest coverage down to zero.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StratificationKey {
    values: Vec<Value>,
}

impl StratificationKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        StratificationKey {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn append<V: Into<Value>>(&mut self, value: V) {
        self.values.push(value.into());
    }

    /// Returns a new key with `value` appended.
    pub fn with<V: Into<Value>>(&self, value: V) -> Self {
        let mut key = StratificationKey::with_capacity(self.values.len() + 1);
        key.values.extend(self.values.iter().cloned());
        key.values.push(value.into());
        key
    }

    /// Returns a new key holding the values of `self` followed by those of `other`.
    pub fn concat(&self, other: &StratificationKey) -> Self {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend(self.values.iter().cloned());
        values.extend(other.values.iter().cloned());
        StratificationKey { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    /// The key formed by the first `n` values. `n` larger than the key is clamped.
    pub fn prefix(&self, n: usize) -> Self {
        let n = n.min(self.values.len());
        StratificationKey {
            values: self.values[..n].to_vec(),
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    ///
    /// Compare two keys of the same arity, last position dominating.
    ///
    /// Keys of different arity are not comparable within one schema and produce an
    /// error.
    ///
    pub fn try_compare(&self, other: &StratificationKey) -> Result<Ordering> {
        if self.len() != other.len() {
            return Err(CovStratError::KeyArity {
                table: "StratificationKey".to_string(),
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(self.cmp_reverse_positional(other))
    }

    fn cmp_reverse_positional(&self, other: &StratificationKey) -> Ordering {
        for (a, b) in self.values.iter().rev().zip(other.values.iter().rev()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl Ord for StratificationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.cmp_reverse_positional(other))
    }
}

impl PartialOrd for StratificationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Vec<Value>> for StratificationKey {
    fn from(values: Vec<Value>) -> Self {
        StratificationKey { values }
    }
}

impl FromIterator<Value> for StratificationKey {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        StratificationKey {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StratificationKey {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl Display for StratificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
