//! Owned value model for MessagePack data.
//!
//! A [`Value`] is a closed sum over the wire types. Values are immutable
//! trees: containers own their elements, so a decoded value can be shared
//! across threads without synchronization.
//!
//! ```
//! use mpack::{Map, Value};
//!
//! let mut map = Map::new();
//! map.insert(Value::from("compact"), Value::from(true));
//! map.insert(Value::from("schema"), Value::from(0));
//! let value = Value::from(map);
//!
//! assert_eq!(value.as_map().map(|m| m.len()), Some(2));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::tag::ValueType;

/// Associative container used for map values.
///
/// Keys iterate in ascending [`Value`] order, so packing a map is
/// deterministic.
pub type Map = BTreeMap<Value, Value>;

/// Width a float was sourced from and is packed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    F32,
    F64,
}

/// A floating point value tagged with its wire precision.
///
/// The value is held at 64-bit fidelity. Equality, ordering and hashing
/// compare the precision first and then the exact bit pattern, so `NaN`
/// equals itself and `0.0` differs from `-0.0`.
#[derive(Clone, Copy)]
pub struct Float {
    value: f64,
    precision: Precision,
}

impl Float {
    /// Create a 32-bit float.
    #[inline]
    #[must_use]
    pub fn f32(value: f32) -> Self {
        Self {
            value: f64::from(value),
            precision: Precision::F32,
        }
    }

    /// Create a 64-bit float.
    #[inline]
    #[must_use]
    pub fn f64(value: f64) -> Self {
        Self {
            value,
            precision: Precision::F64,
        }
    }

    /// Get the value at 64-bit fidelity.
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.value
    }

    /// Get the wire precision.
    #[inline]
    #[must_use]
    pub fn precision(self) -> Precision {
        self.precision
    }
}

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Float {}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precision
            .cmp(&other.precision)
            .then_with(|| self.value.total_cmp(&other.value))
    }
}

impl Hash for Float {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.precision.hash(state);
        self.value.to_bits().hash(state);
    }
}

impl fmt::Debug for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Precision::F32 => write!(f, "{:?}f32", self.value as f32),
            Precision::F64 => write!(f, "{:?}f64", self.value),
        }
    }
}

/// A decoded or to-be-encoded MessagePack value.
///
/// Variant order defines the cross-type ordering used for map keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// Nil (null) value.
    #[default]
    Nil,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer, whatever width it used on the wire.
    Int(i64),
    /// Float with its precision tag.
    Float(Float),
    /// UTF-8 string.
    Str(String),
    /// Raw binary data.
    Bin(Vec<u8>),
    /// Ordered, possibly heterogeneous sequence.
    Array(Vec<Value>),
    /// Mapping with unique keys.
    Map(Map),
}

impl Value {
    /// The nil value.
    #[inline]
    #[must_use]
    pub const fn nil() -> Self {
        Value::Nil
    }

    /// Wire type family of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::Str,
            Value::Bin(_) => ValueType::Bin,
            Value::Array(_) => ValueType::Array,
            Value::Map(_) => ValueType::Map,
        }
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float payload at 64-bit fidelity, regardless of precision.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.value()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<Float> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bin(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(Float::f32(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(Float::f64(f))
    }
}

impl From<Float> for Value {
    fn from(f: Float) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bin(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bin(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(Value, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().collect())
    }
}
