//! Per-element temporal value sets.
//!
//! Every graph element may carry one sparse association from timestamp slot
//! to value. All value types share the sorted-array core in [`set`]; the
//! typed aliases pin the element type, and [`TimestampValues`] wraps them in a
//! tagged variant for callers that only know the value type at runtime.

mod set;

pub use set::TimestampValueSet;

use crate::error::{Result, TimegraphError};
use crate::timestamp::SlotId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value types a temporal value set can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Char,
    String,
}

/// A single dynamically typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TemporalValue {
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(String),
}

impl TemporalValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            TemporalValue::Byte(_) => ValueType::Byte,
            TemporalValue::Short(_) => ValueType::Short,
            TemporalValue::Integer(_) => ValueType::Integer,
            TemporalValue::Long(_) => ValueType::Long,
            TemporalValue::Float(_) => ValueType::Float,
            TemporalValue::Double(_) => ValueType::Double,
            TemporalValue::Boolean(_) => ValueType::Boolean,
            TemporalValue::Char(_) => ValueType::Char,
            TemporalValue::String(_) => ValueType::String,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Byte => "byte",
            ValueType::Short => "short",
            ValueType::Integer => "integer",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
            ValueType::Char => "char",
            ValueType::String => "string",
        };
        f.write_str(name)
    }
}

/// A value type storable in a [`TimestampValueSet`].
pub trait SlotValue: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: ValueType;

    fn into_value(self) -> TemporalValue;

    /// Unwrap a dynamic value of the matching variant, handing it back otherwise.
    fn from_value(value: TemporalValue) -> std::result::Result<Self, TemporalValue>;
}

macro_rules! slot_value {
    ($ty:ty, $variant:ident) => {
        impl SlotValue for $ty {
            const TYPE: ValueType = ValueType::$variant;

            #[inline]
            fn into_value(self) -> TemporalValue {
                TemporalValue::$variant(self)
            }

            #[inline]
            fn from_value(value: TemporalValue) -> std::result::Result<Self, TemporalValue> {
                match value {
                    TemporalValue::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

slot_value!(i8, Byte);
slot_value!(i16, Short);
slot_value!(i32, Integer);
slot_value!(i64, Long);
slot_value!(f32, Float);
slot_value!(f64, Double);
slot_value!(bool, Boolean);
slot_value!(char, Char);
slot_value!(String, String);

pub type TimestampByteSet = TimestampValueSet<i8>;
pub type TimestampShortSet = TimestampValueSet<i16>;
pub type TimestampIntegerSet = TimestampValueSet<i32>;
pub type TimestampLongSet = TimestampValueSet<i64>;
pub type TimestampFloatSet = TimestampValueSet<f32>;
pub type TimestampDoubleSet = TimestampValueSet<f64>;
pub type TimestampBooleanSet = TimestampValueSet<bool>;
pub type TimestampCharSet = TimestampValueSet<char>;
pub type TimestampStringSet = TimestampValueSet<String>;

/// Tagged temporal value set whose element type is chosen at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampValues {
    Byte(TimestampByteSet),
    Short(TimestampShortSet),
    Integer(TimestampIntegerSet),
    Long(TimestampLongSet),
    Float(TimestampFloatSet),
    Double(TimestampDoubleSet),
    Boolean(TimestampBooleanSet),
    Char(TimestampCharSet),
    String(TimestampStringSet),
}

macro_rules! dispatch {
    ($values:expr, $set:ident => $body:expr) => {
        match $values {
            TimestampValues::Byte($set) => $body,
            TimestampValues::Short($set) => $body,
            TimestampValues::Integer($set) => $body,
            TimestampValues::Long($set) => $body,
            TimestampValues::Float($set) => $body,
            TimestampValues::Double($set) => $body,
            TimestampValues::Boolean($set) => $body,
            TimestampValues::Char($set) => $body,
            TimestampValues::String($set) => $body,
        }
    };
}

fn put_typed<V: SlotValue>(
    set: &mut TimestampValueSet<V>,
    slot: SlotId,
    value: TemporalValue,
) -> Result<Option<TemporalValue>> {
    let value = V::from_value(value).map_err(|other| {
        TimegraphError::invalid(format!(
            "expected a {} value, got {}",
            V::TYPE,
            other.value_type()
        ))
    })?;
    Ok(set.put(slot, value).map(SlotValue::into_value))
}

impl TimestampValues {
    /// Create an empty, zero-capacity set for `value_type`.
    pub fn new(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Byte => Self::Byte(TimestampValueSet::new()),
            ValueType::Short => Self::Short(TimestampValueSet::new()),
            ValueType::Integer => Self::Integer(TimestampValueSet::new()),
            ValueType::Long => Self::Long(TimestampValueSet::new()),
            ValueType::Float => Self::Float(TimestampValueSet::new()),
            ValueType::Double => Self::Double(TimestampValueSet::new()),
            ValueType::Boolean => Self::Boolean(TimestampValueSet::new()),
            ValueType::Char => Self::Char(TimestampValueSet::new()),
            ValueType::String => Self::String(TimestampValueSet::new()),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Byte(_) => ValueType::Byte,
            Self::Short(_) => ValueType::Short,
            Self::Integer(_) => ValueType::Integer,
            Self::Long(_) => ValueType::Long,
            Self::Float(_) => ValueType::Float,
            Self::Double(_) => ValueType::Double,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Char(_) => ValueType::Char,
            Self::String(_) => ValueType::String,
        }
    }

    /// Insert or overwrite the value at `slot`.
    ///
    /// An absent value or one whose type differs from the set's fails with
    /// `InvalidArgument` and leaves the set untouched.
    pub fn put(
        &mut self,
        slot: SlotId,
        value: Option<TemporalValue>,
    ) -> Result<Option<TemporalValue>> {
        let value = value.ok_or_else(|| {
            TimegraphError::invalid(format!("can't store an absent value at slot {slot}"))
        })?;
        dispatch!(self, set => put_typed(set, slot, value))
    }

    pub fn remove(&mut self, slot: SlotId) -> Option<TemporalValue> {
        dispatch!(self, set => set.remove(slot).map(SlotValue::into_value))
    }

    pub fn get(&self, slot: SlotId) -> Result<TemporalValue> {
        dispatch!(self, set => set.get(slot).map(SlotValue::into_value))
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        dispatch!(self, set => set.contains(slot))
    }

    pub fn len(&self) -> usize {
        dispatch!(self, set => set.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, set => set.is_empty())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, set => set.capacity())
    }

    pub fn slots(&self) -> &[SlotId] {
        dispatch!(self, set => set.slots())
    }

    pub fn timestamps(&self) -> Vec<SlotId> {
        self.slots().to_vec()
    }

    pub fn to_vec(&self) -> Vec<TemporalValue> {
        dispatch!(self, set => set.to_vec().into_iter().map(SlotValue::into_value).collect())
    }

    pub fn clear(&mut self) {
        dispatch!(self, set => set.clear())
    }
}
