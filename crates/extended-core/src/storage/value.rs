//! Typed values held by a settings store.

use std::fmt;

/// Discriminant of a [`StoredValue`], also its tag byte in the value codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
    Bool = 0x01,
    Int = 0x02,
    Long = 0x03,
    Float = 0x04,
    String = 0x05,
    LongArray = 0x06,
}

impl ValueKind {
    /// Converts a raw tag byte to a `ValueKind`, returning `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Bool),
            0x02 => Some(Self::Int),
            0x03 => Some(Self::Long),
            0x04 => Some(Self::Float),
            0x05 => Some(Self::String),
            0x06 => Some(Self::LongArray),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::String => "string",
            Self::LongArray => "long array",
        };
        f.write_str(name)
    }
}

/// A value stored under a key.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    String(String),
    LongArray(Vec<i64>),
}

impl StoredValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::LongArray(_) => ValueKind::LongArray,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_long_array(self) -> Option<Vec<i64>> {
        match self {
            Self::LongArray(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for StoredValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for StoredValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for StoredValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for StoredValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<String> for StoredValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for StoredValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<i64>> for StoredValue {
    fn from(v: Vec<i64>) -> Self {
        Self::LongArray(v)
    }
}
