use std::fmt;

use serde::{Serialize, Serializer};

/// A decoded column value. SQL NULL has no variant, the column is left out of the row instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f32),
    Double(f64),
    Decimal(f64),

    /// unix seconds, fractional part discarded
    Timestamp(u32),
    /// YYYYMMDDhhmmss
    DateTime(u64),
    /// packed `day | month << 5 | year << 9`
    Date(u32),
    /// [-]hhmmss
    Time(i32),

    /// 1-based element index
    Enum(i32),
    /// element bitmask
    Set(u64),
    Bit(u64),

    String(Vec<u8>),
    Blob(Vec<u8>),
}

impl ColumnValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::SignedInt(v) => Some(*v),
            ColumnValue::UnsignedInt(v) => i64::try_from(*v).ok(),
            ColumnValue::Enum(v) => Some(*v as i64),
            ColumnValue::Time(v) => Some(*v as i64),
            ColumnValue::Timestamp(v) | ColumnValue::Date(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::String(v) | ColumnValue::Blob(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Lossy UTF-8 view of string and blob columns.
    pub fn as_string(&self) -> Option<String> {
        self.as_bytes().map(|b| String::from_utf8_lossy(b).to_string())
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::SignedInt(v) => write!(f, "{}", v),
            ColumnValue::UnsignedInt(v) => write!(f, "{}", v),
            ColumnValue::Float(v) => write!(f, "{}", v),
            ColumnValue::Double(v) | ColumnValue::Decimal(v) => write!(f, "{}", v),
            ColumnValue::Timestamp(v) => write!(f, "{}", v),
            ColumnValue::DateTime(v) => write!(f, "{}", v),
            ColumnValue::Date(v) => write!(f, "{}", v),
            ColumnValue::Time(v) => write!(f, "{}", v),
            ColumnValue::Enum(v) => write!(f, "{}", v),
            ColumnValue::Set(v) | ColumnValue::Bit(v) => write!(f, "{:#x}", v),
            ColumnValue::String(v) | ColumnValue::Blob(v) => {
                write!(f, "{}", String::from_utf8_lossy(v))
            }
        }
    }
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnValue::SignedInt(v) => serializer.serialize_i64(*v),
            ColumnValue::UnsignedInt(v) | ColumnValue::DateTime(v) => serializer.serialize_u64(*v),
            ColumnValue::Set(v) | ColumnValue::Bit(v) => serializer.serialize_u64(*v),
            ColumnValue::Float(v) => serializer.serialize_f32(*v),
            ColumnValue::Double(v) | ColumnValue::Decimal(v) => serializer.serialize_f64(*v),
            ColumnValue::Timestamp(v) | ColumnValue::Date(v) => serializer.serialize_u32(*v),
            ColumnValue::Time(v) | ColumnValue::Enum(v) => serializer.serialize_i32(*v),
            ColumnValue::String(v) => serializer.serialize_str(&String::from_utf8_lossy(v)),
            ColumnValue::Blob(v) => serializer.serialize_str(&hex::encode(v)),
        }
    }
}
