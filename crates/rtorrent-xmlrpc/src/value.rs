//! Dynamically typed XML-RPC values.
//!
//! A [`Value`] is an immutable snapshot of one wire datum. Arguments are built from
//! native Rust types through the `From` impls, and decoded results are interrogated
//! with the `as_*` extractors, which are strict by tag. The single exception is
//! integer extraction from a `String` value: some rTorrent builds send integer
//! fields as decimal text, so [`Value::as_int`] and [`Value::as_long`] parse it.

use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::{Error, Result};

/// The tag of a [`Value`], displayed as its wire element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `<i4>`
    Int,
    /// `<i8>`
    Long,
    /// `<boolean>`
    Bool,
    /// `<string>`
    String,
    /// `<double>`
    Double,
    /// `<dateTime.iso8601>`
    DateTime,
    /// `<base64>`
    Binary,
    /// `<array>`
    Array,
    /// `<struct>`
    Struct,
    /// `<nil/>`
    Nil,
}

impl ValueKind {
    /// The element name used for this kind on the wire.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Int => "i4",
            Self::Long => "i8",
            Self::Bool => "boolean",
            Self::String => "string",
            Self::Double => "double",
            Self::DateTime => "dateTime.iso8601",
            Self::Binary => "base64",
            Self::Array => "array",
            Self::Struct => "struct",
            Self::Nil => "nil",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A calendar timestamp in the compact `YYYYMMDDTHH:MM:SS` form.
///
/// No time zone is carried; the protocol leaves it to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    /// Four digit year.
    pub year: u16,
    /// Month, 1 to 12.
    pub month: u8,
    /// Day of month, 1 to 31.
    pub day: u8,
    /// Hour, 0 to 23.
    pub hour: u8,
    /// Minute, 0 to 59.
    pub minute: u8,
    /// Second, 0 to 60 (leap second allowed).
    pub second: u8,
}

impl DateTime {
    /// Builds a timestamp, rejecting out of range components.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Result<Self> {
        let valid = year <= 9999
            && (1..=12).contains(&month)
            && (1..=31).contains(&day)
            && hour < 24
            && minute < 60
            && second <= 60;
        if !valid {
            return Err(Error::protocol(format!(
                "date/time component out of range: {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            )));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl FromStr for DateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::protocol(format!("invalid dateTime.iso8601 value {s:?}"));
        let b = s.as_bytes();
        if !s.is_ascii() || b.len() != 17 || b[8] != b'T' || b[11] != b':' || b[14] != b':' {
            return Err(invalid());
        }
        let num = |range: std::ops::Range<usize>| -> Result<u16> {
            let digits = &s[range];
            if !digits.bytes().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            digits.parse().map_err(|_| invalid())
        };
        // every component except the year fits two digits, so the casts are lossless
        Self::new(
            num(0..4)?,
            num(4..6)? as u8,
            num(6..8)? as u8,
            num(9..11)? as u8,
            num(12..14)? as u8,
            num(15..17)? as u8,
        )
    }
}

/// A dynamically typed XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed 32-bit integer, the protocol's native number.
    Int(i32),
    /// Signed 64-bit integer, an extension rTorrent uses for byte counts.
    Long(i64),
    /// Boolean, `0` or `1` on the wire.
    Bool(bool),
    /// UTF-8 text.
    String(String),
    /// IEEE-754 double.
    Double(f64),
    /// Calendar timestamp.
    DateTime(DateTime),
    /// Raw bytes, base64 on the wire.
    Binary(Vec<u8>),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Named members; member order carries no meaning.
    Struct(BTreeMap<String, Value>),
    /// Explicit absence.
    Nil,
}

impl Value {
    /// Returns the tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Bool(_) => ValueKind::Bool,
            Self::String(_) => ValueKind::String,
            Self::Double(_) => ValueKind::Double,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Binary(_) => ValueKind::Binary,
            Self::Array(_) => ValueKind::Array,
            Self::Struct(_) => ValueKind::Struct,
            Self::Nil => ValueKind::Nil,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }

    /// Returns `true` for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Extracts a 32-bit integer.
    ///
    /// A `String` holding base-10 digits is parsed; this is the only coercion
    /// the extractors perform.
    pub fn as_int(&self) -> Result<i32> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::String(s) => s.trim().parse().map_err(|_| self.mismatch(ValueKind::Int)),
            _ => Err(self.mismatch(ValueKind::Int)),
        }
    }

    /// Extracts a 64-bit integer from `Int`, `Long`, or a decimal `String`.
    pub fn as_long(&self) -> Result<i64> {
        match self {
            Self::Int(v) => Ok(i64::from(*v)),
            Self::Long(v) => Ok(*v),
            Self::String(s) => s.trim().parse().map_err(|_| self.mismatch(ValueKind::Long)),
            _ => Err(self.mismatch(ValueKind::Long)),
        }
    }

    /// Extracts text.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(self.mismatch(ValueKind::String)),
        }
    }

    /// Extracts a boolean.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(self.mismatch(ValueKind::Bool)),
        }
    }

    /// Extracts a double.
    pub fn as_double(&self) -> Result<f64> {
        match self {
            Self::Double(d) => Ok(*d),
            _ => Err(self.mismatch(ValueKind::Double)),
        }
    }

    /// Extracts a timestamp.
    pub fn as_datetime(&self) -> Result<&DateTime> {
        match self {
            Self::DateTime(dt) => Ok(dt),
            _ => Err(self.mismatch(ValueKind::DateTime)),
        }
    }

    /// Extracts raw bytes.
    pub fn as_binary(&self) -> Result<&[u8]> {
        match self {
            Self::Binary(b) => Ok(b),
            _ => Err(self.mismatch(ValueKind::Binary)),
        }
    }

    /// Extracts the elements of an array.
    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Self::Array(items) => Ok(items),
            _ => Err(self.mismatch(ValueKind::Array)),
        }
    }

    /// Extracts the members of a struct.
    pub fn as_struct(&self) -> Result<&BTreeMap<String, Value>> {
        match self {
            Self::Struct(members) => Ok(members),
            _ => Err(self.mismatch(ValueKind::Struct)),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Binary(v.to_vec())
    }
}

impl From<DateTime> for Value {
    fn from(v: DateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Self::Struct(v)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}
