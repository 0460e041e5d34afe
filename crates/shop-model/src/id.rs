//! Record identifiers
//!
//! Backends disagree on how identifiers are spelled:
//! - JSON numbers (`5`, `150`)
//! - numeric strings (`"5"`)
//! - prefixed sequence strings for seed orders (`"ORD-00042"`)
//! - opaque strings for live orders
//!
//! [`RecordId`] canonicalizes the first two so that `5` and `"5"` compare
//! equal during merge, and keeps everything else as text.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Prefix used by seed order identifiers
pub const ORDER_PREFIX: &str = "ORD-";

/// Canonical record identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "RawId")]
pub enum RecordId {
    /// Integer identifier (also produced from integer strings)
    Numeric(i64),
    /// Any other non-empty string identifier
    Text(String),
}

impl RecordId {
    /// Canonicalize an identifier from a raw JSON value
    ///
    /// Returns `None` for null, booleans, containers, empty strings and
    /// non-integral numbers.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Numeric(i))
                } else {
                    integral(n.as_f64()?).map(Self::Numeric)
                }
            }
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.parse::<i64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Text(trimmed.to_string()),
        })
    }

    /// Numeric sequence carried by this identifier, if any
    ///
    /// Numeric ids return themselves. Text ids drop an optional `ORD-`
    /// prefix (any case) and read the leading integer of what remains, so
    /// `ORD-00042x` carries 42 and `LX3K` carries none.
    #[must_use]
    pub fn sequence(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(text) => {
                let rest = match text.get(..ORDER_PREFIX.len()) {
                    Some(head) if head.eq_ignore_ascii_case(ORDER_PREFIX) => {
                        &text[ORDER_PREFIX.len()..]
                    }
                    _ => text.as_str(),
                };
                leading_integer(rest)
            }
        }
    }

    /// Seed order identifier for a sequence number (`ORD-00042`)
    #[inline]
    #[must_use]
    pub fn seed_order(sequence: u32) -> Self {
        Self::Text(format!("{ORDER_PREFIX}{sequence:05}"))
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let end = text.len() - unsigned.len() + digits;
    text[..end].parse().ok()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        Self::Numeric(i64::from(value))
    }
}

impl From<u32> for RecordId {
    fn from(value: u32) -> Self {
        Self::Numeric(i64::from(value))
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(InvalidRecordId)
    }
}

/// Error returned when parsing an empty identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("record id must not be empty")]
pub struct InvalidRecordId;

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(n) => serializer.serialize_i64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawId> for RecordId {
    type Error = String;

    fn try_from(raw: RawId) -> Result<Self, Self::Error> {
        match raw {
            RawId::Int(n) => Ok(Self::Numeric(n)),
            RawId::Float(f) => integral(f)
                .map(Self::Numeric)
                .ok_or_else(|| format!("non-integral record id {f}")),
            RawId::Text(s) => Self::parse(&s).ok_or_else(|| "empty record id".to_string()),
        }
    }
}
