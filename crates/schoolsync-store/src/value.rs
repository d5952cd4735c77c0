//! Field values: the closed set of shapes a stored document field can take.
//!
//! Documents written by older app versions carry loosely-typed fields. The
//! normalizers never probe raw JSON; they match on `FieldValue` instead.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// JSON key marking a structured timestamp on disk: `{"$timestamp": "<rfc3339>"}`.
pub const TIMESTAMP_TAG: &str = "$timestamp";

/// Stored fields of one document, keyed by field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// A structured point in time with nanosecond precision.
///
/// The offset it was written with is kept so untouched documents render
/// back unchanged; equality and ordering compare instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Build from raw epoch seconds and sub-second nanoseconds.
    ///
    /// Returns `None` when `nanos` is not below one second or the instant
    /// falls outside the representable range.
    pub fn from_parts(seconds: i64, nanos: u32) -> Option<Self> {
        if nanos >= 1_000_000_000 {
            return None;
        }
        DateTime::from_timestamp(seconds, nanos).map(Self::from_datetime)
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.into())
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn parse_rfc3339(input: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(input).ok().map(Self)
    }

    pub fn seconds(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn nanos(&self) -> u32 {
        self.0.timestamp_subsec_nanos()
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// One stored field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(Timestamp),
    Array(Vec<FieldValue>),
    Map(Fields),
}

impl FieldValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Whether the value counts as "not there" for repair rules.
    ///
    /// Null, `false`, zero, NaN and the empty string are blank, matching how
    /// the app itself tests for a missing field.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Integer(n) => *n == 0,
            Self::Double(n) => *n == 0.0 || n.is_nan(),
            Self::String(s) => s.is_empty(),
            Self::Timestamp(_) | Self::Array(_) | Self::Map(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Numeric view used when reading raw `_seconds` style counters.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Human string form of a value.
    ///
    /// Integral doubles print without a fraction; arrays and maps print as
    /// compact JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Double(n) => format_double(*n),
            Self::String(s) => s.clone(),
            Self::Timestamp(ts) => ts.to_rfc3339(),
            Self::Array(_) | Self::Map(_) => Value::from(self.clone()).to_string(),
        }
    }
}

/// Whether an optional field is blank; a missing field is blank.
pub fn field_is_blank(value: Option<&FieldValue>) -> bool {
    value.is_none_or(FieldValue::is_blank)
}

fn format_double(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{n:.0}");
    }
    n.to_string()
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

/// Stored integers are 64-bit signed; anything wider is rejected rather
/// than silently widened to a double.
impl TryFrom<Value> for FieldValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if n.is_u64() {
                    return Err(format!("integer {n} is outside the 64-bit signed range"));
                } else {
                    Self::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                if map.len() == 1
                    && let Some(Value::String(raw)) = map.get(TIMESTAMP_TAG)
                    && let Some(ts) = Timestamp::parse_rfc3339(raw)
                {
                    return Ok(Self::Timestamp(ts));
                }
                Self::Map(
                    map.into_iter()
                        .map(|(k, v)| Self::try_from(v).map(|v| (k, v)))
                        .collect::<Result<_, _>>()?,
                )
            }
        })
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Integer(n) => Value::Number(n.into()),
            FieldValue::Double(n) => Number::from_f64(n).map_or(Value::Null, Value::Number),
            FieldValue::String(s) => Value::String(s),
            FieldValue::Timestamp(ts) => {
                let mut tagged = JsonMap::new();
                tagged.insert(TIMESTAMP_TAG.to_string(), Value::String(ts.to_rfc3339()));
                Value::Object(tagged)
            }
            FieldValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            FieldValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
