//! Scalar kinds: the fixed set of primitive leaf types

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SchemaError};
use crate::value::Value;

/// Primitive leaf type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Boolean,
    Float,
    Double,
    String,
    /// Binary data, written as hexadecimal text
    BinaryHex,
    /// Binary data, written as base64 text
    BinaryBase64,
    Date,
    /// Timestamp with millisecond precision
    DateTime,
    /// Timestamp with microsecond precision
    DateTimeMicros,
    /// Time of day with millisecond precision
    Time,
    /// Time of day with microsecond precision
    TimeMicros,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::Boolean,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::String,
        ScalarKind::BinaryHex,
        ScalarKind::BinaryBase64,
        ScalarKind::Date,
        ScalarKind::DateTime,
        ScalarKind::DateTimeMicros,
        ScalarKind::Time,
        ScalarKind::TimeMicros,
    ];

    /// Name used when rendering types
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
            ScalarKind::BinaryHex => "binary_hex",
            ScalarKind::BinaryBase64 => "binary_base64",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
            ScalarKind::DateTimeMicros => "datetime_micros",
            ScalarKind::Time => "time",
            ScalarKind::TimeMicros => "time_micros",
        }
    }

    /// Parse a textual value. Absent input yields no value for every kind.
    pub fn parse(&self, input: Option<&str>) -> Result<Option<Value>> {
        match input {
            None => Ok(None),
            Some(text) => self.parse_text(text).map(Some),
        }
    }

    fn parse_text(&self, text: &str) -> Result<Value> {
        let value = match self {
            ScalarKind::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                _ => return Err(SchemaError::syntax(self, text, "expected 'true' or 'false'")),
            },
            ScalarKind::Float => Value::Float(
                text.parse::<f32>()
                    .map_err(|e| SchemaError::syntax(self, text, e))?,
            ),
            ScalarKind::Double => Value::Double(
                text.parse::<f64>()
                    .map_err(|e| SchemaError::syntax(self, text, e))?,
            ),
            ScalarKind::String => Value::String(text.to_string()),
            ScalarKind::BinaryHex => {
                Value::Bytes(hex::decode(text).map_err(|e| SchemaError::syntax(self, text, e))?)
            }
            ScalarKind::BinaryBase64 => Value::Bytes(
                STANDARD
                    .decode(text)
                    .map_err(|e| SchemaError::syntax(self, text, e))?,
            ),
            ScalarKind::Date => Value::Date(
                text.parse::<NaiveDate>()
                    .map_err(|e| SchemaError::syntax(self, text, e))?,
            ),
            ScalarKind::DateTime => Value::DateTime(self.parse_instant(text)?.trunc_subsecs(3)),
            ScalarKind::DateTimeMicros => {
                Value::DateTime(self.parse_instant(text)?.trunc_subsecs(6))
            }
            ScalarKind::Time => Value::Time(self.parse_time(text)?.trunc_subsecs(3)),
            ScalarKind::TimeMicros => Value::Time(self.parse_time(text)?.trunc_subsecs(6)),
        };
        Ok(value)
    }

    /// ISO-8601 timestamp with a mandatory offset, normalized to UTC
    fn parse_instant(&self, text: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SchemaError::syntax(self, text, e))
    }

    fn parse_time(&self, text: &str) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
            .map_err(|e| SchemaError::syntax(self, text, e))
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
