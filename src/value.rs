//! Typed values produced by the leaf type parsers

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;

/// A parsed scalar, decimal or enum value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Float(f32),
    Double(f64),
    Date(NaiveDate),
    /// UTC instant, truncated to the precision of its type
    DateTime(DateTime<Utc>),
    /// Time of day, truncated to the precision of its type
    Time(NaiveTime),
    String(String),
    Bytes(Vec<u8>),
    Int(i32),
    Long(i64),
    /// Exact decimal carrying exactly the scale of its type
    Decimal(BigDecimal),
    /// An enum symbol
    Symbol(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Float(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Time(t) => write!(f, "{}", t),
            Value::String(s) | Value::Symbol(s) => write!(f, "{}", s),
            Value::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Decimal(d) => write!(f, "{}", d),
        }
    }
}
