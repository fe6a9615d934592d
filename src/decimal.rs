//! Decimal type: integers of a given bit width, or exact scaled decimals
//!
//! Integer decimals (scale 0) are backed by `i32` or `i64` when their bit width
//! allows it, and by an arbitrary precision decimal otherwise. Fractional
//! decimals always use an arbitrary precision decimal with exactly `scale`
//! fractional digits. Parsing never rounds: a literal that does not fit is an
//! error.

use bigdecimal::{BigDecimal, Zero};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::{Result, SchemaError};
use crate::value::Value;

/// How parsed values of a decimal type are represented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Int32,
    Int64,
    Arbitrary,
}

/// A numeric type with a fixed precision and scale
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecimalType {
    precision: u32,
    scale: u32,
    /// Required bit width; only integer types have one
    bits: Option<u32>,
}

impl DecimalType {
    /// Number of decimal digits of `i32::MAX`
    pub const INT_PRECISION: u32 = i32::MAX.ilog10() + 1;
    /// Number of decimal digits of `i64::MAX`
    pub const LONG_PRECISION: u32 = i64::MAX.ilog10() + 1;

    /// Integer type (scale 0) needing `required_bits` bits
    pub fn integer(required_bits: u32, precision: u32) -> Result<Self> {
        if required_bits == 0 {
            return Err(SchemaError::InvalidConstruction(
                "an integer type needs a positive number of bits".to_string(),
            ));
        }
        Self::validate(precision, 0)?;
        Ok(Self {
            precision,
            scale: 0,
            bits: Some(required_bits),
        })
    }

    /// Decimal type with `scale` (> 0) fractional digits
    pub fn with_fraction(precision: u32, scale: u32) -> Result<Self> {
        if scale == 0 {
            return Err(SchemaError::InvalidConstruction(
                "a fractional decimal needs a positive scale".to_string(),
            ));
        }
        Self::validate(precision, scale)?;
        Ok(Self {
            precision,
            scale,
            bits: None,
        })
    }

    /// Decimal type for a precision and scale; scale 0 yields an integer type
    /// wide enough for `precision` digits
    pub fn new(precision: u32, scale: u32) -> Result<Self> {
        if scale == 0 {
            Self::validate(precision, scale)?;
            Self::integer(Self::bits_for_precision(precision), precision)
        } else {
            Self::with_fraction(precision, scale)
        }
    }

    /// The 32-bit integer type
    pub fn int() -> Self {
        Self {
            precision: Self::INT_PRECISION,
            scale: 0,
            bits: Some(32),
        }
    }

    /// The 64-bit integer type
    pub fn long() -> Self {
        Self {
            precision: Self::LONG_PRECISION,
            scale: 0,
            bits: Some(64),
        }
    }

    /// Bits needed to hold any number of `precision` decimal digits: `ceil(precision * log2(10))`
    pub fn bits_for_precision(precision: u32) -> u32 {
        (f64::from(precision) * std::f64::consts::LOG2_10).ceil() as u32
    }

    fn validate(precision: u32, scale: u32) -> Result<()> {
        if precision == 0 {
            return Err(SchemaError::InvalidConstruction(
                "decimal precision must be positive".to_string(),
            ));
        }
        if scale > precision {
            return Err(SchemaError::InvalidConstruction(format!(
                "decimal scale {} exceeds precision {}",
                scale, precision
            )));
        }
        Ok(())
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Bit width of integer types, `None` for fractional types
    pub fn bit_width(&self) -> Option<u32> {
        self.bits
    }

    pub fn representation(&self) -> Representation {
        match self.bits {
            Some(bits) if bits <= 32 => Representation::Int32,
            Some(bits) if bits <= 64 => Representation::Int64,
            _ => Representation::Arbitrary,
        }
    }

    /// Parse a textual number. Absent input yields no value.
    pub fn parse(&self, input: Option<&str>) -> Result<Option<Value>> {
        let Some(text) = input else {
            return Ok(None);
        };
        let value = match self.representation() {
            Representation::Int32 => {
                let number = text.parse::<i32>().map_err(|e| self.integer_error(text, e))?;
                self.check_digits(text, u64::from(number.unsigned_abs().checked_ilog10().unwrap_or(0)) + 1)?;
                Value::Int(number)
            }
            Representation::Int64 => {
                let number = text.parse::<i64>().map_err(|e| self.integer_error(text, e))?;
                self.check_digits(text, u64::from(number.unsigned_abs().checked_ilog10().unwrap_or(0)) + 1)?;
                Value::Long(number)
            }
            Representation::Arbitrary => Value::Decimal(self.parse_exact(text)?),
        };
        Ok(Some(value))
    }

    fn parse_exact(&self, text: &str) -> Result<BigDecimal> {
        let number = BigDecimal::from_str(text).map_err(|e| SchemaError::syntax(self, text, e))?;
        if number.is_zero() {
            return Ok(BigDecimal::zero().with_scale(i64::from(self.scale)));
        }

        // Reject from the digit counts before rescaling to the exponent
        let (_, exponent) = number.as_bigint_and_exponent();
        let digits = i64::try_from(number.digits()).unwrap_or(i64::MAX);
        let integer_digits = digits.saturating_sub(exponent);
        if integer_digits > i64::from(self.precision - self.scale) {
            return Err(SchemaError::precision(
                self,
                text,
                format!("more than {} integer digits", self.precision - self.scale),
            ));
        }
        // A non-zero mantissa has fewer trailing zeros than digits
        if exponent.saturating_sub(i64::from(self.scale)) >= digits {
            return Err(SchemaError::precision(
                self,
                text,
                format!("more than {} fractional digits", self.scale),
            ));
        }

        let scaled = number.with_scale(i64::from(self.scale));
        if scaled != number {
            return Err(SchemaError::precision(
                self,
                text,
                format!("more than {} fractional digits", self.scale),
            ));
        }
        self.check_digits(text, scaled.digits())?;
        Ok(scaled)
    }

    fn check_digits(&self, text: &str, digits: u64) -> Result<()> {
        if digits > u64::from(self.precision) {
            return Err(SchemaError::precision(
                self,
                text,
                format!("{} significant digits exceed precision {}", digits, self.precision),
            ));
        }
        Ok(())
    }

    fn integer_error(&self, text: &str, error: std::num::ParseIntError) -> SchemaError {
        match error.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                SchemaError::precision(self, text, error)
            }
            _ => SchemaError::syntax(self, text, error),
        }
    }
}

impl fmt::Display for DecimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bits {
            Some(bits) => write!(f, "decimal({}; {} bits)", self.precision, bits),
            None => write!(f, "decimal({},{})", self.precision, self.scale),
        }
    }
}
