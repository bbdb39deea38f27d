//! Scalar values stored in leaves and used as list keys.
//!
//! Values are the wire-neutral scalar representation of YANG leaf data:
//! strings, signed and unsigned integers, booleans, enumeration names,
//! fixed-point decimals, opaque binary, the `empty` marker, and lists of
//! scalars for leaf-lists. Every value is totally ordered and hashable so
//! it can take part in a list key.

use crate::error::ValueError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::str::FromStr;

/// A value that can be stored in a leaf or a leaf-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// UTF-8 string.
    String(String),
    /// Signed integer of any declared width.
    Int(i64),
    /// Unsigned integer of any declared width.
    Uint(u64),
    /// Boolean value.
    Bool(bool),
    /// Enumeration or identity name.
    Enum(String),
    /// Fixed-point decimal.
    Decimal(Decimal64),
    /// Opaque bytes.
    Binary(Vec<u8>),
    /// The YANG `empty` type (present or unset, nothing else).
    Empty,
    /// Ordered scalars of a leaf-list.
    List(Vec<Value>),
}

impl Value {
    /// Returns true if this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns true if this is a list of scalars.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as signed integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as unsigned integer if this is a Uint value.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            _ => None,
        }
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the elements if this is a List value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view used by range checks. Decimals yield their raw digits.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(i128::from(*i)),
            Value::Uint(u) => Some(i128::from(*u)),
            Value::Decimal(d) => Some(i128::from(d.digits)),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Int(_) => "Int",
            Value::Uint(_) => "Uint",
            Value::Bool(_) => "Bool",
            Value::Enum(_) => "Enum",
            Value::Decimal(_) => "Decimal",
            Value::Binary(_) => "Binary",
            Value::Empty => "Empty",
            Value::List(_) => "List",
        }
    }

    /// Render as the wire string used inside key predicates.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::String(s) | Value::Enum(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Uint(u) => u.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Binary(bytes) => STANDARD.encode(bytes),
            Value::Empty => String::new(),
            Value::List(items) => items
                .iter()
                .map(Value::to_key_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Enum(name) => write!(f, "{}", name),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Binary(bytes) => write!(f, "0x{}", hex_string(bytes)),
            Value::Empty => write!(f, "[null]"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Fixed-point decimal: `digits * 10^-fraction_digits`.
///
/// Two decimals with different scales are different values; the schema
/// rescales on coercion so stored decimals always carry the declared scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decimal64 {
    pub digits: i64,
    pub fraction_digits: u8,
}

impl Decimal64 {
    pub fn new(digits: i64, fraction_digits: u8) -> Self {
        Self {
            digits,
            fraction_digits,
        }
    }

    /// Rescale to `fraction_digits`, failing if precision would be lost or
    /// the result overflows.
    pub fn rescale(self, fraction_digits: u8) -> Result<Self, ValueError> {
        if fraction_digits == self.fraction_digits {
            return Ok(self);
        }
        if fraction_digits > self.fraction_digits {
            let factor = pow10(fraction_digits - self.fraction_digits)?;
            let digits = self
                .digits
                .checked_mul(factor)
                .ok_or_else(|| ValueError::out_of_range(self.to_string(), "decimal64"))?;
            return Ok(Self::new(digits, fraction_digits));
        }
        let factor = pow10(self.fraction_digits - fraction_digits)?;
        if self.digits % factor != 0 {
            return Err(ValueError::invalid(
                self.to_string(),
                format!("decimal64 with {} fraction digits", fraction_digits),
            ));
        }
        Ok(Self::new(self.digits / factor, fraction_digits))
    }

    /// Parse decimal text at an explicit scale.
    pub fn parse_with_scale(s: &str, fraction_digits: u8) -> Result<Self, ValueError> {
        s.parse::<Decimal64>()?.rescale(fraction_digits)
    }
}

fn pow10(exp: u8) -> Result<i64, ValueError> {
    10i64
        .checked_pow(u32::from(exp))
        .ok_or_else(|| ValueError::out_of_range(format!("1e{}", exp), "decimal64"))
}

impl FromStr for Decimal64 {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::invalid(s, "decimal64");
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let fraction_digits = u8::try_from(frac_part.len())
            .ok()
            .filter(|n| *n <= 18)
            .ok_or_else(invalid)?;
        let joined = format!("{}{}", int_part, frac_part);
        let out_of_range = || ValueError::out_of_range(s, "decimal64");
        let magnitude: i128 = if joined.is_empty() {
            0
        } else {
            joined.parse().map_err(|_| out_of_range())?
        };
        let signed = if negative { -magnitude } else { magnitude };
        let digits = i64::try_from(signed).map_err(|_| out_of_range())?;
        Ok(Self::new(digits, fraction_digits))
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction_digits == 0 {
            return write!(f, "{}", self.digits);
        }
        let scale = 10u64.pow(u32::from(self.fraction_digits));
        let magnitude = self.digits.unsigned_abs();
        let sign = if self.digits < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / scale,
            magnitude % scale,
            width = usize::from(self.fraction_digits)
        )
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Uint(u64::from(u))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Decimal64> for Value {
    fn from(d: Decimal64) -> Self {
        Value::Decimal(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
