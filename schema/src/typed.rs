//! Conversions from wire values into a leaf's declared kind.
//!
//! `parse_key` reads the string form found in key predicates;
//! `coerce` normalises an already-decoded scalar. Both only check what
//! the kind itself implies (integer width, enum membership, decimal
//! scale, base64). Length, pattern, range and bit restrictions belong to
//! the validators.

use crate::{Kind, LeafType};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ytree_core::{Decimal64, Value, ValueError, ValueResult};

impl LeafType {
    /// Parse a key predicate value into this type.
    pub fn parse_key(&self, s: &str) -> ValueResult<Value> {
        match self.kind {
            Kind::String | Kind::Bits => Ok(Value::String(s.to_string())),
            Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 => {
                let v: i64 = s
                    .trim()
                    .parse()
                    .map_err(|_| ValueError::invalid(s, self.kind.name()))?;
                self.check_int(v)
            }
            Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 => {
                let v: u64 = s
                    .trim()
                    .parse()
                    .map_err(|_| ValueError::invalid(s, self.kind.name()))?;
                self.check_uint(v)
            }
            Kind::Bool => match s {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ValueError::invalid(s, "boolean")),
            },
            Kind::Empty => Ok(Value::Empty),
            Kind::Enumeration | Kind::Identityref => self.check_enum(s),
            Kind::Decimal64 => Ok(Value::Decimal(Decimal64::parse_with_scale(
                s.trim(),
                self.fraction_digits,
            )?)),
            Kind::Binary => decode_base64(s),
            Kind::Union => self
                .members
                .iter()
                .find_map(|m| m.parse_key(s).ok())
                .ok_or_else(|| ValueError::invalid(s, "union")),
        }
    }

    /// Normalise a decoded scalar into this type.
    pub fn coerce(&self, value: Value) -> ValueResult<Value> {
        let mismatch = |v: &Value| ValueError::invalid(v.to_string(), self.kind.name());
        match (self.kind, value) {
            (Kind::String | Kind::Bits, Value::String(s)) => Ok(Value::String(s)),
            (Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64, Value::Int(i)) => {
                self.check_int(i)
            }
            (Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64, Value::Uint(u)) => {
                let i = i64::try_from(u)
                    .map_err(|_| ValueError::out_of_range(u.to_string(), self.kind.name()))?;
                self.check_int(i)
            }
            (Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64, Value::Uint(u)) => {
                self.check_uint(u)
            }
            (Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64, Value::Int(i)) => {
                let u = u64::try_from(i)
                    .map_err(|_| ValueError::out_of_range(i.to_string(), self.kind.name()))?;
                self.check_uint(u)
            }
            (Kind::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (Kind::Empty, Value::Empty | Value::Bool(true)) => Ok(Value::Empty),
            (Kind::Enumeration | Kind::Identityref, Value::Enum(name) | Value::String(name)) => {
                self.check_enum(&name)
            }
            (Kind::Decimal64, Value::Decimal(d)) => {
                Ok(Value::Decimal(d.rescale(self.fraction_digits)?))
            }
            (Kind::Decimal64, Value::Int(i)) => Ok(Value::Decimal(
                Decimal64::new(i, 0).rescale(self.fraction_digits)?,
            )),
            (Kind::Binary, Value::Binary(bytes)) => Ok(Value::Binary(bytes)),
            (Kind::Binary, Value::String(s)) => decode_base64(&s),
            (Kind::Union, value) => self
                .members
                .iter()
                .find_map(|m| m.coerce(value.clone()).ok())
                .ok_or_else(|| mismatch(&value)),
            (_, value) => Err(mismatch(&value)),
        }
    }

    fn check_int(&self, v: i64) -> ValueResult<Value> {
        match self.kind.int_bounds() {
            Some((lo, hi)) if v >= lo && v <= hi => Ok(Value::Int(v)),
            _ => Err(ValueError::out_of_range(v.to_string(), self.kind.name())),
        }
    }

    fn check_uint(&self, v: u64) -> ValueResult<Value> {
        match self.kind.uint_max() {
            Some(hi) if v <= hi => Ok(Value::Uint(v)),
            _ => Err(ValueError::out_of_range(v.to_string(), self.kind.name())),
        }
    }

    fn check_enum(&self, name: &str) -> ValueResult<Value> {
        if self.enum_names.is_empty() || self.enum_names.iter().any(|n| n == name) {
            return Ok(Value::Enum(name.to_string()));
        }
        // Identities may arrive qualified with their module name.
        if let Some((_, local)) = name.split_once(':') {
            if self.enum_names.iter().any(|n| n == local) {
                return Ok(Value::Enum(local.to_string()));
            }
        }
        Err(ValueError::invalid(name, self.kind.name()))
    }
}

fn decode_base64(s: &str) -> ValueResult<Value> {
    STANDARD
        .decode(s)
        .map(Value::Binary)
        .map_err(|_| ValueError::invalid(s, "binary"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_integers() {
        let ty = LeafType::new(Kind::Int8);
        assert_eq!(ty.parse_key("-128").unwrap(), Value::Int(-128));
        assert!(ty.parse_key("128").is_err());
        assert!(ty.parse_key("ten").is_err());

        let ty = LeafType::new(Kind::Uint16);
        assert_eq!(ty.parse_key("65535").unwrap(), Value::Uint(65535));
        assert!(ty.parse_key("-1").is_err());
    }

    #[test]
    fn test_parse_key_bool_enum_decimal_binary() {
        assert_eq!(
            LeafType::new(Kind::Bool).parse_key("true").unwrap(),
            Value::Bool(true)
        );
        let e = LeafType::enumeration(["UP", "DOWN"]);
        assert_eq!(e.parse_key("UP").unwrap(), Value::Enum("UP".into()));
        assert!(e.parse_key("SIDEWAYS").is_err());
        assert_eq!(
            LeafType::decimal64(2).parse_key("1.5").unwrap(),
            Value::Decimal(Decimal64::new(150, 2))
        );
        assert_eq!(
            LeafType::new(Kind::Binary).parse_key("AQI=").unwrap(),
            Value::Binary(vec![1, 2])
        );
    }

    #[test]
    fn test_identityref_strips_module_prefix() {
        let mut ty = LeafType::enumeration(["ETHERNET"]);
        ty.kind = Kind::Identityref;
        assert_eq!(
            ty.parse_key("iana-if-type:ETHERNET").unwrap(),
            Value::Enum("ETHERNET".into())
        );
    }

    #[test]
    fn test_union_tries_members_in_order() {
        let ty = LeafType::union(vec![LeafType::new(Kind::Uint32), LeafType::string()]);
        assert_eq!(ty.parse_key("42").unwrap(), Value::Uint(42));
        assert_eq!(ty.parse_key("any").unwrap(), Value::String("any".into()));
        assert_eq!(ty.coerce(Value::from("x")).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_coerce_widths_and_kinds() {
        let ty = LeafType::new(Kind::Uint8);
        assert_eq!(ty.coerce(Value::Int(7)).unwrap(), Value::Uint(7));
        assert!(ty.coerce(Value::Int(-1)).is_err());
        assert!(ty.coerce(Value::Uint(300)).is_err());
        assert!(ty.coerce(Value::from("7")).is_err());

        let ty = LeafType::decimal64(3);
        assert_eq!(
            ty.coerce(Value::Int(2)).unwrap(),
            Value::Decimal(Decimal64::new(2000, 3))
        );
        assert_eq!(
            LeafType::new(Kind::Empty).coerce(Value::Bool(true)).unwrap(),
            Value::Empty
        );
    }
}
