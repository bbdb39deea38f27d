//! Per-kind validators.
//!
//! Each kind has a schema check (is the restriction itself well-formed) and
//! a value check. Value checks assume the value was already coerced to the
//! leaf's kind.

use crate::error::{render_ranges, ValidateResult, ValidationError};
use crate::pattern::PatternCache;
use std::collections::HashSet;
use ytree_core::Value;
use ytree_schema::{Kind, LeafType};

// ==================== String ====================

pub fn validate_string_schema(ty: &LeafType, patterns: &PatternCache) -> ValidateResult<()> {
    validate_length_schema(ty)?;
    for p in &ty.patterns {
        patterns.check(p, ty.dialect)?;
    }
    Ok(())
}

/// Check length (in characters) then every pattern.
pub fn validate_string(ty: &LeafType, value: &str, patterns: &PatternCache) -> ValidateResult<()> {
    check_length(ty, value, value.chars().count() as u64)?;
    for p in &ty.patterns {
        if !patterns.is_match(p, ty.dialect, value)? {
            return Err(ValidationError::Pattern {
                value: value.to_string(),
                pattern: p.clone(),
            });
        }
    }
    Ok(())
}

fn validate_length_schema(ty: &LeafType) -> ValidateResult<()> {
    for r in &ty.lengths {
        if let (Some(min), Some(max)) = (r.min, r.max) {
            if min > max {
                return Err(ValidationError::schema(
                    ty.kind.name(),
                    format!("length {r} has min above max"),
                ));
            }
        }
    }
    Ok(())
}

fn check_length(ty: &LeafType, shown: &str, len: u64) -> ValidateResult<()> {
    if ty.lengths.is_empty() || ty.lengths.iter().any(|r| r.contains(len)) {
        return Ok(());
    }
    Err(ValidationError::Length {
        value: shown.to_string(),
        len,
        ranges: render_ranges(&ty.lengths),
    })
}

// ==================== Bits ====================

pub fn validate_bits_schema(ty: &LeafType) -> ValidateResult<()> {
    if ty.bits.is_empty() {
        return Err(ValidationError::schema("bits", "no bits declared"));
    }
    let mut positions = HashSet::new();
    for (name, pos) in &ty.bits {
        if !positions.insert(*pos) {
            return Err(ValidationError::schema(
                "bits",
                format!("bit {name} reuses position {pos}"),
            ));
        }
    }
    Ok(())
}

/// Every space-separated name must be declared. Repeated names are allowed.
pub fn validate_bits(ty: &LeafType, value: &str) -> ValidateResult<()> {
    match value.split_whitespace().find(|b| !ty.bits.contains_key(*b)) {
        Some(name) => Err(ValidationError::UnknownBit {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

// ==================== Numeric ====================

pub fn validate_range_schema(ty: &LeafType) -> ValidateResult<()> {
    for r in &ty.ranges {
        if let (Some(min), Some(max)) = (r.min, r.max) {
            if min > max {
                return Err(ValidationError::schema(
                    ty.kind.name(),
                    format!("range {r} has min above max"),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_range(ty: &LeafType, value: &Value) -> ValidateResult<()> {
    let n = value
        .as_i128()
        .ok_or_else(|| ValidationError::kind(ty.kind.name(), value.type_name()))?;
    if ty.ranges.is_empty() || ty.ranges.iter().any(|r| r.contains(n)) {
        return Ok(());
    }
    Err(ValidationError::Range {
        value: value.to_string(),
        ranges: render_ranges(&ty.ranges),
    })
}

// ==================== Enumeration ====================

pub fn validate_enum_schema(ty: &LeafType) -> ValidateResult<()> {
    if ty.kind == Kind::Enumeration && ty.enum_names.is_empty() {
        return Err(ValidationError::schema("enumeration", "no names declared"));
    }
    let mut seen = HashSet::new();
    match ty.enum_names.iter().find(|n| !seen.insert(n.as_str())) {
        Some(dup) => Err(ValidationError::schema(
            ty.kind.name(),
            format!("name {dup} declared twice"),
        )),
        None => Ok(()),
    }
}

pub fn validate_enum(ty: &LeafType, name: &str) -> ValidateResult<()> {
    if ty.enum_names.is_empty() || ty.enum_names.iter().any(|n| n == name) {
        Ok(())
    } else {
        Err(ValidationError::Enum {
            value: name.to_string(),
        })
    }
}

// ==================== Binary ====================

pub fn validate_binary(ty: &LeafType, bytes: &[u8]) -> ValidateResult<()> {
    check_length(ty, &format!("{} bytes", bytes.len()), bytes.len() as u64)
}

// ==================== Slices ====================

/// Validate each element, then reject exact duplicates.
pub fn validate_slice<F>(values: &[Value], mut each: F) -> ValidateResult<()>
where
    F: FnMut(&Value) -> ValidateResult<()>,
{
    let mut seen = HashSet::with_capacity(values.len());
    for v in values {
        each(v)?;
        if !seen.insert(v) {
            return Err(ValidationError::Duplicate {
                value: v.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounded(min: u64, max: u64) -> LeafType {
        LeafType::string().with_length(Some(min), Some(max))
    }

    // ========== TEST: string_length_counts_characters ==========
    #[test]
    fn test_string_length_counts_characters() {
        // GIVEN a string type of length 2..3
        let cache = PatternCache::new();
        let ty = bounded(2, 3);

        // WHEN validating multibyte strings
        // THEN code points are counted, not bytes
        assert!(validate_string(&ty, "ééé", &cache).is_ok());
        assert!(matches!(
            validate_string(&ty, "éééé", &cache),
            Err(ValidationError::Length { len: 4, .. })
        ));
    }

    #[test]
    fn test_open_ended_lengths() {
        let cache = PatternCache::new();
        let ty = LeafType::string().with_length(Some(3), None);
        assert!(validate_string(&ty, &"x".repeat(1000), &cache).is_ok());
        assert!(validate_string(&ty, "xy", &cache).is_err());
    }

    #[test]
    fn test_any_length_range_suffices() {
        let cache = PatternCache::new();
        let ty = LeafType::string()
            .with_length(Some(1), Some(1))
            .with_length(Some(4), Some(4));
        assert!(validate_string(&ty, "a", &cache).is_ok());
        assert!(validate_string(&ty, "abcd", &cache).is_ok());
        assert!(validate_string(&ty, "ab", &cache).is_err());
    }

    // ========== TEST: string_pattern_substring_semantics ==========
    #[test]
    fn test_string_pattern_substring_semantics() {
        let cache = PatternCache::new();
        let ty = LeafType::string().with_pattern("ab.");
        assert!(validate_string(&ty, "abc", &cache).is_ok());
        assert!(validate_string(&ty, "zzabczz", &cache).is_ok());
        assert!(matches!(
            validate_string(&ty, "axc", &cache),
            Err(ValidationError::Pattern { .. })
        ));
    }

    #[test]
    fn test_every_pattern_must_match() {
        let cache = PatternCache::new();
        let ty = LeafType::string().with_pattern("^a").with_pattern("z$").posix();
        assert!(validate_string(&ty, "abcz", &cache).is_ok());
        assert!(validate_string(&ty, "abc", &cache).is_err());
    }

    #[test]
    fn test_string_schema_rejects_bad_bounds_and_patterns() {
        let cache = PatternCache::new();
        assert!(validate_string_schema(&bounded(5, 2), &cache).is_err());
        assert!(validate_string_schema(&LeafType::string().with_pattern("[a-"), &cache).is_err());
        assert!(validate_string_schema(&bounded(2, 5), &cache).is_ok());
    }

    // ========== TEST: bits ==========
    #[test]
    fn test_bits() {
        let ty = LeafType::new(Kind::Bits).with_bit("up", 0).with_bit("down", 1);
        assert!(validate_bits(&ty, "up down").is_ok());
        assert!(validate_bits(&ty, "up up").is_ok());
        assert!(validate_bits(&ty, "").is_ok());
        assert!(matches!(
            validate_bits(&ty, "up sideways"),
            Err(ValidationError::UnknownBit { name }) if name == "sideways"
        ));
    }

    #[test]
    fn test_bits_schema() {
        assert!(validate_bits_schema(&LeafType::new(Kind::Bits)).is_err());
        let clash = LeafType::new(Kind::Bits).with_bit("a", 0).with_bit("b", 0);
        assert!(validate_bits_schema(&clash).is_err());
    }

    #[test]
    fn test_ranges() {
        let ty = LeafType::new(Kind::Int32)
            .with_range(Some(-5), Some(5))
            .with_range(Some(100), None);
        assert!(validate_range(&ty, &Value::Int(-5)).is_ok());
        assert!(validate_range(&ty, &Value::Int(1000)).is_ok());
        assert!(validate_range(&ty, &Value::Int(6)).is_err());
        assert!(validate_range(&ty, &Value::from("x")).is_err());
    }

    #[test]
    fn test_slice_rejects_duplicates() {
        let cache = PatternCache::new();
        let ty = bounded(1, 3);
        let ok = vec![Value::from("a"), Value::from("b")];
        let dup = vec![Value::from("a"), Value::from("a")];
        let long = vec![Value::from("abcd")];
        let check = |v: &Value| validate_string(&ty, v.as_str().unwrap_or_default(), &cache);
        assert!(validate_slice(&ok, check).is_ok());
        assert!(matches!(
            validate_slice(&dup, check),
            Err(ValidationError::Duplicate { .. })
        ));
        assert!(matches!(
            validate_slice(&long, check),
            Err(ValidationError::Length { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_length_boundaries(min in 1u64..20, span in 0u64..20) {
            let cache = PatternCache::new();
            let max = min + span;
            let ty = bounded(min, max);
            prop_assert!(validate_string(&ty, &"a".repeat(min as usize), &cache).is_ok());
            prop_assert!(validate_string(&ty, &"a".repeat(max as usize), &cache).is_ok());
            prop_assert!(validate_string(&ty, &"a".repeat((min - 1) as usize), &cache).is_err());
            prop_assert!(validate_string(&ty, &"a".repeat((max + 1) as usize), &cache).is_err());
        }
    }
}
