//! Compiled-pattern cache.

use crate::error::{ValidateResult, ValidationError};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;
use ytree_schema::PatternDialect;

#[derive(Debug, Clone)]
enum Compiled {
    Posix(regex_lite::Regex),
    Yang(regex::Regex),
}

impl Compiled {
    fn new(pattern: &str, dialect: PatternDialect) -> ValidateResult<Self> {
        let bad = |reason: String| ValidationError::BadPattern {
            pattern: pattern.to_string(),
            reason,
        };
        match dialect {
            PatternDialect::Posix => regex_lite::Regex::new(pattern)
                .map(Compiled::Posix)
                .map_err(|e| bad(e.to_string())),
            PatternDialect::Yang => regex::Regex::new(pattern)
                .map(Compiled::Yang)
                .map_err(|e| bad(e.to_string())),
        }
    }

    /// Unanchored: a match anywhere in `s` counts.
    fn is_match(&self, s: &str) -> bool {
        match self {
            Compiled::Posix(re) => re.is_match(s),
            Compiled::Yang(re) => re.is_match(s),
        }
    }
}

/// Patterns compiled so far, keyed by text and dialect.
///
/// Population is racy: two threads missing on the same pattern both
/// compile it and the second insert is discarded.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<(String, PatternDialect), Compiled>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_compile(&self, pattern: &str, dialect: PatternDialect) -> ValidateResult<Compiled> {
        let key = (pattern.to_string(), dialect);
        if let Some(re) = self.compiled.read().get(&key) {
            return Ok(re.clone());
        }
        let re = Compiled::new(pattern, dialect)?;
        trace!(pattern, ?dialect, "compiled pattern");
        Ok(self.compiled.write().entry(key).or_insert(re).clone())
    }

    /// Check that `pattern` compiles in `dialect`.
    pub fn check(&self, pattern: &str, dialect: PatternDialect) -> ValidateResult<()> {
        self.get_or_compile(pattern, dialect).map(|_| ())
    }

    /// Returns true if `pattern` matches anywhere in `value`.
    pub fn is_match(&self, pattern: &str, dialect: PatternDialect, value: &str) -> ValidateResult<bool> {
        Ok(self.get_or_compile(pattern, dialect)?.is_match(value))
    }

    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.read().is_empty()
    }

    pub fn clear(&self) {
        self.compiled.write().clear();
    }
}
