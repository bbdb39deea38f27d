//! Resolution options.

use serde::{Deserialize, Serialize};
use ytree_tree::DecodeOptions;

/// Flags that change how paths are matched against bound data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Treat shadow paths as authoritative and primary paths as alternates.
    pub prefer_shadow: bool,
    /// Consult alternate paths before authoritative ones.
    pub reverse_shadow: bool,
    /// Unknown path elements and payload members are skipped, not errors.
    pub ignore_extra_fields: bool,
    /// A `*` key value matches any entry.
    pub allow_wildcards: bool,
    /// Key predicates may omit key dimensions.
    pub allow_partial_key_match: bool,
    /// Reading through an unset intermediate node yields no results
    /// instead of `PathNotFound`.
    pub tolerate_nil_intermediate: bool,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefer_shadow(mut self, on: bool) -> Self {
        self.prefer_shadow = on;
        self
    }

    pub fn with_reverse_shadow(mut self, on: bool) -> Self {
        self.reverse_shadow = on;
        self
    }

    pub fn with_ignore_extra_fields(mut self, on: bool) -> Self {
        self.ignore_extra_fields = on;
        self
    }

    pub fn with_wildcards(mut self, on: bool) -> Self {
        self.allow_wildcards = on;
        self
    }

    pub fn with_partial_key_match(mut self, on: bool) -> Self {
        self.allow_partial_key_match = on;
        self
    }

    pub fn with_tolerate_nil_intermediate(mut self, on: bool) -> Self {
        self.tolerate_nil_intermediate = on;
        self
    }

    pub(crate) fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            ignore_extra_fields: self.ignore_extra_fields,
        }
    }
}
