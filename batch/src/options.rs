//! Batch configuration.

use serde::{Deserialize, Serialize};
use ytree_engine::ResolveOptions;

/// What to do when an operation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Return the first error; later operations are not attempted.
    #[default]
    FailFast,
    /// Attempt every operation and return all failures together.
    BestEffort,
}

/// Configuration for applying a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    pub failure_mode: FailureMode,
    /// Options for every path resolution in the batch.
    pub resolve: ResolveOptions,
    /// Run the whole-tree validation pass once all operations are applied.
    pub validate_after: bool,
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Shorthand for `FailureMode::BestEffort`.
    pub fn best_effort(self) -> Self {
        self.with_failure_mode(FailureMode::BestEffort)
    }

    pub fn with_resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn with_validate_after(mut self, on: bool) -> Self {
        self.validate_after = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let opts = ApplyOptions::new()
            .best_effort()
            .with_validate_after(true)
            .with_resolve(ResolveOptions::new().with_ignore_extra_fields(true));
        assert_eq!(opts.failure_mode, FailureMode::BestEffort);
        assert!(opts.validate_after);
        assert!(opts.resolve.ignore_extra_fields);
    }
}
