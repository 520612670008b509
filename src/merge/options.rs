//! Merge options

use crate::schema::DEFAULT_MAX_DEPTH;

/// Options for the merge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Copy baseline keys the schema does not declare into the output,
    /// at the level where they were found.
    pub retain_undeclared: bool,
    /// Maximum schema nesting walked before the merge fails.
    pub max_depth: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            retain_undeclared: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MergeOptions {
    /// Options that drop undeclared baseline keys.
    pub fn declared_only() -> Self {
        Self {
            retain_undeclared: false,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
