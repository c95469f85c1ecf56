//! Tracker configuration.
//! Key notes:
//!   - `prune` selects how redundant free rectangles are discarded after a split; both strategies yield the same free set
//!   - `verify_invariants` re-checks the free set before committing it (slow; for debugging and cross-checks)
//!   - `parallel` only has an effect when the crate is built with the `parallel` feature

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Containment pruning strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PruneStrategy {
    /// One all-pairs containment sweep over the merged free list.
    #[default]
    Sweep,
    /// Compare only the rectangles produced by the split against the untouched ones and each other.
    Staged,
}

impl FromStr for PruneStrategy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sweep" | "full" => Ok(Self::Sweep),
            "staged" | "ref" | "reference" => Ok(Self::Staged),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    #[serde(default)]
    pub prune: PruneStrategy,
    /// Check positive area and non-containment of the new free set before committing it.
    #[serde(default)]
    pub verify_invariants: bool,
    /// Compute sweep redundancy flags with rayon when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
    /// Minimum free-list length before the parallel sweep kicks in.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            prune: PruneStrategy::default(),
            verify_invariants: false,
            parallel: false,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl TrackerConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::RectPackError;

        if self.parallel_threshold == 0 {
            return Err(RectPackError::InvalidConfig(
                "parallel_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `TrackerConfig`.
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::new()
    }
}

fn default_parallel_threshold() -> usize {
    256
}

/// Builder for `TrackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct TrackerConfigBuilder {
    cfg: TrackerConfig,
}

impl TrackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: TrackerConfig::default(),
        }
    }
    pub fn prune(mut self, v: PruneStrategy) -> Self {
        self.cfg.prune = v;
        self
    }
    pub fn verify_invariants(mut self, v: bool) -> Self {
        self.cfg.verify_invariants = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn parallel_threshold(mut self, v: usize) -> Self {
        self.cfg.parallel_threshold = v;
        self
    }
    pub fn build(self) -> TrackerConfig {
        self.cfg
    }
}
