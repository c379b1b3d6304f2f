//! Provenance and schema descriptors shared across persisted artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether a payload written with `other` can be read by this schema.
    pub fn is_compatible(&self, other: &SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every persisted grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Master deterministic seed used for all randomness.
    pub seed: u64,
    /// Number of Monte Carlo calls that contributed to the grid.
    pub calls: u64,
    /// Lower edge of the generated invariant-mass window in GeV.
    pub mmin: f64,
    /// Upper edge of the generated invariant-mass window in GeV.
    pub mmax: f64,
    /// Free-form label identifying the producer.
    pub created_by: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
