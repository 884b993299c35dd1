//! Store configuration.
//!
//! Policies for the two kinds of misuse the store tolerates: updates after
//! completion and dynamic updates that introduce unknown keys. Loadable from
//! TOML; every field is optional and falls back to its default.
//!
//! ```
//! use statecast::config::{CompletedUpdatePolicy, StoreConfig, UnknownKeyPolicy};
//!
//! let config = StoreConfig::from_toml_str(r#"
//!     completed_updates = "ignore"
//!     unknown_keys = "warn"
//! "#).unwrap();
//!
//! assert_eq!(config.completed_updates, CompletedUpdatePolicy::Ignore);
//! assert_eq!(config.unknown_keys, UnknownKeyPolicy::Warn);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What `update_state` does once the store has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletedUpdatePolicy {
    /// Return [`StoreError::Completed`](crate::StoreError::Completed).
    #[default]
    Reject,
    /// Drop the update and log a warning.
    Ignore,
}

/// What a dynamic update does when it names keys the snapshot doesn't have.
///
/// Keys are judged against every update accepted so far, including updates
/// still queued behind a delivery in progress. Under `Warn` and `Reject` the
/// store keeps its own merged copy of the accepted state for this check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    /// Merge silently.
    #[default]
    Accept,
    /// Merge and log a warning.
    Warn,
    /// Return [`StoreError::UnknownKeys`](crate::StoreError::UnknownKeys) without merging.
    Reject,
}

/// Configuration for an [`ObservableStore`](crate::ObservableStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub completed_updates: CompletedUpdatePolicy,
    pub unknown_keys: UnknownKeyPolicy,
}

impl StoreConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn with_completed_updates(mut self, policy: CompletedUpdatePolicy) -> Self {
        self.completed_updates = policy;
        self
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }
}
