#![forbid(unsafe_code)]

//! History configuration.
//!
//! With the `config` feature a [`HistoryConfig`] can be loaded from TOML or
//! JSON. Missing fields fall back to their defaults.
//!
//! ```toml
//! # forkline.toml
//! max_entries = 250        # 0 = keep everything
//! root_branch_name = "Main"
//! initial_action = "Initial state"
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::from_toml_file("forkline.toml")?;
//! let history = EditHistory::with_config(document, config)?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

use crate::error::ConfigError;
use crate::retention::RetentionPolicy;

/// Tunables for an [`EditHistory`](crate::EditHistory).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct HistoryConfig {
    /// Per-branch entry cap applied after each append (0 = unlimited).
    /// Snapshots older than the cap are always kept.
    pub max_entries: usize,
    /// Display name of the protected root branch.
    pub root_branch_name: String,
    /// Action label of the root branch's seed entry.
    pub initial_action: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            root_branch_name: "Main".to_owned(),
            initial_action: "Initial state".to_owned(),
        }
    }
}

impl HistoryConfig {
    /// Default labels with a custom entry cap.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    /// Default labels, no entry cap.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(0)
    }

    /// Set the root branch name.
    #[must_use]
    pub fn with_root_branch_name(mut self, name: impl Into<String>) -> Self {
        self.root_branch_name = name.into();
        self
    }

    /// Set the seed entry's action label.
    #[must_use]
    pub fn with_initial_action(mut self, action: impl Into<String>) -> Self {
        self.initial_action = action.into();
        self
    }

    /// The retention policy this config describes.
    #[must_use]
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::from_max_entries(Some(self.max_entries))
    }

    /// Check every field. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.root_branch_name.trim().is_empty() {
            errors.push("root_branch_name must not be empty".into());
        }
        if self.initial_action.trim().is_empty() {
            errors.push("initial_action must not be empty".into());
        }
        errors
    }

    /// Return `self` if valid, otherwise every validation error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Parse and validate a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Format {
            format: "TOML",
            message: e.to_string(),
        })?;
        config.validated()
    }

    /// Read, parse and validate a TOML file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(|e| ConfigError::Format {
            format: "JSON",
            message: e.to_string(),
        })?;
        config.validated()
    }

    /// Read, parse and validate a JSON file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Render as TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Format {
            format: "TOML",
            message: e.to_string(),
        })
    }
}
