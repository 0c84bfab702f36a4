//! Settings for serialization sessions.
//!
//! Settings come from an optional TOML file, with every key defaulted:
//!
//! ```toml
//! # Suppress warnings for references that cannot be resolved
//! ignore-errors = false
//! # Name of the root element written by `save`
//! root-element = "TestPlan"
//! # Pretty-print JSON output
//! pretty = true
//! ```
//!
//! The `STEPREF_IGNORE_ERRORS` environment variable (`1`/`true`/`0`/`false`)
//! overrides `ignore-errors` from the file.

mod parser;

pub use parser::parse_config;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{DEFAULT_ROOT_ELEMENT, IGNORE_ERRORS_ENV};

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Suppress warnings for references that cannot be resolved.
    pub ignore_errors: bool,
    /// Name of the root element written by `save`.
    pub root_element: String,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore_errors: false,
            root_element: DEFAULT_ROOT_ELEMENT.to_string(),
            pretty: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Self = parse_config(path)?;
        Ok(settings.with_env_overrides())
    }

    /// Load from `path` when given, otherwise start from defaults; environment
    /// overrides apply either way.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default().with_env_overrides()),
        }
    }

    /// Apply `STEPREF_IGNORE_ERRORS` if it holds a recognizable boolean.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(IGNORE_ERRORS_ENV) {
            match parse_flag(&value) {
                Some(flag) => self.ignore_errors = flag,
                None => tracing::warn!("Ignoring {IGNORE_ERRORS_ENV}={value}: expected true/false"),
            }
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
