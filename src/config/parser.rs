//! Generic TOML configuration parsing.
//!
//! Reads a TOML file into any [`serde::de::DeserializeOwned`] type, attaching
//! the file path to both read and parse failures:
//!
//! ```text
//! Failed to parse config file: /path/to/stepref.toml
//! Caused by:
//!     invalid type: string "yes", expected a boolean
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use stepref::config::{Settings, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let settings: Settings = parse_config(Path::new("stepref.toml"))?;
/// println!("ignore errors: {}", settings.ignore_errors);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
