//! TOML schema files.
//!
//! ```toml
//! [[types]]
//! name = "Delay"
//! base = "Step"
//! members = [{ name = "Seconds", type = "float" }]
//!
//! [[types]]
//! name = "StepRefs"
//! list = "Step"
//!
//! [[types]]
//! name = "TestPlan"
//! members = [{ name = "Steps", type = "StepList" }]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Schema, SchemaBuilder, TypeDeclaration};
use crate::core::StepRefError;

/// On-disk form of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// User type declarations.
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

impl SchemaFile {
    /// Parse schema TOML text. `origin` names the source in error messages.
    pub fn parse(text: &str, origin: &str) -> Result<Self, StepRefError> {
        toml::from_str(text).map_err(|e| StepRefError::SchemaParseError {
            file: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Resolve the declarations into a [`Schema`].
    pub fn into_schema(self) -> Result<Schema, StepRefError> {
        self.types.into_iter().fold(SchemaBuilder::new(), SchemaBuilder::declare).build()
    }
}

/// Load and build a schema from a TOML file.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    let schema = SchemaFile::parse(&text, &path.display().to_string())?.into_schema()?;
    tracing::debug!("Loaded schema {} with {} types", path.display(), schema.len());
    Ok(schema)
}
