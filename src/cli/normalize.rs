//! Rewrite a document in canonical form.
//!
//! Loading resolves references and repairs duplicate identities; saving
//! writes every step once at its ownership position and as an identity
//! reference everywhere else.
//!
//! ```bash
//! stepref --schema plan-schema.toml normalize plan.json > plan.normalized.json
//! stepref --schema plan-schema.toml normalize plan.json --output plan.json
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::CommandContext;
use crate::model::Element;

/// Arguments of `stepref normalize`.
#[derive(Args, Debug)]
pub struct NormalizeCommand {
    /// Document to normalize (JSON element tree).
    #[arg(value_name = "DOC")]
    pub document: PathBuf,

    /// Write here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl NormalizeCommand {
    /// Run the rewrite.
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let element = Element::read_from(&self.document)?;
        let session = context.session();
        let loaded = session.load(&element)?;
        let normalized = session.save(&loaded.document)?;

        tracing::info!(
            "Normalized {} ({} warning(s))",
            self.document.display(),
            loaded.diagnostics.warning_count()
        );
        context.emit(&normalized, self.output.as_deref())
    }
}
