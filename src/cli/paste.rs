//! Paste a step fragment into a document.
//!
//! The fragment is a single inline step element (as copied from another
//! document). Identities it shares with steps already in the target are kept
//! and references into the target resolve; identities duplicated inside the
//! fragment itself are reassigned.
//!
//! ```bash
//! # Append to the plan's top-level steps
//! stepref --schema plan-schema.toml paste plan.json step.json
//!
//! # Append under a specific step, in place
//! stepref --schema plan-schema.toml paste plan.json step.json --parent <ID> --output plan.json
//! ```

use anyhow::{Context, Result, anyhow};
use clap::Args;
use std::path::PathBuf;

use super::CommandContext;
use crate::core::StepId;
use crate::model::Element;

/// Arguments of `stepref paste`.
#[derive(Args, Debug)]
pub struct PasteCommand {
    /// Document to paste into (JSON element tree).
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Step element to paste (JSON element tree).
    #[arg(value_name = "FRAGMENT")]
    pub fragment: PathBuf,

    /// Identity of the step to paste under; defaults to the document root.
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,

    /// Write here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl PasteCommand {
    /// Run the paste.
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let target = Element::read_from(&self.target)?;
        let fragment = Element::read_from(&self.fragment)?;

        let loaded = context.session().load(&target)?;
        let parent = match self.parent.as_deref() {
            Some(raw) => {
                let id = StepId::parse(raw).with_context(|| format!("'{raw}' is not a step id"))?;
                let node = loaded
                    .document
                    .find_by_id(id)
                    .ok_or_else(|| anyhow!("No step with id {id} in {}", self.target.display()))?;
                Some(node)
            }
            None => None,
        };

        let session = context.session();
        let pasted = session.paste(loaded.document, parent, &fragment)?;
        tracing::info!(
            "Pasted step {} ({} warning(s))",
            pasted.document.step_id(pasted.step).map_or_else(String::new, |id| id.to_string()),
            pasted.diagnostics.warning_count()
        );

        let written = session.save(&pasted.document)?;
        context.emit(&written, self.output.as_deref())
    }
}
