//! Check a serialized document.
//!
//! Loads the document through the full chain and reports what the load had
//! to do to it: duplicate identities that were reassigned and references that
//! could not be resolved. Nothing is written.
//!
//! ```bash
//! stepref --schema plan-schema.toml check plan.json
//! stepref --schema plan-schema.toml check plan.json --strict   # fail on warnings
//! ```

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::CommandContext;
use crate::model::{Element, Value};
use crate::serialization::LoadedPlan;

/// Arguments of `stepref check`.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Document to check (JSON element tree).
    #[arg(value_name = "DOC")]
    pub document: PathBuf,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    /// Run the check.
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let element = Element::read_from(&self.document)?;
        let session = context.session();
        let loaded = session.load(&element)?;

        let summary = Summary::of(context, &loaded);
        let warnings = loaded.diagnostics.warning_count();
        let label = if warnings == 0 {
            "✓".green()
        } else {
            "⚠".yellow()
        };
        println!(
            "{label} {}: {} step(s), {} reference(s), {} registered id(s), {warnings} warning(s)",
            self.document.display(),
            summary.steps,
            summary.references,
            session.references().registry().len(),
        );

        if self.strict && warnings > 0 {
            bail!("{warnings} warning(s) in strict mode");
        }
        Ok(())
    }
}

/// Counts reported by `check`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    steps: usize,
    references: usize,
}

impl Summary {
    fn of(context: &CommandContext, loaded: &LoadedPlan) -> Self {
        let schema = &context.schema;
        let document = &loaded.document;
        let steps = document.iter().filter(|(_, node)| schema.is_step(node.ty)).count();

        // Aliases: step values held by members other than ownership lists.
        let references = document
            .iter()
            .flat_map(|(_, node)| {
                schema
                    .members(node.ty)
                    .iter()
                    .filter(|m| !schema.is_ownership_list(m.ty))
                    .filter_map(|m| node.field(&m.name))
            })
            .map(|value| match value {
                Value::Node(n) => usize::from(schema.is_step(document[*n].ty)),
                Value::List(items) => items
                    .iter()
                    .filter_map(Value::as_node)
                    .filter(|n| schema.is_step(document[*n].ty))
                    .count(),
                _ => 0,
            })
            .sum();

        Self {
            steps,
            references,
        }
    }
}
