//! Command-line interface for stepref.
//!
//! Every command loads a schema file (`--schema`) and optional settings
//! (`--config`), then runs one serialization session over a JSON element tree.
//!
//! # Available Commands
//!
//! - `check` - load a document and report identity repairs and unresolved references
//! - `normalize` - load a document and write it back in canonical form
//! - `paste` - deserialize a step fragment into an existing document
//!
//! # Examples
//!
//! ```bash
//! # Report problems, failing on any warning
//! stepref --schema plan-schema.toml check plan.json --strict
//!
//! # Rewrite aliased steps as references
//! stepref --schema plan-schema.toml normalize plan.json --output plan.normalized.json
//!
//! # Paste a step under the step with the given id
//! stepref --schema plan-schema.toml paste plan.json step.json --parent 3f2a...
//! ```
//!
//! # Output
//!
//! Documents go to stdout (or `--output`); logs and diagnostics go to stderr.
//! Set `STEPREF_IGNORE_ERRORS=1` to silence unresolved-reference warnings.

mod check;
mod normalize;
mod paste;


pub use check::CheckCommand;
pub use normalize::NormalizeCommand;
pub use paste::PasteCommand;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::model::Element;
use crate::schema::Schema;
use crate::schema::file::load_schema;
use crate::serialization::PlanSerializer;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive. `None` leaves `RUST_LOG` in charge.
    pub log_level: Option<String>,

    /// Settings file to load.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global `tracing` subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence when no explicit level was requested.
    /// If a subscriber is already installed it stays in place.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        if let Err(e) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
        {
            tracing::debug!("Keeping the existing log subscriber: {e}");
        }
    }
}

/// Step reference resolution for serialized test plans.
#[derive(Parser, Debug)]
#[command(
    name = "stepref",
    about = "Resolve step references and repair step identities in serialized test plans",
    version,
    author
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    ///
    /// Shows registry seeding, deferred resolution and every identity
    /// repair, including those on synthesized steps.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Settings file (TOML).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Schema file (TOML) describing the document's types.
    #[arg(short, long, global = true, value_name = "FILE", env = "STEPREF_SCHEMA")]
    schema: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a document and report what had to be repaired.
    Check(CheckCommand),

    /// Load a document and write it back with aliased steps as references.
    Normalize(NormalizeCommand),

    /// Paste a step fragment into a document.
    Paste(PasteCommand),
}

/// What every command needs: the schema and the session settings.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Document types.
    pub schema: Schema,
    /// Session settings.
    pub settings: Settings,
}

impl CommandContext {
    /// Load the schema and settings files.
    pub fn load(schema: &Path, config: Option<&Path>) -> Result<Self> {
        let schema = load_schema(schema)?;
        let settings = Settings::load_or_default(config)?;
        Ok(Self {
            schema,
            settings,
        })
    }

    /// A fresh serialization session.
    #[must_use]
    pub fn session(&self) -> PlanSerializer {
        PlanSerializer::new(self.schema.clone(), self.settings.clone())
    }

    /// Write `element` to `output`, or to stdout.
    pub fn emit(&self, element: &Element, output: Option<&Path>) -> Result<()> {
        match output {
            Some(path) => element.write_to(path, self.settings.pretty),
            None => {
                println!("{}", element.to_json(self.settings.pretty)?);
                Ok(())
            }
        }
    }
}

impl Cli {
    /// Run the parsed command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("stepref=debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the parsed command with an explicit configuration.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let schema = self
            .schema
            .as_deref()
            .context("No schema file given; pass --schema FILE or set STEPREF_SCHEMA")?;
        let context = CommandContext::load(schema, config.config_path.as_deref())?;

        match self.command {
            Commands::Check(cmd) => cmd.execute(&context),
            Commands::Normalize(cmd) => cmd.execute(&context),
            Commands::Paste(cmd) => cmd.execute(&context),
        }
    }
}
