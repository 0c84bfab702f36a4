//! stepref - step reference resolution for serialized test plans
//!
//! A test plan is a tree of steps. Besides its place in the tree, a step can
//! be pointed at from elsewhere: a step-typed property of another step, or a
//! list of steps that is not the child list. In the serialized form every step
//! is written once, inline at its place in the tree, and as a reference (its
//! identity, a UUID) everywhere else. Reading it back restores the aliasing,
//! even when a reference appears before the step it names.
//!
//! Merged and pasted content also needs identity repair: a step carrying an
//! identity that already belongs to another step gets a fresh one, unless the
//! identity was seeded from the live tree a paste goes into.
//!
//! # Core Modules
//!
//! - [`schema`] - type descriptors: members, inheritance, the step and child-list types
//! - [`model`] - the wire [`Element`](model::Element) tree and the in-memory [`Document`](model::Document) arena
//! - [`serialization`] - the plugin chain, its passes and the [`PlanSerializer`](serialization::PlanSerializer) facade
//! - [`references`] - the step reference plugin, its registry and identity reconciliation
//! - [`config`] - session settings
//! - [`core`] - identities and errors
//! - [`cli`] - the `stepref` command
//!
//! # Example
//!
//! ```rust,no_run
//! use stepref::config::Settings;
//! use stepref::model::Element;
//! use stepref::schema::file::load_schema;
//! use stepref::serialization::PlanSerializer;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let schema = load_schema(Path::new("plan-schema.toml"))?;
//! let session = PlanSerializer::new(schema, Settings::default());
//!
//! let element = Element::read_from(Path::new("plan.json"))?;
//! let loaded = session.load(&element)?;
//! for warning in loaded.diagnostics.warnings() {
//!     eprintln!("{warning}");
//! }
//!
//! let normalized = session.save(&loaded.document)?;
//! normalized.write_to(Path::new("plan.normalized.json"), true)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Wire Format
//!
//! Elements are JSON objects with a `name`, optional `attributes`, `text` and
//! `children`. A step written inline carries `type` and `id` attributes; a
//! reference is an element whose only content is the identity text:
//!
//! ```json
//! { "name": "Target", "text": "0f8fad5b-d9cb-469f-a165-70867728950e" }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod model;
pub mod references;
pub mod schema;
pub mod serialization;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
