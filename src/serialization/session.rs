//! Session facade over the default serializer chain.

use anyhow::{Result, anyhow};
use std::rc::Rc;

use super::{Deserializer, Diagnostics, ObjectSerializer, PluginRef, Serializer, sort_chain};
use crate::config::Settings;
use crate::constants::TYPE_ATTRIBUTE;
use crate::core::{StepId, StepRefError};
use crate::model::{Document, Element, NodeId, Value};
use crate::references::StepReferenceSerializer;
use crate::schema::Schema;

/// Result of [`PlanSerializer::load`].
#[derive(Debug)]
pub struct LoadedPlan {
    /// The materialized document.
    pub document: Document,
    /// Its root node.
    pub root: NodeId,
    /// Findings of the pass.
    pub diagnostics: Diagnostics,
}

/// Result of [`PlanSerializer::paste`].
#[derive(Debug)]
pub struct PastedStep {
    /// The document with the pasted step attached.
    pub document: Document,
    /// The pasted step.
    pub step: NodeId,
    /// Findings of the pass.
    pub diagnostics: Diagnostics,
}

/// One serialization session.
///
/// Owns the chain: a [`StepReferenceSerializer`] ahead of the generic
/// [`ObjectSerializer`], plus any extra plugins. The reference plugin's
/// registry lives as long as the session, so use one `PlanSerializer` per
/// load, save or paste and do not share it between unrelated documents.
pub struct PlanSerializer {
    schema: Schema,
    settings: Settings,
    references: Rc<StepReferenceSerializer>,
    plugins: Vec<PluginRef>,
}

impl PlanSerializer {
    /// Create a session with the default chain.
    #[must_use]
    pub fn new(schema: Schema, settings: Settings) -> Self {
        let references = Rc::new(StepReferenceSerializer::new());
        let plugins = sort_chain(vec![
            Rc::clone(&references) as PluginRef,
            Rc::new(ObjectSerializer) as PluginRef,
        ]);
        Self {
            schema,
            settings,
            references,
            plugins,
        }
    }

    /// Add a plugin to the chain at its order.
    #[must_use]
    pub fn with_plugin(mut self, plugin: PluginRef) -> Self {
        self.plugins.push(plugin);
        self.plugins = sort_chain(self.plugins);
        self
    }

    /// The schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The reference plugin of this session.
    #[must_use]
    pub fn references(&self) -> &StepReferenceSerializer {
        &self.references
    }

    /// Node registered under `id` in this session.
    #[must_use]
    pub fn find_step(&self, id: StepId) -> Option<NodeId> {
        self.references.find_step(id)
    }

    /// Start a deserialization pass over `document` with this session's chain.
    #[must_use]
    pub fn deserializer(&self, document: Document) -> Deserializer<'_> {
        let mut de = Deserializer::with_document(&self.schema, self.plugins.clone(), document);
        de.set_ignore_errors(self.settings.ignore_errors);
        de
    }

    /// Load a document whose root element carries its `type` attribute.
    pub fn load(&self, element: &Element) -> Result<LoadedPlan> {
        let type_name = element
            .attribute(TYPE_ATTRIBUTE)
            .ok_or_else(|| anyhow!("Root element '{}' has no '{TYPE_ATTRIBUTE}' attribute", element.name))?;
        let expected = self.schema.lookup(type_name).ok_or_else(|| StepRefError::UnknownType {
            name: type_name.to_string(),
        })?;

        let mut de = self.deserializer(Document::new());
        let root = de.load(element, expected)?;
        let (document, diagnostics) = de.into_parts();
        let Some(Value::Node(root)) = root else {
            return Err(anyhow!("Root element '{}' did not produce an object", element.name));
        };
        tracing::debug!(
            "Loaded '{}' with {} node(s), {} warning(s)",
            element.name,
            document.len(),
            diagnostics.warning_count()
        );
        Ok(LoadedPlan {
            document,
            root,
            diagnostics,
        })
    }

    /// Write `document` from its root.
    pub fn save(&self, document: &Document) -> Result<Element> {
        let mut ser = Serializer::new(&self.schema, self.plugins.clone(), document);
        ser.serialize_root(&self.settings.root_element)
    }

    /// Paste a step element into an existing document.
    ///
    /// Steps already in the document are seeded into the registry first, so
    /// identities the fragment shares with them are kept rather than treated
    /// as collisions. The new step is appended to `parent`'s ownership list,
    /// or to the root's when `parent` is `None`.
    pub fn paste(
        &self,
        document: Document,
        parent: Option<NodeId>,
        fragment: &Element,
    ) -> Result<PastedStep> {
        let root = document.root().ok_or_else(|| anyhow!("Cannot paste into a document without a root"))?;
        let parent = parent.unwrap_or(root);
        self.references.add_known_step_hierarchy(&self.schema, &document, root);

        let mut de = self.deserializer(document);
        let value = de.deserialize_value(fragment, self.schema.step_type())?;
        de.flush_deferred()?;
        let (mut document, diagnostics) = de.into_parts();

        let Some(Value::Node(step)) = value else {
            return Err(anyhow!("Fragment '{}' is not an inline step", fragment.name));
        };
        document.add_child(&self.schema, parent, step)?;
        Ok(PastedStep {
            document,
            step,
            diagnostics,
        })
    }
}
