//! Deserialization pass.

use anyhow::Result;
use std::collections::VecDeque;

use super::{Diagnostics, PluginRef, Slot};
use crate::model::{Document, Element, Value};
use crate::schema::{Schema, TypeRef};

/// An action queued for after the tree walk.
pub type DeferredLoad = Box<dyn for<'a, 'b> FnOnce(&'a mut Deserializer<'b>) -> Result<()>>;

/// One deserialization pass over an element tree.
///
/// The pass owns the [`Document`] under construction. Values are delivered to
/// [`Slot`]s; forward references are queued with [`defer_load`](Self::defer_load)
/// and run by [`flush_deferred`](Self::flush_deferred) once the walk is over, so
/// every identity in the document is known before any of them is resolved.
pub struct Deserializer<'s> {
    schema: &'s Schema,
    plugins: Vec<PluginRef>,
    document: Document,
    ignore_errors: bool,
    deferred: VecDeque<DeferredLoad>,
    captures: Vec<Option<Value>>,
    root: Option<Value>,
    diagnostics: Diagnostics,
}

impl<'s> Deserializer<'s> {
    /// Create a pass building a new document. `plugins` must already be in chain order.
    #[must_use]
    pub fn new(schema: &'s Schema, plugins: Vec<PluginRef>) -> Self {
        Self::with_document(schema, plugins, Document::new())
    }

    /// Create a pass that adds to an existing document.
    #[must_use]
    pub fn with_document(schema: &'s Schema, plugins: Vec<PluginRef>, document: Document) -> Self {
        Self {
            schema,
            plugins,
            document,
            ignore_errors: false,
            deferred: VecDeque::new(),
            captures: Vec::new(),
            root: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Suppress non-fatal resolution warnings.
    pub fn set_ignore_errors(&mut self, ignore: bool) {
        self.ignore_errors = ignore;
    }

    /// Whether non-fatal resolution warnings are suppressed.
    #[must_use]
    pub const fn ignore_errors(&self) -> bool {
        self.ignore_errors
    }

    /// The schema of this pass.
    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// The document under construction.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document under construction.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Findings so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable access to the findings.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Split borrow of schema, document and findings.
    pub fn parts_mut(&mut self) -> (&'s Schema, &mut Document, &mut Diagnostics) {
        (self.schema, &mut self.document, &mut self.diagnostics)
    }

    /// Offer `element` to the chain until a plugin claims it.
    ///
    /// Errors raised by a plugin propagate unchanged. An element nobody claims
    /// is reported as a warning unless errors are ignored.
    pub fn deserialize(&mut self, element: &Element, expected: TypeRef, slot: &Slot) -> Result<bool> {
        let plugins = self.plugins.clone();
        for plugin in &plugins {
            if plugin.deserialize(self, element, expected, slot)? {
                tracing::trace!(
                    "{} handled element '{}' as '{}'",
                    plugin.name(),
                    element.name,
                    self.schema.name(expected)
                );
                return Ok(true);
            }
        }

        if !self.ignore_errors {
            self.diagnostics.warn(format!(
                "No serializer handled element '{}' of type '{}'",
                element.name,
                self.schema.name(expected)
            ));
        }
        Ok(false)
    }

    /// Run the chain on `element` and return the value it produced.
    ///
    /// Returns `None` when nothing was produced synchronously, either because no
    /// plugin claimed the element or because the value was deferred.
    pub fn deserialize_value(&mut self, element: &Element, expected: TypeRef) -> Result<Option<Value>> {
        let index = self.captures.len();
        self.captures.push(None);
        let result = self.deserialize(element, expected, &Slot::Capture(index));
        let captured = self.captures.pop().flatten();
        result?;
        Ok(captured)
    }

    /// Deliver a value to its destination.
    pub fn assign(&mut self, slot: &Slot, value: Value) -> Result<()> {
        match slot {
            Slot::Root => self.root = Some(value),
            Slot::Capture(index) => match self.captures.get_mut(*index) {
                Some(capture) => *capture = Some(value),
                None => tracing::debug!("Dropping value for closed capture #{index}"),
            },
            Slot::Field {
                owner,
                member,
            } => self.document.set_field(*owner, member, value)?,
            Slot::Item {
                owner,
                member,
                index,
            } => self.document.set_item(*owner, member, *index, value)?,
        }
        Ok(())
    }

    /// Queue an action to run after the tree walk.
    pub fn defer_load<F>(&mut self, action: F)
    where
        F: for<'a, 'b> FnOnce(&'a mut Deserializer<'b>) -> Result<()> + 'static,
    {
        self.deferred.push_back(Box::new(action));
    }

    /// Number of queued actions.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Drain the deferred queue, in queue order.
    pub fn flush_deferred(&mut self) -> Result<()> {
        if !self.deferred.is_empty() {
            tracing::debug!("Running {} deferred load action(s)", self.deferred.len());
        }
        while let Some(action) = self.deferred.pop_front() {
            action(self)?;
        }
        Ok(())
    }

    /// Walk `element` as the document root, then drain the deferred queue.
    ///
    /// A root object becomes the document's root node.
    pub fn load(&mut self, element: &Element, expected: TypeRef) -> Result<Option<Value>> {
        self.deserialize(element, expected, &Slot::Root)?;
        self.flush_deferred()?;
        let root = self.root.take();
        if let Some(Value::Node(node)) = &root {
            self.document.set_root(*node);
        }
        Ok(root)
    }

    /// Finish the pass.
    #[must_use]
    pub fn into_parts(self) -> (Document, Diagnostics) {
        (self.document, self.diagnostics)
    }
}
