//! Serialization pass.

use anyhow::Result;

use super::{Diagnostics, PluginRef};
use crate::constants::TYPE_ATTRIBUTE;
use crate::model::{Document, Element, NodeId, Value};
use crate::schema::{Member, Schema, TypeRef};

/// An object currently being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The object.
    pub object: NodeId,
    /// Its runtime type.
    pub ty: TypeRef,
    /// The member being written right now, if any.
    pub member: Option<Member>,
}

/// One serialization pass over a document.
pub struct Serializer<'s> {
    schema: &'s Schema,
    plugins: Vec<PluginRef>,
    document: &'s Document,
    frames: Vec<Frame>,
    diagnostics: Diagnostics,
}

impl<'s> Serializer<'s> {
    /// Create a pass. `plugins` must already be in chain order.
    #[must_use]
    pub fn new(schema: &'s Schema, plugins: Vec<PluginRef>, document: &'s Document) -> Self {
        Self {
            schema,
            plugins,
            document,
            frames: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The schema of this pass.
    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// The document being written.
    #[must_use]
    pub const fn document(&self) -> &'s Document {
        self.document
    }

    /// Findings so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The active frames, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The innermost object currently being written.
    #[must_use]
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Enter an object.
    pub fn push_frame(&mut self, object: NodeId, ty: TypeRef) {
        self.frames.push(Frame {
            object,
            ty,
            member: None,
        });
    }

    /// Leave the innermost object.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Record which member of the innermost object is being written.
    pub fn set_current_member(&mut self, member: Option<Member>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.member = member;
        }
    }

    /// Offer `value` to the chain until a plugin claims it.
    ///
    /// Objects whose runtime type differs from `expected` get a `type`
    /// attribute first; a plugin may remove it again.
    pub fn serialize(&mut self, element: &mut Element, value: &Value, expected: TypeRef) -> Result<bool> {
        if let Value::Node(handle) = value {
            let ty = self.document.try_get(*handle)?.ty;
            if ty != expected {
                element.set_attribute(TYPE_ATTRIBUTE, self.schema.name(ty));
            }
        }

        let plugins = self.plugins.clone();
        for plugin in &plugins {
            if plugin.serialize(self, element, value, expected)? {
                return Ok(true);
            }
        }

        self.diagnostics.warn(format!(
            "No serializer handled {} declared as '{}'",
            value.describe(),
            self.schema.name(expected)
        ));
        Ok(false)
    }

    /// Write the document root into a new element named `name`.
    ///
    /// The root always carries its `type` attribute so it can be loaded
    /// without knowing its type up front.
    pub fn serialize_root(&mut self, name: &str) -> Result<Element> {
        let mut element = Element::new(name);
        let Some(root) = self.document.root() else {
            return Ok(element);
        };
        let ty = self.document.try_get(root)?.ty;
        element.set_attribute(TYPE_ATTRIBUTE, self.schema.name(ty));
        self.serialize(&mut element, &Value::Node(root), ty)?;
        Ok(element)
    }

    /// Finish the pass.
    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}
