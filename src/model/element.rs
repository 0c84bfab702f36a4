//! Wire elements.
//!
//! An [`Element`] is the serialized form of one value: a name, attributes,
//! optional text and child elements. Whether an element holds child elements
//! is significant: a step element with no children whose text parses as a
//! [`StepId`](crate::core::StepId) is a reference, anything else is inline content.
//!
//! Elements are stored on disk as JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One node of the serialized tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element name (member name, list item type name or root name).
    pub name: String,
    /// Attributes such as `type` and `id`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: set the text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: append a child.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Whether the element has child elements.
    #[must_use]
    pub fn has_elements(&self) -> bool {
        !self.children.is_empty()
    }

    /// Text content, empty when absent.
    #[must_use]
    pub fn value(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// First child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first iterator over this element and all descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Element> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Parse an element tree from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode the element tree as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let text =
            if pretty { serde_json::to_string_pretty(self)? } else { serde_json::to_string(self)? };
        Ok(text)
    }

    /// Read an element tree from a JSON file.
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to parse document {}", path.display()))
    }

    /// Write the element tree to a JSON file.
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<()> {
        let mut text = self.to_json(pretty)?;
        text.push('\n');
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write document {}", path.display()))
    }
}
