//! Host walker: a priority-ordered chain of serializer plugins.
//!
//! Serialization and deserialization are driven by a chain of
//! [`SerializerPlugin`]s. For every element (or value) the walker offers it to
//! each plugin in ascending [`order`](SerializerPlugin::order) until one claims
//! it by returning `Ok(true)`. A plugin that returns `Ok(false)` declines and
//! the chain continues. A plugin may re-offer the same element to the whole
//! chain (for example to delegate to the generic handler); it is the plugin's
//! job not to claim it again while its own expansion is still running.
//!
//! # Components
//!
//! - [`Deserializer`] - builds a [`Document`](crate::model::Document) from an
//!   [`Element`] tree, with a deferred queue that runs once after the walk
//! - [`Serializer`] - writes a document to an element tree, keeping a stack of
//!   the objects currently being written so plugins can see their context
//! - [`ObjectSerializer`] - the generic fallback for scalars, lists and objects
//! - [`PlanSerializer`] - the session facade wiring the default chain
//! - [`Diagnostics`] - non-fatal findings recorded during a pass
//!
//! # Result setters
//!
//! Where a deserialized value goes is described by a [`Slot`] rather than a
//! closure, so deferred actions never hold references into objects that are
//! still being built.

mod deserializer;
mod diagnostics;
mod object;
mod serializer;
pub mod session;

#[cfg(test)]
mod tests;

pub use deserializer::{DeferredLoad, Deserializer};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use object::ObjectSerializer;
pub use serializer::{Frame, Serializer};
pub use session::{LoadedPlan, PastedStep, PlanSerializer};

use anyhow::Result;
use std::rc::Rc;

use crate::model::{Element, NodeId, Value};
use crate::schema::TypeRef;

/// Destination of a deserialized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// The document root.
    Root,
    /// A capture opened by [`Deserializer::deserialize_value`].
    Capture(usize),
    /// A member of a node.
    Field {
        /// Node owning the member.
        owner: NodeId,
        /// Member name.
        member: String,
    },
    /// One item of a list member of a node.
    Item {
        /// Node owning the list member.
        owner: NodeId,
        /// Member name.
        member: String,
        /// Item position.
        index: usize,
    },
}

/// One link of the serializer chain.
pub trait SerializerPlugin {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Position in the chain; lower values are tried first.
    fn order(&self) -> i32 {
        0
    }

    /// Try to deserialize `element` as `expected` into `slot`.
    ///
    /// Returns `Ok(true)` if the element was claimed, `Ok(false)` to decline.
    fn deserialize(
        &self,
        ctx: &mut Deserializer<'_>,
        element: &Element,
        expected: TypeRef,
        slot: &Slot,
    ) -> Result<bool>;

    /// Try to serialize `value`, declared as `expected`, into `element`.
    ///
    /// Returns `Ok(true)` if the value was claimed, `Ok(false)` to decline.
    fn serialize(
        &self,
        ctx: &mut Serializer<'_>,
        element: &mut Element,
        value: &Value,
        expected: TypeRef,
    ) -> Result<bool>;
}

/// Shared handle to a plugin.
pub type PluginRef = Rc<dyn SerializerPlugin>;

/// Sort plugins into chain order. Plugins with equal order keep their relative order.
#[must_use]
pub fn sort_chain(mut plugins: Vec<PluginRef>) -> Vec<PluginRef> {
    plugins.sort_by_key(|p| p.order());
    plugins
}
