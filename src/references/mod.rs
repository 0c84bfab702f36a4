//! Step references: inline-or-reference decisions and identity reconciliation.
//!
//! A step can be reachable from several places in a document: from the
//! ownership list of its parent, from a step-typed field of another step, or
//! from a step list that is not the ownership list. It must be persisted
//! exactly once, at its ownership position, and referenced by identity
//! everywhere else. [`StepReferenceSerializer`] is the chain plugin that makes
//! this happen in both directions.
//!
//! # Writing
//!
//! The plugin looks at the innermost object being written and the member it is
//! writing:
//!
//! - the member is step-typed: the step is written as its identity
//! - the member is a step list other than the ownership list, declared on a
//!   step type: each step is written as its identity
//! - anything else (ownership list, document root, lists declared on non-step
//!   containers): the plugin declines and the generic serializer writes the
//!   step inline
//!
//! # Reading
//!
//! - an element without child elements whose text parses as an identity is a
//!   reference: resolution is deferred until the whole document has been walked,
//!   then looked up in the [`StepRegistry`]; a miss is a warning (unless errors
//!   are ignored) and leaves the destination unset
//! - a reference inside an ownership list is never resolved: it is reported
//!   as a warning and its item stays unset, since resolving it would give the
//!   step a second owner or make it own itself
//! - any other element is inline content: the plugin re-offers it to the chain
//!   to materialize the step, then reconciles identities in the new sub-tree
//!   with [`fixup_step`](StepReferenceSerializer::fixup_step)
//!
//! While an element is being expanded inline it is remembered, and the plugin
//! declines that same element if it is offered again before the expansion
//! finishes. That is what lets the re-offer reach the generic handler, and
//! what stops self-referential input from recursing forever.
//!
//! # Duplicate identities
//!
//! Merged or pasted content can carry identities that already exist. A step
//! whose identity is registered to a different node gets a fresh identity,
//! logged at debug level for synthesized step types and as a warning
//! otherwise. Identities seeded with
//! [`add_known_step_hierarchy`](StepReferenceSerializer::add_known_step_hierarchy)
//! are exempt: they are never reassigned and keep pointing at the
//! pre-existing step.

mod reconcile;
mod registry;


pub use registry::StepRegistry;

use anyhow::Result;
use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::constants::TYPE_ATTRIBUTE;
use crate::core::StepId;
use crate::model::{Element, NodeId, Value};
use crate::schema::TypeRef;
use crate::serialization::{Deserializer, Serializer, SerializerPlugin, Slot};

/// Identity of an element for the duration of a pass: its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ElementKey(usize);

impl ElementKey {
    fn of(element: &Element) -> Self {
        Self(std::ptr::from_ref(element) as usize)
    }
}

/// Chain plugin resolving step references. One instance per session.
#[derive(Debug, Default)]
pub struct StepReferenceSerializer {
    registry: Rc<RefCell<StepRegistry>>,
    expanding: RefCell<HashSet<ElementKey>>,
}

impl StepReferenceSerializer {
    /// Chain position: ahead of the generic serializer.
    pub const ORDER: i32 = 10;

    /// Create a plugin with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node registered under `id`.
    #[must_use]
    pub fn find_step(&self, id: StepId) -> Option<NodeId> {
        self.registry.borrow().lookup(id)
    }

    /// Read access to the registry.
    #[must_use]
    pub fn registry(&self) -> Ref<'_, StepRegistry> {
        self.registry.borrow()
    }

    /// Number of elements currently being expanded inline.
    #[must_use]
    pub fn expanding_len(&self) -> usize {
        self.expanding.borrow().len()
    }

    /// The member `slot` points into, if it is an ownership list.
    ///
    /// A step is owned in exactly one place, so a reference there would either
    /// own a step twice or make a step own itself.
    fn ownership_member(ctx: &Deserializer<'_>, slot: &Slot) -> Option<String> {
        let Slot::Item {
            owner,
            member,
            ..
        } = slot
        else {
            return None;
        };
        let schema = ctx.schema();
        let ty = ctx.document().get(*owner)?.ty;
        schema
            .member(ty, member)
            .filter(|m| schema.is_ownership_list(m.ty))
            .map(|m| m.name.clone())
    }

    fn defer_reference(ctx: &mut Deserializer<'_>, registry: Rc<RefCell<StepRegistry>>, target: StepId, slot: Slot) {
        ctx.defer_load(move |ctx: &mut Deserializer<'_>| {
            let found = registry.borrow().lookup(target);
            match found {
                Some(node) => ctx.assign(&slot, Value::Node(node))?,
                None if ctx.ignore_errors() => {
                    tracing::debug!("Ignoring unresolved step reference {target}");
                }
                None => ctx.diagnostics_mut().warn(format!("Unable to resolve step reference {target}")),
            }
            Ok(())
        });
    }
}

impl SerializerPlugin for StepReferenceSerializer {
    fn name(&self) -> &'static str {
        "step-reference"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn deserialize(
        &self,
        ctx: &mut Deserializer<'_>,
        element: &Element,
        expected: TypeRef,
        slot: &Slot,
    ) -> Result<bool> {
        if !ctx.schema().is_step(expected) {
            return Ok(false);
        }

        if !element.has_elements()
            && let Some(target) = StepId::parse(element.value())
        {
            if let Some(member) = Self::ownership_member(ctx, slot) {
                ctx.diagnostics_mut().warn(format!(
                    "Step reference {target} in ownership list '{member}' was not resolved; owned steps must be written inline"
                ));
                return Ok(true);
            }
            Self::defer_reference(ctx, Rc::clone(&self.registry), target, slot.clone());
            return Ok(true);
        }

        let key = ElementKey::of(element);
        if !self.expanding.borrow_mut().insert(key) {
            tracing::debug!("Element '{}' is already being expanded; declining", element.name);
            return Ok(false);
        }
        let result = ctx.deserialize_value(element, expected);
        self.expanding.borrow_mut().remove(&key);

        match result? {
            Some(Value::Node(node)) => {
                self.fixup_step(ctx, node, true)?;
                ctx.assign(slot, Value::Node(node))?;
            }
            Some(other) => ctx.assign(slot, other)?,
            None => {}
        }
        Ok(true)
    }

    fn serialize(
        &self,
        ctx: &mut Serializer<'_>,
        element: &mut Element,
        value: &Value,
        _expected: TypeRef,
    ) -> Result<bool> {
        let Value::Node(handle) = value else {
            return Ok(false);
        };
        let schema = ctx.schema();
        let node = ctx.document().try_get(*handle)?;
        if !schema.is_step(node.ty) {
            return Ok(false);
        }
        let Some(id) = node.id else {
            return Ok(false);
        };
        let Some(member) = ctx.current_frame().and_then(|frame| frame.member.as_ref()) else {
            return Ok(false);
        };

        let step_field = schema.is_step(member.ty);
        let step_list = schema.list_element(member.ty).is_some_and(|item| schema.is_step(item))
            && !schema.is_ownership_list(member.ty)
            && schema.is_step(member.declaring);
        if !step_field && !step_list {
            return Ok(false);
        }

        element.remove_attribute(TYPE_ATTRIBUTE);
        element.text = Some(id.to_string());
        Ok(true)
    }
}
