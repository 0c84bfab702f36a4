//! Registry seeding and duplicate-identity repair.

use anyhow::Result;

use super::StepReferenceSerializer;
use crate::core::StepId;
use crate::model::{Document, NodeId};
use crate::schema::Schema;
use crate::serialization::{Deserializer, Diagnostics};

impl StepReferenceSerializer {
    /// Register every step owned (directly or not) by `root` and exempt their
    /// identities from reassignment.
    ///
    /// `root` itself is not registered; it is usually the plan container. Call
    /// this before deserializing content into an existing document (a paste),
    /// so identities the new content happens to share with the live tree are
    /// not treated as collisions.
    pub fn add_known_step_hierarchy(&self, schema: &Schema, document: &Document, root: NodeId) {
        let mut registry = self.registry.borrow_mut();
        let mut count = 0usize;
        for node in document.descendants(schema, root) {
            let step = &document[node];
            let Some(id) = step.id.filter(|_| schema.is_step(step.ty)) else {
                continue;
            };
            registry.register(id, node);
            registry.ignore(id);
            count += 1;
        }
        tracing::debug!("Seeded step registry with {count} known step(s)");
    }

    /// Reconcile the identity of `node` and, if `recurse`, of its owned
    /// sub-tree in pre-order.
    ///
    /// A step whose identity is already registered to a different node, and
    /// is not exempt, gets a fresh identity. The (possibly new) identity is then
    /// registered to the node. An exempt identity that is already registered to
    /// another node keeps its earlier registration.
    pub fn fixup_step(&self, ctx: &mut Deserializer<'_>, node: NodeId, recurse: bool) -> Result<()> {
        let (schema, document, diagnostics) = ctx.parts_mut();
        self.reconcile(schema, document, diagnostics, node, recurse)
    }

    /// [`fixup_step`](Self::fixup_step) outside of a deserialization pass.
    pub fn reconcile(
        &self,
        schema: &Schema,
        document: &mut Document,
        diagnostics: &mut Diagnostics,
        node: NodeId,
        recurse: bool,
    ) -> Result<()> {
        let ty = document.try_get(node)?.ty;
        if let Some(id) = document[node].id.filter(|_| schema.is_step(ty)) {
            let mut registry = self.registry.borrow_mut();
            let existing = registry.lookup(id).filter(|other| *other != node);
            match existing {
                Some(_) if registry.is_ignored(id) => {
                    tracing::debug!("Step id {id} is known from the existing tree; keeping both");
                }
                Some(_) => {
                    let fresh = StepId::new();
                    document.set_step_id(node, fresh)?;
                    let message = format!(
                        "Duplicate step id {id} on '{}', assigned new id {fresh}",
                        schema.name(ty)
                    );
                    if schema.is_synthesized(ty) {
                        diagnostics.debug(message);
                    } else {
                        diagnostics.warn(message);
                    }
                    registry.register(fresh, node);
                }
                None => {
                    registry.register(id, node);
                }
            }
        }

        if recurse {
            for child in document.children(schema, node) {
                self.reconcile(schema, document, diagnostics, child, true)?;
            }
        }
        Ok(())
    }
}
