//! Generic fallback serializer for scalars, lists and objects.

use anyhow::Result;

use super::{Deserializer, Serializer, SerializerPlugin, Slot};
use crate::constants::{ID_ATTRIBUTE, TYPE_ATTRIBUTE};
use crate::core::{StepId, StepRefError};
use crate::model::{Element, Node, NodeId, Value};
use crate::schema::{ScalarKind, TypeKind, TypeRef};

/// Handles every value the schema can describe, with no notion of references.
///
/// - scalars are element text
/// - lists are one child element per item, named after the item type
/// - objects are one child element per non-null member; steps carry an `id`
///   attribute, and a step element without one gets a fresh identity
///
/// It sits last in the chain and claims everything it is offered.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Chain position: after every specialised plugin.
    pub const ORDER: i32 = 1000;

    fn deserialize_list(
        ctx: &mut Deserializer<'_>,
        element: &Element,
        item_ty: TypeRef,
        slot: &Slot,
    ) -> Result<()> {
        if let Slot::Field {
            owner,
            member,
        } = slot
        {
            // Placeholders first so deferred items can land at their index later.
            ctx.assign(slot, Value::List(vec![Value::Null; element.children.len()]))?;
            for (index, child) in element.children.iter().enumerate() {
                let item = Slot::Item {
                    owner: *owner,
                    member: member.clone(),
                    index,
                };
                ctx.deserialize(child, item_ty, &item)?;
            }
            return Ok(());
        }

        let mut items = Vec::with_capacity(element.children.len());
        for child in &element.children {
            items.push(ctx.deserialize_value(child, item_ty)?.unwrap_or_default());
        }
        ctx.assign(slot, Value::List(items))
    }

    fn deserialize_object(
        ctx: &mut Deserializer<'_>,
        element: &Element,
        expected: TypeRef,
        slot: &Slot,
    ) -> Result<()> {
        let schema = ctx.schema();
        let ty = match element.attribute(TYPE_ATTRIBUTE) {
            Some(name) => {
                let ty = schema.lookup(name).ok_or_else(|| StepRefError::UnknownType {
                    name: name.to_string(),
                })?;
                if !schema.descends_to(ty, expected) {
                    return Err(StepRefError::TypeMismatch {
                        element: element.name.clone(),
                        expected: schema.name(expected).to_string(),
                        actual: name.to_string(),
                    }
                    .into());
                }
                ty
            }
            None => expected,
        };

        let node = if schema.is_step(ty) {
            let id = match element.attribute(ID_ATTRIBUTE).and_then(StepId::parse) {
                Some(id) => id,
                None => {
                    let id = StepId::new();
                    tracing::debug!("Step element '{}' has no id, assigned {id}", element.name);
                    id
                }
            };
            Node::step(ty, id)
        } else {
            Node::object(ty)
        };
        let handle = ctx.document_mut().add(node);

        for child in &element.children {
            let Some(member) = schema.member(ty, &child.name) else {
                tracing::debug!("Skipping unknown member '{}' on '{}'", child.name, schema.name(ty));
                continue;
            };
            let slot = Slot::Field {
                owner: handle,
                member: member.name.clone(),
            };
            ctx.deserialize(child, member.ty, &slot)?;
        }

        ctx.assign(slot, Value::Node(handle))
    }

    fn serialize_object(
        ctx: &mut Serializer<'_>,
        element: &mut Element,
        handle: NodeId,
    ) -> Result<()> {
        let schema = ctx.schema();
        let node = ctx.document().try_get(handle)?;
        if let Some(id) = node.id {
            element.set_attribute(ID_ATTRIBUTE, id.to_string());
        }

        ctx.push_frame(handle, node.ty);
        let result = (|| -> Result<()> {
            for member in schema.members(node.ty) {
                let Some(value) = node.field(&member.name).filter(|v| !v.is_null()) else {
                    continue;
                };
                ctx.set_current_member(Some(member.clone()));
                let mut child = Element::new(member.name.clone());
                ctx.serialize(&mut child, value, member.ty)?;
                element.children.push(child);
            }
            Ok(())
        })();
        ctx.pop_frame();
        result
    }
}

impl SerializerPlugin for ObjectSerializer {
    fn name(&self) -> &'static str {
        "object"
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
        match ctx.schema().kind(expected) {
            TypeKind::Scalar(kind) => {
                let value = parse_scalar(element, *kind)?;
                ctx.assign(slot, value)?;
            }
            TypeKind::List {
                element: item_ty,
                ..
            } => Self::deserialize_list(ctx, element, *item_ty, slot)?,
            TypeKind::Object {
                ..
            } => Self::deserialize_object(ctx, element, expected, slot)?,
        }
        Ok(true)
    }

    fn serialize(
        &self,
        ctx: &mut Serializer<'_>,
        element: &mut Element,
        value: &Value,
        expected: TypeRef,
    ) -> Result<bool> {
        let schema = ctx.schema();
        match (schema.kind(expected), value) {
            (_, Value::Null) => {}
            (TypeKind::Scalar(kind), scalar) => {
                let text = scalar_text(*kind, scalar).ok_or_else(|| StepRefError::ValueShapeMismatch {
                    expected: schema.name(expected).to_string(),
                    found: scalar.describe().to_string(),
                })?;
                element.text = Some(text);
            }
            (
                TypeKind::List {
                    element: item_ty,
                    ..
                },
                Value::List(items),
            ) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    let mut child = Element::new(schema.name(*item_ty));
                    ctx.serialize(&mut child, item, *item_ty)?;
                    element.children.push(child);
                }
            }
            (
                TypeKind::Object {
                    ..
                },
                Value::Node(handle),
            ) => Self::serialize_object(ctx, element, *handle)?,
            (_, other) => {
                return Err(StepRefError::ValueShapeMismatch {
                    expected: schema.name(expected).to_string(),
                    found: other.describe().to_string(),
                }
                .into());
            }
        }
        Ok(true)
    }
}

fn parse_scalar(element: &Element, kind: ScalarKind) -> Result<Value, StepRefError> {
    let raw = element.value();
    let text = raw.trim();
    let parsed = match kind {
        ScalarKind::Text => return Ok(Value::Text(raw.to_string())),
        _ if text.is_empty() => return Ok(Value::Null),
        ScalarKind::Bool => text.parse().ok().map(Value::Bool),
        ScalarKind::Integer => text.parse().ok().map(Value::Integer),
        ScalarKind::Float => text.parse().ok().map(Value::Float),
    };
    parsed.ok_or_else(|| StepRefError::InvalidValue {
        element: element.name.clone(),
        expected: kind.name().to_string(),
        value: raw.to_string(),
    })
}

fn scalar_text(kind: ScalarKind, value: &Value) -> Option<String> {
    match (kind, value) {
        (ScalarKind::Bool, Value::Bool(b)) => Some(b.to_string()),
        (ScalarKind::Integer, Value::Integer(i)) => Some(i.to_string()),
        (ScalarKind::Float, Value::Float(f)) => Some(f.to_string()),
        (ScalarKind::Text, Value::Text(s)) => Some(s.clone()),
        _ => None,
    }
}
