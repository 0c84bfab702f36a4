//! In-memory step trees.
//!
//! A [`Document`] is an arena of [`Node`]s addressed by [`NodeId`]. Nodes hold
//! their member values by name; a member value that points at another node is a
//! [`Value::Node`] regardless of whether the position owns that node (an
//! ownership-list member) or merely aliases it (a step-typed field or a
//! non-ownership step list). Ownership is decided by the schema, never by the
//! value, which is what lets one node be reachable from several places while
//! being persisted at exactly one of them.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use crate::core::{StepId, StepRefError};
use crate::schema::{Schema, TypeRef};

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its document's arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A member value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or unresolved.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Float scalar.
    Float(f64),
    /// Text scalar.
    Text(String),
    /// A node of the same document.
    Node(NodeId),
    /// A sequence.
    List(Vec<Value>),
}

impl Value {
    /// The node handle, if this value is one.
    #[must_use]
    pub const fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether the value is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short description used in error messages.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a bool",
            Self::Integer(_) => "an integer",
            Self::Float(_) => "a float",
            Self::Text(_) => "text",
            Self::Node(_) => "an object",
            Self::List(_) => "a list",
        }
    }
}

/// An object instance. Steps carry an identity, other objects do not.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Runtime type.
    pub ty: TypeRef,
    /// Identity, for steps.
    pub id: Option<StepId>,
    /// Member values by member name.
    pub fields: BTreeMap<String, Value>,
}

impl Node {
    /// A non-step object.
    #[must_use]
    pub const fn object(ty: TypeRef) -> Self {
        Self {
            ty,
            id: None,
            fields: BTreeMap::new(),
        }
    }

    /// A step with the given identity.
    #[must_use]
    pub const fn step(ty: TypeRef, id: StepId) -> Self {
        Self {
            ty,
            id: Some(id),
            fields: BTreeMap::new(),
        }
    }

    /// Builder: set a member value.
    #[must_use]
    pub fn with_field(mut self, member: impl Into<String>, value: Value) -> Self {
        self.fields.insert(member.into(), value);
        self
    }

    /// Member value by name.
    #[must_use]
    pub fn field(&self, member: &str) -> Option<&Value> {
        self.fields.get(member)
    }
}

/// Arena of nodes with an optional root.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its handle.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Node by handle.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Mutable node by handle.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Node by handle, or [`StepRefError::UnknownNode`].
    pub fn try_get(&self, id: NodeId) -> Result<&Node, StepRefError> {
        self.get(id).ok_or(StepRefError::UnknownNode {
            index: id.0,
        })
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the root node.
    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Identity of a step node.
    #[must_use]
    pub fn step_id(&self, node: NodeId) -> Option<StepId> {
        self.get(node).and_then(|n| n.id)
    }

    /// Replace the identity of a node.
    pub fn set_step_id(&mut self, node: NodeId, id: StepId) -> Result<(), StepRefError> {
        let index = node.0;
        let node = self.get_mut(node).ok_or(StepRefError::UnknownNode {
            index,
        })?;
        node.id = Some(id);
        Ok(())
    }

    /// First node carrying `id`, scanning the arena in insertion order.
    #[must_use]
    pub fn find_by_id(&self, id: StepId) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.id == Some(id)).map(|(handle, _)| handle)
    }

    /// Set a member value.
    pub fn set_field(
        &mut self,
        owner: NodeId,
        member: &str,
        value: Value,
    ) -> Result<(), StepRefError> {
        let node = self.get_mut(owner).ok_or(StepRefError::UnknownNode {
            index: owner.0,
        })?;
        node.fields.insert(member.to_string(), value);
        Ok(())
    }

    /// Set one item of a list member. The list must already hold `index`.
    pub fn set_item(
        &mut self,
        owner: NodeId,
        member: &str,
        index: usize,
        value: Value,
    ) -> Result<(), StepRefError> {
        let node = self.get_mut(owner).ok_or(StepRefError::UnknownNode {
            index: owner.0,
        })?;
        match node.fields.get_mut(member) {
            Some(Value::List(items)) if index < items.len() => {
                items[index] = value;
                Ok(())
            }
            _ => Err(StepRefError::Other {
                message: format!("Member '{member}' has no list item #{index}"),
            }),
        }
    }

    /// Owned children of a node: the nodes held in its ownership-list members.
    #[must_use]
    pub fn children(&self, schema: &Schema, node: NodeId) -> Vec<NodeId> {
        let Some(n) = self.get(node) else {
            return Vec::new();
        };
        schema
            .members(n.ty)
            .iter()
            .filter(|m| schema.is_ownership_list(m.ty))
            .filter_map(|m| match n.fields.get(&m.name) {
                Some(Value::List(items)) => Some(items.iter().filter_map(Value::as_node)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Every node owned (directly or not) by `node`, pre-order, excluding `node`.
    #[must_use]
    pub fn descendants(&self, schema: &Schema, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(schema, node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(schema, next).into_iter().rev());
        }
        out
    }

    /// Append `child` to the first ownership-list member of `parent`.
    pub fn add_child(
        &mut self,
        schema: &Schema,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), StepRefError> {
        let ty = self.try_get(parent)?.ty;
        let member = schema
            .members(ty)
            .iter()
            .find(|m| schema.is_ownership_list(m.ty))
            .ok_or_else(|| StepRefError::Other {
                message: format!("Type '{}' cannot own child steps", schema.name(ty)),
            })?;
        let node = self.get_mut(parent).ok_or(StepRefError::UnknownNode {
            index: parent.0,
        })?;
        match node.fields.entry(member.name.clone()).or_insert_with(|| Value::List(Vec::new())) {
            Value::List(items) => {
                items.push(Value::Node(child));
                Ok(())
            }
            other => Err(StepRefError::ValueShapeMismatch {
                expected: schema.name(member.ty).to_string(),
                found: other.describe().to_string(),
            }),
        }
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Document {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}
