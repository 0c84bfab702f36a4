//! Type-descriptor table for serialized step trees.
//!
//! The serializers never reflect on values at runtime. Every "is this a step?",
//! "is this the ownership list?" or "does this type derive from that one?"
//! question is answered from a [`Schema`], a table built once by
//! [`SchemaBuilder`] and shared by every pass that uses it.
//!
//! # Built-in types
//!
//! | Name       | Kind                                                   |
//! |------------|--------------------------------------------------------|
//! | `bool`     | scalar                                                 |
//! | `int`      | scalar (64-bit signed)                                 |
//! | `float`    | scalar (64-bit)                                        |
//! | `string`   | scalar                                                 |
//! | `Step`     | abstract step base with member `ChildTestSteps`        |
//! | `StepList` | the canonical ownership list, element type `Step`      |
//!
//! User object types derive from a base and inherit its members and
//! capabilities. Deriving (directly or not) from `Step` makes a type
//! step-capable; `synthesized` marks step variants that are generated at
//! runtime rather than authored, whose identity collisions are expected.
//!
//! # Example
//!
//! ```rust
//! use stepref::schema::SchemaBuilder;
//!
//! let schema = SchemaBuilder::new()
//!     .step("Delay", &[("Seconds", "float")])
//!     .list("StepRefs", "Step")
//!     .step("Sweep", &[("Target", "Step"), ("Extra", "StepRefs")])
//!     .object("TestPlan", None, &[("Steps", "StepList")])
//!     .build()
//!     .unwrap();
//!
//! let delay = schema.lookup("Delay").unwrap();
//! assert!(schema.is_step(delay));
//! assert!(schema.descends_to(delay, schema.step_type()));
//! ```

mod builder;
pub mod file;


pub use builder::{MemberDeclaration, SchemaBuilder, TypeDeclaration};

use std::collections::HashMap;

/// Handle to a type in a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(usize);

impl TypeRef {
    /// Position of the type in its schema's table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Scalar value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `true` / `false`
    Bool,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    /// Free text
    Text,
}

impl ScalarKind {
    /// Schema name of the scalar type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "int",
            Self::Float => "float",
            Self::Text => "string",
        }
    }
}

/// A member of an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member name, also the element name it serializes under.
    pub name: String,
    /// Declared type of the member.
    pub ty: TypeRef,
    /// The type that declared the member (differs from the owner for inherited members).
    pub declaring: TypeRef,
}

/// What kind of values a type describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A scalar serialized as element text.
    Scalar(ScalarKind),
    /// A structured object. `members` includes inherited members, base first.
    Object {
        /// All members, inherited ones first.
        members: Vec<Member>,
        /// Step-capable: participates in identity tracking.
        step: bool,
        /// Dynamically synthesized step variant.
        synthesized: bool,
    },
    /// A homogeneous sequence.
    List {
        /// Element type.
        element: TypeRef,
        /// True only for the canonical ownership child list.
        ownership: bool,
    },
}

/// One entry of the type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Direct base type, for object types.
    pub base: Option<TypeRef>,
    /// Kind and kind-specific data.
    pub kind: TypeKind,
}

/// Immutable type-descriptor table.
#[derive(Debug, Clone)]
pub struct Schema {
    types: Vec<TypeDescriptor>,
    by_name: HashMap<String, TypeRef>,
    step: TypeRef,
    step_list: TypeRef,
}

impl Schema {
    /// Resolve a type by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.by_name.get(name).copied()
    }

    /// The descriptor for `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` was produced by a different schema.
    #[must_use]
    pub fn descriptor(&self, ty: TypeRef) -> &TypeDescriptor {
        &self.types[ty.0]
    }

    /// Name of `ty`.
    #[must_use]
    pub fn name(&self, ty: TypeRef) -> &str {
        &self.descriptor(ty).name
    }

    /// Kind of `ty`.
    #[must_use]
    pub fn kind(&self, ty: TypeRef) -> &TypeKind {
        &self.descriptor(ty).kind
    }

    /// Number of types, built-ins included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false: built-ins are present in every schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The built-in `Step` base type.
    #[must_use]
    pub const fn step_type(&self) -> TypeRef {
        self.step
    }

    /// The built-in canonical ownership list type.
    #[must_use]
    pub const fn child_list_type(&self) -> TypeRef {
        self.step_list
    }

    /// Members of an object type, inherited ones first. Empty for other kinds.
    #[must_use]
    pub fn members(&self, ty: TypeRef) -> &[Member] {
        match self.kind(ty) {
            TypeKind::Object {
                members,
                ..
            } => members,
            _ => &[],
        }
    }

    /// Look up a member of an object type by name.
    #[must_use]
    pub fn member(&self, ty: TypeRef, name: &str) -> Option<&Member> {
        self.members(ty).iter().find(|m| m.name == name)
    }

    /// Whether values of `ty` are steps.
    #[must_use]
    pub fn is_step(&self, ty: TypeRef) -> bool {
        matches!(
            self.kind(ty),
            TypeKind::Object {
                step: true,
                ..
            }
        )
    }

    /// Whether `ty` is a dynamically synthesized step variant.
    #[must_use]
    pub fn is_synthesized(&self, ty: TypeRef) -> bool {
        matches!(
            self.kind(ty),
            TypeKind::Object {
                synthesized: true,
                ..
            }
        )
    }

    /// Whether `ty` is an object type (steps included).
    #[must_use]
    pub fn is_object(&self, ty: TypeRef) -> bool {
        matches!(self.kind(ty), TypeKind::Object { .. })
    }

    /// Whether `ty` is the canonical ownership child list.
    #[must_use]
    pub fn is_ownership_list(&self, ty: TypeRef) -> bool {
        matches!(
            self.kind(ty),
            TypeKind::List {
                ownership: true,
                ..
            }
        )
    }

    /// Element type of a list type.
    #[must_use]
    pub fn list_element(&self, ty: TypeRef) -> Option<TypeRef> {
        match self.kind(ty) {
            TypeKind::List {
                element,
                ..
            } => Some(*element),
            _ => None,
        }
    }

    /// Whether `ty` is `base` or derives from it.
    #[must_use]
    pub fn descends_to(&self, ty: TypeRef, base: TypeRef) -> bool {
        let mut current = Some(ty);
        while let Some(t) = current {
            if t == base {
                return true;
            }
            current = self.descriptor(t).base;
        }
        false
    }

    /// All type handles in declaration order.
    pub fn types(&self) -> impl Iterator<Item = TypeRef> + '_ {
        (0..self.types.len()).map(TypeRef)
    }
}
