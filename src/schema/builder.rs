//! Two-phase schema construction.
//!
//! Declarations are collected by name first and resolved in [`SchemaBuilder::build`],
//! so types may reference each other in any order, including forward references
//! and mutual references through members.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Member, ScalarKind, Schema, TypeDescriptor, TypeKind, TypeRef};
use crate::constants::{CHILD_STEPS_MEMBER, STEP_LIST_TYPE, STEP_TYPE};
use crate::core::StepRefError;

/// A member declaration: name plus type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDeclaration {
    /// Member name.
    pub name: String,
    /// Name of the member's type.
    #[serde(rename = "type")]
    pub ty: String,
}

/// A user type declaration.
///
/// Declares a list type when `list` is set, an object type otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Type name.
    pub name: String,
    /// Base type for object types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Element type name; makes this a list type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    /// Marks a dynamically synthesized step variant.
    #[serde(default)]
    pub synthesized: bool,
    /// Members declared directly on this type.
    #[serde(default)]
    pub members: Vec<MemberDeclaration>,
}

/// Builder for [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    declarations: Vec<TypeDeclaration>,
}

/// Object type data before inheritance is flattened.
struct PendingObject {
    base: Option<TypeRef>,
    own_members: Vec<Member>,
    step_root: bool,
    synthesized: bool,
}

/// Flattened object data.
#[derive(Clone)]
struct FlatObject {
    members: Vec<Member>,
    step: bool,
    synthesized: bool,
}

impl SchemaBuilder {
    /// Create a builder holding only the built-in types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw declaration.
    #[must_use]
    pub fn declare(mut self, declaration: TypeDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Declare an object type with an optional base.
    #[must_use]
    pub fn object(self, name: &str, base: Option<&str>, members: &[(&str, &str)]) -> Self {
        self.declare(TypeDeclaration {
            name: name.to_string(),
            base: base.map(str::to_string),
            members: member_declarations(members),
            ..TypeDeclaration::default()
        })
    }

    /// Declare an authored step type deriving from `Step`.
    #[must_use]
    pub fn step(self, name: &str, members: &[(&str, &str)]) -> Self {
        self.object(name, Some(STEP_TYPE), members)
    }

    /// Declare a dynamically synthesized step type deriving from `Step`.
    #[must_use]
    pub fn synthesized_step(self, name: &str, members: &[(&str, &str)]) -> Self {
        self.declare(TypeDeclaration {
            name: name.to_string(),
            base: Some(STEP_TYPE.to_string()),
            synthesized: true,
            members: member_declarations(members),
            ..TypeDeclaration::default()
        })
    }

    /// Declare a (non-ownership) list type.
    #[must_use]
    pub fn list(self, name: &str, element: &str) -> Self {
        self.declare(TypeDeclaration {
            name: name.to_string(),
            list: Some(element.to_string()),
            ..TypeDeclaration::default()
        })
    }

    /// Resolve all declarations into a [`Schema`].
    pub fn build(self) -> Result<Schema, StepRefError> {
        let mut names: Vec<String> = Vec::new();
        let mut by_name: HashMap<String, TypeRef> = HashMap::new();

        let builtins = ["bool", "int", "float", "string", STEP_TYPE, STEP_LIST_TYPE];
        for name in builtins.into_iter().map(str::to_string).chain(
            self.declarations.iter().map(|d| d.name.clone()),
        ) {
            if by_name.contains_key(&name) {
                return Err(StepRefError::DuplicateType {
                    name,
                });
            }
            by_name.insert(name.clone(), TypeRef(names.len()));
            names.push(name);
        }

        let resolve = |name: &str| -> Result<TypeRef, StepRefError> {
            by_name.get(name).copied().ok_or_else(|| StepRefError::UnknownType {
                name: name.to_string(),
            })
        };

        let step = resolve(STEP_TYPE)?;
        let step_list = resolve(STEP_LIST_TYPE)?;

        // Kinds that need no flattening are final right away; objects are pending.
        let mut kinds: Vec<Option<TypeKind>> = vec![
            Some(TypeKind::Scalar(ScalarKind::Bool)),
            Some(TypeKind::Scalar(ScalarKind::Integer)),
            Some(TypeKind::Scalar(ScalarKind::Float)),
            Some(TypeKind::Scalar(ScalarKind::Text)),
            None,
            Some(TypeKind::List {
                element: step,
                ownership: true,
            }),
        ];
        let mut pending: HashMap<TypeRef, PendingObject> = HashMap::new();
        pending.insert(
            step,
            PendingObject {
                base: None,
                own_members: vec![Member {
                    name: CHILD_STEPS_MEMBER.to_string(),
                    ty: step_list,
                    declaring: step,
                }],
                step_root: true,
                synthesized: false,
            },
        );

        for declaration in &self.declarations {
            let ty = resolve(&declaration.name)?;
            if let Some(element) = &declaration.list {
                kinds.push(Some(TypeKind::List {
                    element: resolve(element)?,
                    ownership: false,
                }));
                continue;
            }

            let base = declaration.base.as_deref().map(resolve).transpose()?;
            let own_members = declaration
                .members
                .iter()
                .map(|m| {
                    Ok(Member {
                        name: m.name.clone(),
                        ty: resolve(&m.ty)?,
                        declaring: ty,
                    })
                })
                .collect::<Result<Vec<_>, StepRefError>>()?;
            kinds.push(None);
            pending.insert(
                ty,
                PendingObject {
                    base,
                    own_members,
                    step_root: false,
                    synthesized: declaration.synthesized,
                },
            );
        }

        let mut flat: HashMap<TypeRef, FlatObject> = HashMap::new();
        let mut object_refs: Vec<TypeRef> = pending.keys().copied().collect();
        object_refs.sort();
        for ty in &object_refs {
            let mut visiting = Vec::new();
            flatten(*ty, &pending, &names, &mut flat, &mut visiting)?;
        }

        let mut bases: Vec<Option<TypeRef>> = vec![None; names.len()];
        for ty in object_refs {
            let object = &flat[&ty];
            bases[ty.0] = pending[&ty].base;
            kinds[ty.0] = Some(TypeKind::Object {
                members: object.members.clone(),
                step: object.step,
                synthesized: object.synthesized,
            });
        }

        let types = names
            .into_iter()
            .zip(kinds)
            .zip(bases)
            .map(|((name, kind), base)| {
                let kind = kind.ok_or_else(|| StepRefError::Other {
                    message: format!("Type '{name}' was declared but never resolved"),
                })?;
                Ok(TypeDescriptor {
                    name,
                    base,
                    kind,
                })
            })
            .collect::<Result<Vec<_>, StepRefError>>()?;

        Ok(Schema {
            types,
            by_name,
            step,
            step_list,
        })
    }
}

fn member_declarations(members: &[(&str, &str)]) -> Vec<MemberDeclaration> {
    members
        .iter()
        .map(|(name, ty)| MemberDeclaration {
            name: (*name).to_string(),
            ty: (*ty).to_string(),
        })
        .collect()
}

/// Flatten one object type, resolving its base chain first.
fn flatten(
    ty: TypeRef,
    pending: &HashMap<TypeRef, PendingObject>,
    names: &[String],
    flat: &mut HashMap<TypeRef, FlatObject>,
    visiting: &mut Vec<TypeRef>,
) -> Result<FlatObject, StepRefError> {
    if let Some(done) = flat.get(&ty) {
        return Ok(done.clone());
    }
    if visiting.contains(&ty) {
        let chain = visiting
            .iter()
            .chain(std::iter::once(&ty))
            .map(|t| names[t.0].as_str())
            .collect::<Vec<_>>()
            .join(" → ");
        return Err(StepRefError::CyclicBase {
            chain,
        });
    }

    let object = &pending[&ty];
    visiting.push(ty);
    let mut result = match object.base {
        Some(base) if pending.contains_key(&base) => flatten(base, pending, names, flat, visiting)?,
        Some(base) => {
            return Err(StepRefError::InvalidBase {
                name: names[ty.0].clone(),
                base: names[base.0].clone(),
            });
        }
        None => FlatObject {
            members: Vec::new(),
            step: false,
            synthesized: false,
        },
    };
    visiting.pop();

    result.members.extend(object.own_members.iter().cloned());
    result.step |= object.step_root;
    result.synthesized |= object.synthesized;
    flat.insert(ty, result.clone());
    Ok(result)
}
