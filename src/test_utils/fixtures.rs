//! Test fixtures: a sample schema, element builders and a sample plan.

use crate::constants::{CHILD_STEPS_MEMBER, ID_ATTRIBUTE, TYPE_ATTRIBUTE};
use crate::core::StepId;
use crate::model::{Document, Element, Node, NodeId, Value};
use crate::schema::Schema;
use crate::schema::file::SchemaFile;

/// Schema used throughout the tests, in schema-file form.
///
/// - `Delay`: authored step with a float
/// - `Sweep`: authored step with a single step field (`Target`) and a step list (`Extra`)
/// - `Generated`: synthesized step
/// - `Settings`: plain object
/// - `TestPlan`: container with the ownership list `Steps` and a step list `Pinned`
pub const SAMPLE_SCHEMA_TOML: &str = r#"
[[types]]
name = "Delay"
base = "Step"
members = [{ name = "Seconds", type = "float" }]

[[types]]
name = "StepRefs"
list = "Step"

[[types]]
name = "Sweep"
base = "Step"
members = [{ name = "Target", type = "Step" }, { name = "Extra", type = "StepRefs" }]

[[types]]
name = "Generated"
base = "Step"
synthesized = true
members = [{ name = "Label", type = "string" }]

[[types]]
name = "Settings"
members = [{ name = "Enabled", type = "bool" }, { name = "Note", type = "string" }]

[[types]]
name = "TestPlan"
members = [
    { name = "Steps", type = "StepList" },
    { name = "Pinned", type = "StepRefs" },
    { name = "Settings", type = "Settings" },
]
"#;

/// Build [`SAMPLE_SCHEMA_TOML`].
///
/// # Panics
///
/// Panics if the fixture schema is invalid.
#[must_use]
pub fn sample_schema() -> Schema {
    SchemaFile::parse(SAMPLE_SCHEMA_TOML, "fixture")
        .and_then(SchemaFile::into_schema)
        .unwrap_or_else(|e| panic!("fixture schema is invalid: {e}"))
}

/// An inline step element of runtime type `ty`.
#[must_use]
pub fn step_element(ty: &str, id: StepId) -> Element {
    Element::new("Step").with_attribute(TYPE_ATTRIBUTE, ty).with_attribute(ID_ATTRIBUTE, id.to_string())
}

/// A reference element.
#[must_use]
pub fn reference_element(name: &str, id: StepId) -> Element {
    Element::new(name).with_text(id.to_string())
}

/// The ownership list element holding `children`.
#[must_use]
pub fn children_element(children: Vec<Element>) -> Element {
    Element {
        children,
        ..Element::new(CHILD_STEPS_MEMBER)
    }
}

/// A `TestPlan` root element whose `Steps` list holds `steps`.
#[must_use]
pub fn plan_element(steps: Vec<Element>) -> Element {
    Element::new("TestPlan").with_attribute(TYPE_ATTRIBUTE, "TestPlan").with_child(Element {
        children: steps,
        ..Element::new("Steps")
    })
}

/// Handles into [`sample_plan`].
#[derive(Debug, Clone, Copy)]
pub struct SamplePlan {
    /// The `TestPlan` root.
    pub root: NodeId,
    /// `Sweep` owning `shared`.
    pub parent: NodeId,
    /// `Delay` owned by `parent`.
    pub shared: NodeId,
    /// `Sweep` aliasing `shared` through `Target` and `Extra`.
    pub alias: NodeId,
}

/// A plan where one step is owned in one place and aliased in two others:
///
/// ```text
/// TestPlan
/// └── Steps
///     ├── parent (Sweep)
///     │   └── ChildTestSteps
///     │       └── shared (Delay, Seconds = 1.5)
///     └── alias (Sweep, Target = shared, Extra = [shared])
/// ```
#[must_use]
pub fn sample_plan(schema: &Schema) -> (Document, SamplePlan) {
    let ty = |name: &str| {
        schema.lookup(name).unwrap_or_else(|| panic!("fixture type {name} is missing"))
    };

    let mut doc = Document::new();
    let root = doc.add(Node::object(ty("TestPlan")));
    let parent = doc.add(Node::step(ty("Sweep"), StepId::new()));
    let shared = doc.add(Node::step(ty("Delay"), StepId::new()).with_field("Seconds", Value::Float(1.5)));
    let alias = doc.add(
        Node::step(ty("Sweep"), StepId::new())
            .with_field("Target", Value::Node(shared))
            .with_field("Extra", Value::List(vec![Value::Node(shared)])),
    );

    for (owner, child) in [(root, parent), (parent, shared), (root, alias)] {
        doc.add_child(schema, owner, child).unwrap_or_else(|e| panic!("fixture plan is invalid: {e}"));
    }
    doc.set_root(root);

    (
        doc,
        SamplePlan {
            root,
            parent,
            shared,
            alias,
        },
    )
}
