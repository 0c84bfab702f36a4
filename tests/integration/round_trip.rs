//! Save and load whole plans through the default chain.

use stepref::config::Settings;
use stepref::core::StepId;
use stepref::model::{Document, Element, Node, NodeId, Value};
use stepref::serialization::PlanSerializer;
use stepref::test_utils::fixtures::{
    children_element, plan_element, reference_element, sample_plan, sample_schema, step_element,
};
use stepref::test_utils::init_test_logging;

fn session() -> PlanSerializer {
    init_test_logging(None);
    PlanSerializer::new(sample_schema(), Settings::default())
}

fn steps_of(document: &Document, root: NodeId) -> Vec<NodeId> {
    match document[root].field("Steps") {
        Some(Value::List(items)) => items.iter().filter_map(Value::as_node).collect(),
        _ => Vec::new(),
    }
}

#[test]
fn test_aliased_step_is_persisted_once() {
    let schema = sample_schema();
    let (doc, plan) = sample_plan(&schema);
    let shared_id = doc.step_id(plan.shared).unwrap().to_string();

    let element = session().save(&doc).unwrap();

    let inline: Vec<&Element> =
        element.descendants().filter(|e| e.attribute("id") == Some(shared_id.as_str())).collect();
    assert_eq!(inline.len(), 1);
    let references = element
        .descendants()
        .filter(|e| !e.has_elements() && e.text.as_deref() == Some(shared_id.as_str()))
        .count();
    assert_eq!(references, 2);
}

#[test]
fn test_round_trip_through_json_text() {
    let schema = sample_schema();
    let (doc, plan) = sample_plan(&schema);
    let shared_id = doc.step_id(plan.shared).unwrap();
    let json = session().save(&doc).unwrap().to_json(true).unwrap();

    let reader = session();
    let loaded = reader.load(&Element::from_json(&json).unwrap()).unwrap();

    let shared = reader.find_step(shared_id).unwrap();
    assert_eq!(loaded.document[shared].field("Seconds"), Some(&Value::Float(1.5)));
    let alias = steps_of(&loaded.document, loaded.root)[1];
    assert_eq!(loaded.document[alias].field("Target"), Some(&Value::Node(shared)));

    // Saving again yields the same text.
    let again = reader.save(&loaded.document).unwrap().to_json(true).unwrap();
    assert_eq!(again, json);
}

#[test]
fn test_reference_to_nested_step_declared_later() {
    let nested_id = StepId::new();
    let alias = step_element("Sweep", StepId::new()).with_child(reference_element("Target", nested_id));
    let owner = step_element("Sweep", StepId::new())
        .with_child(children_element(vec![step_element("Delay", nested_id)]));
    let reader = session();

    let loaded = reader.load(&plan_element(vec![alias, owner])).unwrap();

    let nested = reader.find_step(nested_id).unwrap();
    let steps = steps_of(&loaded.document, loaded.root);
    assert_eq!(loaded.document[steps[0]].field("Target"), Some(&Value::Node(nested)));
    assert!(loaded.document.children(reader.schema(), steps[1]).contains(&nested));
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn test_merged_duplicates_are_all_resolvable() {
    let id = StepId::new();
    let copies = (0..4).map(|_| step_element("Delay", id)).collect();
    let reader = session();

    let loaded = reader.load(&plan_element(copies)).unwrap();

    let steps = steps_of(&loaded.document, loaded.root);
    let mut ids: Vec<StepId> = steps.iter().filter_map(|s| loaded.document.step_id(*s)).collect();
    for (step, step_id) in steps.iter().zip(&ids) {
        assert_eq!(reader.find_step(*step_id), Some(*step));
    }
    ids.sort_by_key(ToString::to_string);
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(loaded.diagnostics.warning_count(), 3);
}

#[test]
fn test_synthesized_duplicates_do_not_warn() {
    let id = StepId::new();
    let reader = session();

    let loaded = reader.load(&plan_element(vec![step_element("Generated", id), step_element("Generated", id)])).unwrap();

    assert_eq!(loaded.diagnostics.warning_count(), 0);
    assert_eq!(loaded.diagnostics.entries().len(), 1);
}

#[test]
fn test_settings_object_round_trips_inline() {
    let schema = sample_schema();
    let mut doc = Document::new();
    let settings = doc.add(
        Node::object(schema.lookup("Settings").unwrap())
            .with_field("Enabled", Value::Bool(true))
            .with_field("Note", Value::Text("nightly".into())),
    );
    let root = doc.add(Node::object(schema.lookup("TestPlan").unwrap()).with_field("Settings", Value::Node(settings)));
    doc.set_root(root);

    let element = session().save(&doc).unwrap();
    let loaded = session().load(&element).unwrap();

    let Some(Value::Node(settings)) = loaded.document[loaded.root].field("Settings") else {
        panic!("Settings did not round trip");
    };
    assert_eq!(loaded.document[*settings].field("Note"), Some(&Value::Text("nightly".into())));
    assert_eq!(loaded.document[*settings].id, None);
}
