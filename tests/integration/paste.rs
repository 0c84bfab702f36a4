//! Pasting fragments into live documents.

use stepref::config::Settings;
use stepref::core::StepId;
use stepref::model::Value;
use stepref::serialization::PlanSerializer;
use stepref::test_utils::fixtures::{children_element, reference_element, sample_plan, sample_schema, step_element};

#[test]
fn test_copy_paste_within_one_document() {
    let schema = sample_schema();
    let (doc, plan) = sample_plan(&schema);

    // Copy `parent` (and its owned child) out of the document...
    let copied = PlanSerializer::new(schema.clone(), Settings::default()).save(&doc).unwrap();
    let fragment = copied.child("Steps").unwrap().children[0].clone();

    // ...and paste it back at the top level.
    let session = PlanSerializer::new(schema, Settings::default());
    let pasted = session.paste(doc, None, &fragment).unwrap();

    let parent_id = pasted.document.step_id(plan.parent).unwrap();
    let shared_id = pasted.document.step_id(plan.shared).unwrap();
    assert_eq!(pasted.document.step_id(pasted.step), Some(parent_id));
    assert_eq!(session.find_step(parent_id), Some(plan.parent));
    assert_eq!(session.find_step(shared_id), Some(plan.shared));
    assert_eq!(pasted.diagnostics.warning_count(), 0);
}

#[test]
fn test_pasted_reference_to_unknown_step_warns() {
    let schema = sample_schema();
    let (doc, _) = sample_plan(&schema);
    let fragment = step_element("Sweep", StepId::new()).with_child(reference_element("Target", StepId::new()));
    let session = PlanSerializer::new(schema, Settings::default());

    let pasted = session.paste(doc, None, &fragment).unwrap();

    assert_eq!(pasted.document[pasted.step].field("Target"), None);
    assert_eq!(pasted.diagnostics.warning_count(), 1);
}

#[test]
fn test_pasted_fragment_references_its_own_steps() {
    let schema = sample_schema();
    let (doc, plan) = sample_plan(&schema);
    let inner = StepId::new();
    let fragment = step_element("Sweep", StepId::new())
        .with_child(reference_element("Target", inner))
        .with_child(children_element(vec![step_element("Delay", inner)]));
    let session = PlanSerializer::new(schema, Settings::default());

    let pasted = session.paste(doc, Some(plan.parent), &fragment).unwrap();

    let owned = pasted.document.children(session.schema(), pasted.step);
    assert_eq!(owned.len(), 1);
    assert_eq!(pasted.document[pasted.step].field("Target"), Some(&Value::Node(owned[0])));
    assert_eq!(pasted.document.children(session.schema(), plan.parent).len(), 2);
}
