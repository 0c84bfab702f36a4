//! Tests for the serializer chain.

use std::cell::RefCell;

use super::*;
use crate::config::Settings;
use crate::core::{StepId, StepRefError};
use crate::model::{Document, Node};
use crate::schema::Schema;
use crate::test_utils::fixtures::{plan_element, sample_plan, sample_schema, step_element};

/// Logs every offer and claims nothing.
struct Tracer {
    name: &'static str,
    order: i32,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl SerializerPlugin for Tracer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn deserialize(&self, _: &mut Deserializer<'_>, _: &Element, _: TypeRef, _: &Slot) -> Result<bool> {
        self.log.borrow_mut().push(self.name);
        Ok(false)
    }

    fn serialize(&self, _: &mut Serializer<'_>, _: &mut Element, _: &Value, _: TypeRef) -> Result<bool> {
        self.log.borrow_mut().push(self.name);
        Ok(false)
    }
}

fn tracer(name: &'static str, order: i32, log: &Rc<RefCell<Vec<&'static str>>>) -> PluginRef {
    Rc::new(Tracer {
        name,
        order,
        log: Rc::clone(log),
    })
}

fn object_chain() -> Vec<PluginRef> {
    vec![Rc::new(ObjectSerializer)]
}

fn ty(schema: &Schema, name: &str) -> TypeRef {
    schema.lookup(name).unwrap()
}

#[test]
fn test_chain_is_tried_in_ascending_order() {
    let schema = sample_schema();
    let log = Rc::new(RefCell::new(Vec::new()));
    let chain = sort_chain(vec![tracer("late", 50, &log), tracer("early", -5, &log), tracer("middle", 0, &log)]);
    let mut de = Deserializer::new(&schema, chain);

    let claimed = de.deserialize(&Element::new("x"), ty(&schema, "int"), &Slot::Root).unwrap();

    assert!(!claimed);
    assert_eq!(*log.borrow(), vec!["early", "middle", "late"]);
}

#[test]
fn test_sort_chain_is_stable_for_equal_orders() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let chain = sort_chain(vec![tracer("a", 1, &log), tracer("b", 0, &log), tracer("c", 1, &log)]);
    let names: Vec<&str> = chain.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn test_unhandled_element_warns_unless_ignoring_errors() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, Vec::new());
    de.deserialize(&Element::new("Orphan"), ty(&schema, "int"), &Slot::Root).unwrap();
    assert_eq!(de.diagnostics().warning_count(), 1);
    assert!(de.diagnostics().entries()[0].message.contains("Orphan"));

    let mut quiet = Deserializer::new(&schema, Vec::new());
    quiet.set_ignore_errors(true);
    quiet.deserialize(&Element::new("Orphan"), ty(&schema, "int"), &Slot::Root).unwrap();
    assert!(quiet.diagnostics().is_empty());
}

#[test]
fn test_claiming_plugin_stops_the_chain() {
    let schema = sample_schema();
    let log = Rc::new(RefCell::new(Vec::new()));
    let chain = sort_chain(vec![Rc::new(ObjectSerializer) as PluginRef, tracer("after", 2000, &log)]);
    let mut de = Deserializer::new(&schema, chain);

    let value = de.deserialize_value(&Element::new("n").with_text("42"), ty(&schema, "int")).unwrap();

    assert_eq!(value, Some(Value::Integer(42)));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_scalars_parse_from_text() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let cases = [
        ("bool", "true", Value::Bool(true)),
        ("int", " -7 ", Value::Integer(-7)),
        ("float", "0.25", Value::Float(0.25)),
        ("string", " keep spaces ", Value::Text(" keep spaces ".into())),
        ("int", "", Value::Null),
    ];
    for (type_name, text, expected) in cases {
        let value = de.deserialize_value(&Element::new("v").with_text(text), ty(&schema, type_name)).unwrap();
        assert_eq!(value, Some(expected), "{type_name} from {text:?}");
    }
}

#[test]
fn test_invalid_scalar_is_an_error() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let err = de.deserialize_value(&Element::new("Enabled").with_text("maybe"), ty(&schema, "bool")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StepRefError>(),
        Some(StepRefError::InvalidValue { .. })
    ));
}

#[test]
fn test_nested_captures_are_independent() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let element = Element::new("Settings")
        .with_child(Element::new("Enabled").with_text("true"))
        .with_child(Element::new("Note").with_text("hi"));

    let value = de.deserialize_value(&element, ty(&schema, "Settings")).unwrap();

    let Some(Value::Node(node)) = value else {
        panic!("expected an object, got {value:?}");
    };
    assert_eq!(de.document()[node].field("Enabled"), Some(&Value::Bool(true)));
    assert_eq!(de.document()[node].field("Note"), Some(&Value::Text("hi".into())));
    assert_eq!(de.document()[node].id, None);
}

#[test]
fn test_assign_to_closed_capture_is_dropped() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    de.assign(&Slot::Capture(3), Value::Integer(1)).unwrap();
    assert!(de.diagnostics().is_empty());
}

#[test]
fn test_deferred_actions_run_once_in_queue_order() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let log = Rc::new(RefCell::new(Vec::new()));
    for n in 0..3 {
        let log = Rc::clone(&log);
        de.defer_load(move |_: &mut Deserializer<'_>| {
            log.borrow_mut().push(n);
            Ok(())
        });
    }
    assert_eq!(de.deferred_len(), 3);

    de.flush_deferred().unwrap();
    de.flush_deferred().unwrap();

    assert_eq!(*log.borrow(), vec![0, 1, 2]);
    assert_eq!(de.deferred_len(), 0);
}

#[test]
fn test_deferred_action_may_queue_more_work() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let log = Rc::new(RefCell::new(Vec::new()));
    let outer = Rc::clone(&log);
    de.defer_load(move |ctx: &mut Deserializer<'_>| {
        outer.borrow_mut().push("outer");
        let inner = Rc::clone(&outer);
        ctx.defer_load(move |_: &mut Deserializer<'_>| {
            inner.borrow_mut().push("inner");
            Ok(())
        });
        Ok(())
    });

    de.flush_deferred().unwrap();

    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
}

#[test]
fn test_load_sets_document_root() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let element = plan_element(vec![step_element("Delay", StepId::new())]);

    let root = de.load(&element, ty(&schema, "TestPlan")).unwrap();

    let (document, _) = de.into_parts();
    assert_eq!(root.and_then(|v| v.as_node()), document.root());
    assert_eq!(document.len(), 2);
}

#[test]
fn test_step_without_id_gets_a_fresh_one() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let element = Element::new("Step").with_attribute("type", "Delay");

    let value = de.deserialize_value(&element, schema.step_type()).unwrap();

    let node = value.and_then(|v| v.as_node()).unwrap();
    assert!(de.document().step_id(node).is_some());
}

#[test]
fn test_type_attribute_must_derive_from_declared_type() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let element = Element::new("Step").with_attribute("type", "Settings");

    let err = de.deserialize_value(&element, schema.step_type()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StepRefError>(),
        Some(StepRefError::TypeMismatch { .. })
    ));
}

#[test]
fn test_unknown_type_attribute_is_an_error() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let element = Element::new("Step").with_attribute("type", "Teleport");

    let err = de.deserialize_value(&element, schema.step_type()).unwrap_err();

    assert!(err.to_string().contains("Teleport"));
}

#[test]
fn test_unknown_members_are_skipped() {
    let schema = sample_schema();
    let mut de = Deserializer::new(&schema, object_chain());
    let element = step_element("Delay", StepId::new())
        .with_child(Element::new("Colour").with_text("blue"))
        .with_child(Element::new("Seconds").with_text("3"));

    let node = de.deserialize_value(&element, schema.step_type()).unwrap().and_then(|v| v.as_node()).unwrap();

    assert_eq!(de.document()[node].fields.len(), 1);
    assert!(de.diagnostics().is_empty());
}

#[test]
fn test_serializer_frames_track_members() {
    struct FrameSpy {
        seen: RefCell<Vec<(String, Option<String>)>>,
    }

    impl SerializerPlugin for FrameSpy {
        fn name(&self) -> &'static str {
            "frame-spy"
        }

        fn deserialize(&self, _: &mut Deserializer<'_>, _: &Element, _: TypeRef, _: &Slot) -> Result<bool> {
            Ok(false)
        }

        fn serialize(&self, ctx: &mut Serializer<'_>, _: &mut Element, _: &Value, expected: TypeRef) -> Result<bool> {
            let member = ctx.current_frame().and_then(|f| f.member.as_ref()).map(|m| m.name.clone());
            self.seen.borrow_mut().push((ctx.schema().name(expected).to_string(), member));
            Ok(false)
        }
    }

    let schema = sample_schema();
    let settings_ty = ty(&schema, "Settings");
    let mut doc = Document::new();
    let settings = doc.add(Node::object(settings_ty).with_field("Enabled", Value::Bool(false)));
    doc.set_root(settings);
    let spy = Rc::new(FrameSpy {
        seen: RefCell::new(Vec::new()),
    });
    let chain = sort_chain(vec![Rc::new(ObjectSerializer) as PluginRef, Rc::clone(&spy) as PluginRef]);
    let mut ser = Serializer::new(&schema, chain, &doc);

    let element = ser.serialize_root("Settings").unwrap();

    assert_eq!(
        *spy.seen.borrow(),
        vec![("Settings".to_string(), None), ("bool".to_string(), Some("Enabled".to_string()))]
    );
    assert!(ser.frames().is_empty());
    assert_eq!(element.attribute("type"), Some("Settings"));
    assert_eq!(element.child("Enabled").map(Element::value), Some("false"));
}

#[test]
fn test_serialize_shape_mismatch_is_an_error() {
    let schema = sample_schema();
    let doc = Document::new();
    let mut ser = Serializer::new(&schema, object_chain(), &doc);
    let mut element = Element::new("Seconds");

    let err = ser.serialize(&mut element, &Value::Text("soon".into()), ty(&schema, "float")).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StepRefError>(),
        Some(StepRefError::ValueShapeMismatch { .. })
    ));
}

#[test]
fn test_unhandled_value_warns_on_save() {
    let schema = sample_schema();
    let doc = Document::new();
    let mut ser = Serializer::new(&schema, Vec::new(), &doc);

    let claimed = ser.serialize(&mut Element::new("n"), &Value::Integer(1), ty(&schema, "int")).unwrap();

    assert!(!claimed);
    assert_eq!(ser.into_diagnostics().warning_count(), 1);
}

#[test]
fn test_empty_document_saves_bare_root() {
    let session = PlanSerializer::new(sample_schema(), Settings::default());
    let element = session.save(&Document::new()).unwrap();
    assert_eq!(element, Element::new("TestPlan"));
}

#[test]
fn test_save_uses_configured_root_name() {
    let schema = sample_schema();
    let (doc, _) = sample_plan(&schema);
    let settings = Settings {
        root_element: "Plan".into(),
        ..Settings::default()
    };
    let session = PlanSerializer::new(schema, settings);

    let element = session.save(&doc).unwrap();

    assert_eq!(element.name, "Plan");
    assert_eq!(element.attribute("type"), Some("TestPlan"));
}

#[test]
fn test_load_requires_root_type() {
    let session = PlanSerializer::new(sample_schema(), Settings::default());
    let err = session.load(&Element::new("TestPlan")).unwrap_err();
    assert!(err.to_string().contains("type"));
}

#[test]
fn test_load_rejects_scalar_root() {
    let session = PlanSerializer::new(sample_schema(), Settings::default());
    let element = Element::new("n").with_attribute("type", "int").with_text("1");
    assert!(session.load(&element).is_err());
}

#[test]
fn test_extra_plugin_joins_the_chain_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let session =
        PlanSerializer::new(sample_schema(), Settings::default()).with_plugin(tracer("first", i32::MIN, &log));

    session.load(&plan_element(Vec::new())).unwrap();

    assert!(!log.borrow().is_empty());
}

#[test]
fn test_paste_requires_a_root() {
    let session = PlanSerializer::new(sample_schema(), Settings::default());
    let err = session.paste(Document::new(), None, &step_element("Delay", StepId::new())).unwrap_err();
    assert!(err.to_string().contains("root"));
}

#[test]
fn test_diagnostics_display() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.debug("quiet");
    diagnostics.warn("loud");
    let rendered: Vec<String> = diagnostics.entries().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["debug: quiet", "warning: loud"]);
    assert_eq!(diagnostics.warnings().count(), 1);
}
