//! Names shared between the schema, the wire elements and the CLI.

/// Attribute holding the runtime type name of an object element.
pub const TYPE_ATTRIBUTE: &str = "type";

/// Attribute holding the identity of an inline step element.
pub const ID_ATTRIBUTE: &str = "id";

/// Built-in abstract step base type.
pub const STEP_TYPE: &str = "Step";

/// Built-in canonical ownership child-list type.
pub const STEP_LIST_TYPE: &str = "StepList";

/// Member of [`STEP_TYPE`] holding a step's owned children.
pub const CHILD_STEPS_MEMBER: &str = "ChildTestSteps";

/// Default name of the document root element.
pub const DEFAULT_ROOT_ELEMENT: &str = "TestPlan";

/// Environment variable overriding `ignore-errors` in the settings file.
pub const IGNORE_ERRORS_ENV: &str = "STEPREF_IGNORE_ERRORS";
