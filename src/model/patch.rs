//! Partial updates
//!
//! A PATCH body comes in one of two forms:
//!
//! ```text
//! {"platform": "Windows"}
//! [{"op": "replace", "path": "/platform", "value": "Windows"}]
//! ```
//!
//! Both are parsed from raw JSON by [`PatchBody::parse`], folded into a
//! [`CommandPatch`] of optional fields and applied to a [`CommandUpdate`].
//! Malformed documents never fail deserialization; every problem is reported
//! as a [`ValidationErrors`] entry.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::command::CommandUpdate;
use super::validation::ValidationErrors;

/// Error key for problems with the document as a whole
const DOCUMENT_KEY: &str = "$";

/// Optional replacement for each updatable field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPatch {
    pub how_to: Option<String>,
    pub line: Option<String>,
    pub platform: Option<String>,
}

impl CommandPatch {
    /// Replace every present field on `target`
    pub fn apply_to(self, target: &mut CommandUpdate) {
        if let Some(how_to) = self.how_to {
            target.how_to = how_to;
        }
        if let Some(line) = self.line {
            target.line = line;
        }
        if let Some(platform) = self.platform {
            target.platform = platform;
        }
    }
}

/// One JSON Patch style operation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default)]
    pub value: Option<Value>,
}

/// PATCH request body
#[derive(Debug, Clone, PartialEq)]
pub enum PatchBody {
    Operations(Vec<PatchOperation>),
    Fields(CommandPatch),
}

#[derive(Clone, Copy)]
enum PatchField {
    HowTo,
    Line,
    Platform,
}

impl PatchField {
    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("howTo") {
            Some(Self::HowTo)
        } else if name.eq_ignore_ascii_case("line") {
            Some(Self::Line)
        } else if name.eq_ignore_ascii_case("platform") {
            Some(Self::Platform)
        } else {
            None
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        Self::from_name(path.strip_prefix('/').unwrap_or(path))
    }

    fn name(self) -> &'static str {
        match self {
            Self::HowTo => "howTo",
            Self::Line => "line",
            Self::Platform => "platform",
        }
    }

    fn set(self, patch: &mut CommandPatch, value: String) {
        match self {
            Self::HowTo => patch.how_to = Some(value),
            Self::Line => patch.line = Some(value),
            Self::Platform => patch.platform = Some(value),
        }
    }
}

impl PatchBody {
    /// Parse a PATCH document
    ///
    /// Object keys match field names case-insensitively and `null` leaves a
    /// field unchanged. Unknown keys, non-string values and operations that
    /// are not `{op, path, value?}` objects are all collected before
    /// returning.
    pub fn parse(document: Value) -> Result<Self, ValidationErrors> {
        match document {
            Value::Object(fields) => parse_fields(fields).map(PatchBody::Fields),
            Value::Array(items) => parse_operations(items).map(PatchBody::Operations),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.add(
                    DOCUMENT_KEY,
                    "The patch document must be an object or an array of operations.",
                );
                Err(errors)
            }
        }
    }

    /// Fold the body into a field patch
    ///
    /// Operations that cannot be applied are reported against their path and
    /// leave the corresponding field untouched. `remove` clears a field.
    pub fn into_patch(self) -> (CommandPatch, ValidationErrors) {
        let operations = match self {
            PatchBody::Fields(patch) => return (patch, ValidationErrors::new()),
            PatchBody::Operations(operations) => operations,
        };

        let mut patch = CommandPatch::default();
        let mut errors = ValidationErrors::new();

        for operation in operations {
            let Some(field) = PatchField::from_path(&operation.path) else {
                errors.add(
                    operation.path.clone(),
                    format!(
                        "The target location specified by path '{}' was not found.",
                        operation.path
                    ),
                );
                continue;
            };

            match operation.op.to_ascii_lowercase().as_str() {
                "replace" | "add" => match operation.value {
                    Some(Value::String(value)) => field.set(&mut patch, value),
                    _ => errors.add(
                        operation.path.clone(),
                        format!(
                            "The value for path '{}' must be a string.",
                            operation.path
                        ),
                    ),
                },
                "remove" => field.set(&mut patch, String::new()),
                other => errors.add(
                    operation.path.clone(),
                    format!("The '{}' operation is not supported.", other),
                ),
            }
        }

        (patch, errors)
    }

    /// Apply to `target` and re-validate it
    ///
    /// `target` is the transient copy of the stored record. On error it may
    /// be partially patched and must be discarded.
    pub fn apply_to(self, target: &mut CommandUpdate) -> Result<(), ValidationErrors> {
        let (patch, mut errors) = self.into_patch();
        patch.apply_to(target);
        errors.merge(target.field_errors());
        errors.into_result()
    }
}

fn parse_fields(fields: Map<String, Value>) -> Result<CommandPatch, ValidationErrors> {
    let mut patch = CommandPatch::default();
    let mut errors = ValidationErrors::new();

    for (key, value) in fields {
        let Some(field) = PatchField::from_name(&key) else {
            errors.add(key.clone(), format!("The field '{}' is not recognized.", key));
            continue;
        };

        match value {
            Value::String(value) => field.set(&mut patch, value),
            Value::Null => {}
            _ => errors.add(
                field.name(),
                format!("The {} field must be a string.", field.name()),
            ),
        }
    }

    errors.into_result().map(|()| patch)
}

fn parse_operations(items: Vec<Value>) -> Result<Vec<PatchOperation>, ValidationErrors> {
    let mut operations = Vec::with_capacity(items.len());
    let mut errors = ValidationErrors::new();

    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<PatchOperation>(item) {
            Ok(operation) => operations.push(operation),
            Err(e) => errors.add(
                format!("{}[{}]", DOCUMENT_KEY, index),
                format!("The operation at index {} is malformed: {}.", index, e),
            ),
        }
    }

    errors.into_result().map(|()| operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target() -> CommandUpdate {
        CommandUpdate {
            how_to: "Run a project".to_string(),
            line: "run x".to_string(),
            platform: "Linux".to_string(),
        }
    }

    fn parse(document: Value) -> PatchBody {
        PatchBody::parse(document).unwrap()
    }

    #[test]
    fn test_field_form_replaces_present_fields_only() {
        let body = parse(json!({"platform": "Windows"}));
        let mut update = target();

        body.apply_to(&mut update).unwrap();

        assert_eq!(update.platform, "Windows");
        assert_eq!(update.how_to, "Run a project");
        assert_eq!(update.line, "run x");
    }

    #[test]
    fn test_field_form_keys_case_insensitive_and_null_ignored() {
        let body = parse(json!({"HowTo": "Build", "line": null}));
        let mut update = target();

        body.apply_to(&mut update).unwrap();

        assert_eq!(update.how_to, "Build");
        assert_eq!(update.line, "run x");
    }

    #[test]
    fn test_operation_form_replace() {
        let body = parse(json!([{"op": "replace", "path": "/line", "value": "run y"}]));
        let mut update = target();

        body.apply_to(&mut update).unwrap();

        assert_eq!(update.line, "run y");
    }

    #[test]
    fn test_path_is_case_insensitive() {
        let body = parse(json!([{"op": "Replace", "path": "/HowTo", "value": "Build"}]));
        let mut update = target();

        body.apply_to(&mut update).unwrap();

        assert_eq!(update.how_to, "Build");
    }

    #[test]
    fn test_remove_fails_required_validation() {
        let body = parse(json!([{"op": "remove", "path": "/howTo"}]));
        let mut update = target();

        let errors = body.apply_to(&mut update).unwrap_err();

        assert!(errors.contains("howTo"));
    }

    #[test]
    fn test_empty_field_value_rejected() {
        let body = parse(json!({"line": ""}));
        let mut update = target();

        let errors = body.apply_to(&mut update).unwrap_err();

        assert_eq!(errors.messages("line"), ["The line field is required."]);
    }

    #[test]
    fn test_unknown_path_and_op_reported() {
        let body = parse(json!([
            {"op": "replace", "path": "/id", "value": "5"},
            {"op": "move", "path": "/line"}
        ]));
        let mut update = target();

        let errors = body.apply_to(&mut update).unwrap_err();

        assert!(errors.contains("/id"));
        assert!(errors.contains("/line"));
    }

    #[test]
    fn test_non_string_value_reported() {
        let body = parse(json!([{"op": "replace", "path": "/platform", "value": 42}]));
        let mut update = target();

        let errors = body.apply_to(&mut update).unwrap_err();

        assert!(errors.contains("/platform"));
        assert_eq!(update.platform, "Linux");
    }

    #[test]
    fn test_unknown_field_in_object_form_reported() {
        let errors = PatchBody::parse(json!({"platfrom": "Windows"})).unwrap_err();

        assert_eq!(
            errors.messages("platfrom"),
            ["The field 'platfrom' is not recognized."]
        );
    }

    #[test]
    fn test_non_string_field_in_object_form_reported() {
        let errors = PatchBody::parse(json!({"line": 5, "platform": ["Linux"]})).unwrap_err();

        assert_eq!(errors.messages("line"), ["The line field must be a string."]);
        assert!(errors.contains("platform"));
    }

    #[test]
    fn test_malformed_operation_reported_by_index() {
        let errors = PatchBody::parse(json!([
            {"op": "replace", "path": "/line", "value": "ok"},
            {"path": "/line", "value": "run y"}
        ]))
        .unwrap_err();

        assert!(errors.contains("$[1]"));
        assert!(!errors.contains("$[0]"));
    }

    #[test]
    fn test_scalar_document_rejected() {
        let errors = PatchBody::parse(json!("Windows")).unwrap_err();

        assert!(errors.contains("$"));
    }
}
