//! Field validation shared by create, full update and partial update

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Maximum length of `howTo`, in characters
pub const HOW_TO_MAX_LEN: usize = 250;

/// Validation messages keyed by wire field name
///
/// Keys are kept sorted so that problem responses are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Append every message from `other`
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages recorded for `field`
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate the three text fields of a command
pub fn validate_fields(how_to: &str, line: &str, platform: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    require(&mut errors, "howTo", how_to);
    require(&mut errors, "line", line);
    require(&mut errors, "platform", platform);

    if how_to.chars().count() > HOW_TO_MAX_LEN {
        errors.add(
            "howTo",
            format!(
                "The field howTo must be a string with a maximum length of {}.",
                HOW_TO_MAX_LEN
            ),
        );
    }

    errors
}

fn require(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("The {} field is required.", field));
    }
}
