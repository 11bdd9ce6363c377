//! Command entity and request/response shapes

use serde::{Deserialize, Serialize};

use super::validation::{validate_fields, ValidationErrors};

/// Id carried by a command that has not been written to the store
pub const UNSAVED_ID: i64 = 0;

/// A stored command-line snippet
///
/// `id` is assigned by the store on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: i64,
    pub how_to: String,
    pub line: String,
    pub platform: String,
}

impl Command {
    /// Create a command that has no store id yet
    pub fn unsaved(
        how_to: impl Into<String>,
        line: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            how_to: how_to.into(),
            line: line.into(),
            platform: platform.into(),
        }
    }

    /// Whether this record was read from (or written to) the store
    pub fn is_persisted(&self) -> bool {
        self.id > UNSAVED_ID
    }

    /// Overwrite the text fields with an update, keeping `id`
    pub fn apply(&mut self, update: CommandUpdate) {
        self.how_to = update.how_to;
        self.line = update.line;
        self.platform = update.platform;
    }
}

/// Response item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRead {
    pub id: i64,
    pub how_to: String,
    pub line: String,
    pub platform: String,
}

impl From<&Command> for CommandRead {
    fn from(cmd: &Command) -> Self {
        Self {
            id: cmd.id,
            how_to: cmd.how_to.clone(),
            line: cmd.line.clone(),
            platform: cmd.platform.clone(),
        }
    }
}

impl From<Command> for CommandRead {
    fn from(cmd: Command) -> Self {
        Self {
            id: cmd.id,
            how_to: cmd.how_to,
            line: cmd.line,
            platform: cmd.platform,
        }
    }
}

/// POST body
///
/// Missing fields deserialize as empty strings so that they are reported by
/// field validation rather than rejected by the JSON extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCreate {
    #[serde(default)]
    pub how_to: String,
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub platform: String,
}

impl CommandCreate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.how_to, &self.line, &self.platform).into_result()
    }
}

impl From<CommandCreate> for Command {
    fn from(body: CommandCreate) -> Self {
        Command::unsaved(body.how_to, body.line, body.platform)
    }
}

/// PUT body and PATCH target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandUpdate {
    #[serde(default)]
    pub how_to: String,
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub platform: String,
}

impl CommandUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.field_errors().into_result()
    }

    /// Field validation errors, empty when the update is valid
    pub fn field_errors(&self) -> ValidationErrors {
        validate_fields(&self.how_to, &self.line, &self.platform)
    }
}

impl From<&Command> for CommandUpdate {
    fn from(cmd: &Command) -> Self {
        Self {
            how_to: cmd.how_to.clone(),
            line: cmd.line.clone(),
            platform: cmd.platform.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsaved_command_has_no_id() {
        let cmd = Command::unsaved("Run a project", "cargo run", "Rust");
        assert_eq!(cmd.id, UNSAVED_ID);
        assert!(!cmd.is_persisted());
    }

    #[test]
    fn test_read_shape_uses_camel_case() {
        let cmd = Command {
            id: 7,
            how_to: "List files".to_string(),
            line: "ls -la".to_string(),
            platform: "Linux".to_string(),
        };

        let json = serde_json::to_value(CommandRead::from(&cmd)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["howTo"], "List files");
        assert_eq!(json["line"], "ls -la");
        assert_eq!(json["platform"], "Linux");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_create_body_missing_fields_fail_validation() {
        let body: CommandCreate = serde_json::from_str(r#"{"line": "dir"}"#).unwrap();
        let errors = body.validate().unwrap_err();

        assert!(errors.contains("howTo"));
        assert!(errors.contains("platform"));
        assert!(!errors.contains("line"));
    }

    #[test]
    fn test_apply_update_keeps_id() {
        let mut cmd = Command {
            id: 3,
            how_to: "old".to_string(),
            line: "old".to_string(),
            platform: "old".to_string(),
        };

        cmd.apply(CommandUpdate {
            how_to: "new how".to_string(),
            line: "new line".to_string(),
            platform: "new platform".to_string(),
        });

        assert_eq!(cmd.id, 3);
        assert_eq!(cmd.how_to, "new how");
        assert_eq!(cmd.line, "new line");
        assert_eq!(cmd.platform, "new platform");
    }
}
