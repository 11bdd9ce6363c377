//! # Command Model
//!
//! The `Command` entity and the shapes it takes on the wire.
//!
//! Storage rows and HTTP bodies are distinct types. Every conversion between
//! them is an explicit `From` impl, so each field copy is visible at a call
//! site.
//!
//! - `Command` - stored record, owned by the repository
//! - `CommandRead` - response item (`id`, `howTo`, `line`, `platform`)
//! - `CommandCreate` - POST body
//! - `CommandUpdate` - PUT body, and the transient target of a PATCH
//! - `PatchBody` - PATCH body (field object or operation list)

mod command;
mod patch;
mod validation;

pub use command::{Command, CommandCreate, CommandRead, CommandUpdate, UNSAVED_ID};
pub use patch::{CommandPatch, PatchBody, PatchOperation};
pub use validation::{validate_fields, ValidationErrors, HOW_TO_MAX_LEN};
