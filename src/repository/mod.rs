//! # Command Repository
//!
//! Sole mediator between the API layer and the relational store.
//!
//! Reads go straight to the store. Writes are staged on the session and
//! flushed together by [`CommanderRepo::commit`] in one transaction. A
//! session is opened per request, so staged changes never cross requests.

mod errors;
mod sqlite;

pub use errors::{RepoError, RepoResult, DUPLICATE_HOW_TO, DUPLICATE_LINE};
pub use sqlite::{SqliteCommanderRepo, SqliteStore, SqliteStoreConfig, MEMORY_PATH};

use crate::model::Command;

/// Data access for commands
pub trait CommanderRepo {
    /// Every stored command, ordered by id
    fn get_all(&self) -> RepoResult<Vec<Command>>;

    /// The command with `id`, or `None`
    fn get_by_id(&self, id: i64) -> RepoResult<Option<Command>>;

    /// Commands whose platform matches exactly (case-sensitive)
    fn get_by_platform(&self, platform: &str) -> RepoResult<Vec<Command>>;

    /// Stage an insert
    ///
    /// Fails with `Duplicate` when `line` (checked first) or `howTo` is
    /// already taken, and with `InvalidArgument` when `cmd` already has a
    /// store id.
    fn create(&mut self, cmd: &Command) -> RepoResult<()>;

    /// Stage a full overwrite of `cmd.id` with the fields of `cmd`
    ///
    /// Uniqueness is not re-checked.
    fn update(&mut self, cmd: &Command) -> RepoResult<()>;

    /// Stage removal of `cmd`
    fn delete(&mut self, cmd: &Command) -> RepoResult<()>;

    /// Flush staged changes in one transaction
    fn commit(&mut self) -> RepoResult<bool>;

    /// Records inserted by the last successful commit, with their ids
    fn created(&self) -> &[Command];
}
