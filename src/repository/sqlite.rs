//! SQLite-backed command repository
//!
//! One shared connection guarded by a mutex. Every request works through its
//! own [`SqliteCommanderRepo`] session, which holds the staged changes until
//! `commit`.
//!
//! The `commands` table carries no UNIQUE constraint on `line` or `how_to`.
//! Create uniqueness is checked when staging and checked again inside the
//! commit transaction, with the connection lock held, so concurrent sessions
//! cannot both insert the same value. Updates are not checked.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;
use tracing::{debug, info};

use super::errors::{RepoError, RepoResult};
use super::CommanderRepo;
use crate::model::{Command, UNSAVED_ID};

/// Path that opens a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS commands (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        how_to TEXT NOT NULL,
        line TEXT NOT NULL,
        platform TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_commands_platform ON commands (platform);
";

const SELECT_COMMANDS: &str = "SELECT id, how_to, line, platform FROM commands";

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,

    /// How long a statement waits on a locked database (milliseconds)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl SqliteStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MEMORY_PATH)
    }

    pub fn is_memory(&self) -> bool {
        self.path == Path::new(MEMORY_PATH)
    }
}

/// Shared handle to the command database
#[derive(Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if needed) the database and its schema
    pub fn open(config: &SqliteStoreConfig) -> RepoResult<Self> {
        let connection = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };

        connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        if !config.is_memory() {
            let mode: String =
                connection.pragma_update_and_check(None, "journal_mode", "wal", |row| row.get(0))?;
            debug!(journal_mode = %mode, "sqlite journal mode set");
        }
        connection.execute_batch(SCHEMA)?;

        info!(path = %config.path.display(), "command store opened");

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::open(&SqliteStoreConfig::in_memory())
    }

    /// Start a session with an empty change set
    pub fn session(&self) -> SqliteCommanderRepo {
        SqliteCommanderRepo {
            store: self.clone(),
            staged: Vec::new(),
            created: Vec::new(),
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| RepoError::Store("connection lock poisoned".to_string()))
    }
}

#[derive(Debug, Clone)]
enum StagedChange {
    Create(Command),
    Update(Command),
    Delete(i64),
}

/// A unit of work over [`SqliteStore`]
pub struct SqliteCommanderRepo {
    store: SqliteStore,
    staged: Vec<StagedChange>,
    created: Vec<Command>,
}

impl SqliteCommanderRepo {
    /// Number of changes waiting for `commit`
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    fn staged_creates(&self) -> Vec<&Command> {
        self.staged
            .iter()
            .filter_map(|change| match change {
                StagedChange::Create(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }
}

impl CommanderRepo for SqliteCommanderRepo {
    fn get_all(&self) -> RepoResult<Vec<Command>> {
        let conn = self.store.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COMMANDS))?;
        let rows = stmt.query_map([], row_to_command)?;
        let commands = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(commands)
    }

    fn get_by_id(&self, id: i64) -> RepoResult<Option<Command>> {
        let conn = self.store.lock()?;
        let cmd = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COMMANDS),
                params![id],
                row_to_command,
            )
            .optional()?;
        Ok(cmd)
    }

    fn get_by_platform(&self, platform: &str) -> RepoResult<Vec<Command>> {
        let conn = self.store.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE platform = ?1 ORDER BY id",
            SELECT_COMMANDS
        ))?;
        let rows = stmt.query_map(params![platform], row_to_command)?;
        let commands = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(commands)
    }

    fn create(&mut self, cmd: &Command) -> RepoResult<()> {
        if cmd.id != UNSAVED_ID {
            return Err(RepoError::InvalidArgument(format!(
                "command {} already has a store id",
                cmd.id
            )));
        }

        {
            let conn = self.store.lock()?;
            ensure_unique(&conn, cmd, &self.staged_creates())?;
        }

        self.staged.push(StagedChange::Create(cmd.clone()));
        Ok(())
    }

    fn update(&mut self, cmd: &Command) -> RepoResult<()> {
        if !cmd.is_persisted() {
            return Err(RepoError::InvalidArgument(
                "cannot update a command that has no store id".to_string(),
            ));
        }

        self.staged.push(StagedChange::Update(cmd.clone()));
        Ok(())
    }

    fn delete(&mut self, cmd: &Command) -> RepoResult<()> {
        if !cmd.is_persisted() {
            return Err(RepoError::InvalidArgument(
                "cannot delete a command that has no store id".to_string(),
            ));
        }

        self.staged.push(StagedChange::Delete(cmd.id));
        Ok(())
    }

    /// Returns `true` once the transaction is committed. A failing statement
    /// rolls everything back and is reported as an error; the staged changes
    /// are dropped either way.
    fn commit(&mut self) -> RepoResult<bool> {
        let staged = std::mem::take(&mut self.staged);
        self.created.clear();

        if staged.is_empty() {
            return Ok(true);
        }

        let mut conn = self.store.lock()?;
        let tx = conn.transaction()?;
        let mut affected = 0usize;
        let mut created = Vec::new();

        for change in staged {
            match change {
                StagedChange::Create(cmd) => {
                    ensure_unique(&tx, &cmd, &[])?;
                    affected += tx.execute(
                        "INSERT INTO commands (how_to, line, platform) VALUES (?1, ?2, ?3)",
                        params![cmd.how_to, cmd.line, cmd.platform],
                    )?;
                    created.push(Command {
                        id: tx.last_insert_rowid(),
                        ..cmd
                    });
                }
                StagedChange::Update(cmd) => {
                    affected += tx.execute(
                        "UPDATE commands SET how_to = ?1, line = ?2, platform = ?3 WHERE id = ?4",
                        params![cmd.how_to, cmd.line, cmd.platform, cmd.id],
                    )?;
                }
                StagedChange::Delete(id) => {
                    affected += tx.execute("DELETE FROM commands WHERE id = ?1", params![id])?;
                }
            }
        }

        tx.commit()?;
        drop(conn);

        debug!(affected, created = created.len(), "command changes committed");
        self.created = created;
        Ok(true)
    }

    fn created(&self) -> &[Command] {
        &self.created
    }
}

fn row_to_command(row: &Row<'_>) -> rusqlite::Result<Command> {
    Ok(Command {
        id: row.get(0)?,
        how_to: row.get(1)?,
        line: row.get(2)?,
        platform: row.get(3)?,
    })
}

fn column_has_value(conn: &Connection, column: &str, value: &str) -> RepoResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM commands WHERE {} = ?1 LIMIT 1", column),
            params![value],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// `line` first, then `howTo`; the first clash wins
fn ensure_unique(conn: &Connection, cmd: &Command, pending: &[&Command]) -> RepoResult<()> {
    if column_has_value(conn, "line", &cmd.line)? || pending.iter().any(|p| p.line == cmd.line) {
        return Err(RepoError::duplicate_line());
    }
    if column_has_value(conn, "how_to", &cmd.how_to)?
        || pending.iter().any(|p| p.how_to == cmd.how_to)
    {
        return Err(RepoError::duplicate_how_to());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{DUPLICATE_HOW_TO, DUPLICATE_LINE};

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn insert(store: &SqliteStore, how_to: &str, line: &str, platform: &str) -> Command {
        let mut repo = store.session();
        repo.create(&Command::unsaved(how_to, line, platform)).unwrap();
        assert!(repo.commit().unwrap());
        repo.created()[0].clone()
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let store = store();

        let first = insert(&store, "Run a project", "run x", "Linux");
        let second = insert(&store, "Build a project", "build x", "Linux");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.session().get_all().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_duplicate_line_rejected() {
        let store = store();
        insert(&store, "Run a project", "run x", "Linux");

        let mut repo = store.session();
        let err = repo
            .create(&Command::unsaved("Something else", "run x", "Windows"))
            .unwrap_err();

        assert_eq!(err, RepoError::Duplicate(DUPLICATE_LINE.to_string()));
        assert_eq!(repo.pending(), 0);
    }

    #[test]
    fn test_duplicate_how_to_rejected() {
        let store = store();
        insert(&store, "Run a project", "run x", "Linux");

        let err = store
            .session()
            .create(&Command::unsaved("Run a project", "run y", "Linux"))
            .unwrap_err();

        assert_eq!(err, RepoError::Duplicate(DUPLICATE_HOW_TO.to_string()));
    }

    #[test]
    fn test_line_checked_before_how_to() {
        let store = store();
        insert(&store, "Run a project", "run x", "Linux");

        let err = store
            .session()
            .create(&Command::unsaved("Run a project", "run x", "Linux"))
            .unwrap_err();

        assert_eq!(err, RepoError::duplicate_line());
    }

    #[test]
    fn test_duplicate_among_staged_creates() {
        let store = store();
        let mut repo = store.session();
        repo.create(&Command::unsaved("a", "line", "p")).unwrap();

        let err = repo.create(&Command::unsaved("b", "line", "p")).unwrap_err();

        assert_eq!(err, RepoError::duplicate_line());
    }

    #[test]
    fn test_staged_changes_invisible_until_commit() {
        let store = store();
        let mut repo = store.session();
        repo.create(&Command::unsaved("a", "b", "c")).unwrap();

        assert!(store.session().get_all().unwrap().is_empty());

        repo.commit().unwrap();
        assert_eq!(store.session().get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_dropped_session_discards_changes() {
        let store = store();
        {
            let mut repo = store.session();
            repo.create(&Command::unsaved("a", "b", "c")).unwrap();
        }

        assert!(store.session().get_all().unwrap().is_empty());
    }

    #[test]
    fn test_get_by_id_absent_is_none() {
        let store = store();
        let cmd = insert(&store, "a", "b", "c");
        let repo = store.session();

        assert_eq!(repo.get_by_id(cmd.id).unwrap(), Some(cmd));
        assert_eq!(repo.get_by_id(99).unwrap(), None);
        assert_eq!(repo.get_by_id(-1).unwrap(), None);
    }

    #[test]
    fn test_get_by_platform_exact_match() {
        let store = store();
        let linux = insert(&store, "a", "a", "Linux");
        insert(&store, "b", "b", "linux");
        insert(&store, "c", "c", "Windows");
        let linux2 = insert(&store, "d", "d", "Linux");
        let repo = store.session();

        assert_eq!(repo.get_by_platform("Linux").unwrap(), vec![linux, linux2]);
        assert!(repo.get_by_platform("macOS").unwrap().is_empty());
    }

    #[test]
    fn test_delete_then_absent() {
        let store = store();
        let cmd = insert(&store, "a", "b", "c");

        let mut repo = store.session();
        repo.delete(&cmd).unwrap();
        assert!(repo.get_by_id(cmd.id).unwrap().is_some());
        repo.commit().unwrap();

        assert_eq!(repo.get_by_id(cmd.id).unwrap(), None);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = store();
        let first = insert(&store, "a", "b", "c");
        let mut repo = store.session();
        repo.delete(&first).unwrap();
        repo.commit().unwrap();

        let second = insert(&store, "a", "b", "c");

        assert_eq!(second.id, first.id + 1);
    }

    #[test]
    fn test_update_overwrites_fields() {
        let store = store();
        let mut cmd = insert(&store, "a", "b", "Linux");
        cmd.platform = "Windows".to_string();

        let mut repo = store.session();
        repo.update(&cmd).unwrap();
        repo.commit().unwrap();

        assert_eq!(repo.get_by_id(cmd.id).unwrap(), Some(cmd));
    }

    #[test]
    fn test_update_does_not_check_uniqueness() {
        let store = store();
        insert(&store, "first", "line one", "p");
        let mut second = insert(&store, "second", "line two", "p");
        second.line = "line one".to_string();

        let mut repo = store.session();
        repo.update(&second).unwrap();
        assert!(repo.commit().unwrap());

        assert_eq!(repo.get_by_id(second.id).unwrap().unwrap().line, "line one");
    }

    #[test]
    fn test_invalid_arguments() {
        let store = store();
        let mut repo = store.session();
        let stored = Command {
            id: 4,
            ..Command::unsaved("a", "b", "c")
        };
        let unsaved = Command::unsaved("a", "b", "c");

        assert!(matches!(
            repo.create(&stored),
            Err(RepoError::InvalidArgument(_))
        ));
        assert!(matches!(
            repo.delete(&unsaved),
            Err(RepoError::InvalidArgument(_))
        ));
        assert!(matches!(
            repo.update(&unsaved),
            Err(RepoError::InvalidArgument(_))
        ));
        assert_eq!(repo.pending(), 0);
    }

    #[test]
    fn test_concurrent_sessions_cannot_both_insert() {
        let store = store();
        let mut a = store.session();
        let mut b = store.session();
        a.create(&Command::unsaved("first", "same line", "p")).unwrap();
        b.create(&Command::unsaved("second", "same line", "p")).unwrap();

        a.commit().unwrap();
        let err = b.commit().unwrap_err();

        assert_eq!(err, RepoError::duplicate_line());
        assert!(b.created().is_empty());
        assert_eq!(b.pending(), 0);
        assert_eq!(store.session().get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_commit_rolls_back_whole_batch() {
        let store = store();
        insert(&store, "taken", "taken", "p");
        let mut repo = store.session();
        repo.create(&Command::unsaved("new", "new", "p")).unwrap();
        repo.create(&Command::unsaved("fresh", "fresh", "p")).unwrap();

        // another session takes the second line after it was staged
        let mut racer = store.session();
        racer.create(&Command::unsaved("racer", "fresh", "p")).unwrap();
        racer.commit().unwrap();

        assert!(repo.commit().is_err());
        let lines: Vec<String> = store
            .session()
            .get_all()
            .unwrap()
            .into_iter()
            .map(|c| c.line)
            .collect();
        assert_eq!(lines, vec!["taken", "fresh"]);
    }

    #[test]
    fn test_empty_commit_is_ok() {
        let store = store();
        let mut repo = store.session();
        assert!(repo.commit().unwrap());
        assert!(repo.created().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = SqliteStoreConfig::new(dir.path().join("commands.db"));

        {
            let store = SqliteStore::open(&config).unwrap();
            insert(&store, "a", "b", "c");
        }

        let store = SqliteStore::open(&config).unwrap();
        let all = store.session().get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].line, "b");
    }
}
