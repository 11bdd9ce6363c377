//! # Command Endpoints
//!
//! Axum router for the command resource. Each handler opens one repository
//! session, makes one repository call (plus `commit` for writes) and maps the
//! outcome to a status code.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::model::{Command, CommandCreate, CommandRead, CommandUpdate, PatchBody};
use crate::repository::{CommanderRepo, SqliteCommanderRepo, SqliteStore};

use super::errors::{RestError, RestResult};

/// Path prefix of the command resource
pub const COMMANDS_PATH: &str = "/api/commands";

/// Command API state
pub struct CommandsApi {
    store: SqliteStore,
}

impl CommandsApi {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    fn session(&self) -> SqliteCommanderRepo {
        self.store.session()
    }

    /// Build the Axum router, to be nested under [`COMMANDS_PATH`]
    pub fn router(self) -> Router {
        let state = Arc::new(self);

        Router::new()
            .route("/", get(list_handler).post(create_handler))
            .route("/platform", get(platform_handler))
            .route(
                "/{id}",
                get(get_handler)
                    .put(update_handler)
                    .patch(patch_handler)
                    .delete(delete_handler),
            )
            .with_state(state)
    }
}

/// Shared state type
type ApiState = Arc<CommandsApi>;

#[derive(Debug, Deserialize)]
pub struct PlatformQuery {
    #[serde(default)]
    pub platform: Option<String>,
}

fn location(id: i64) -> String {
    format!("{}/{}", COMMANDS_PATH, id)
}

fn read_all(commands: Vec<Command>) -> Vec<CommandRead> {
    commands.into_iter().map(CommandRead::from).collect()
}

/// List every command
async fn list_handler(State(api): State<ApiState>) -> RestResult<Json<Vec<CommandRead>>> {
    let repo = api.session();
    let commands = repo.get_all()?;
    Ok(Json(read_all(commands)))
}

/// Get a single command
async fn get_handler(
    State(api): State<ApiState>,
    Path(id): Path<i64>,
) -> RestResult<Json<CommandRead>> {
    let repo = api.session();
    let cmd = repo.get_by_id(id)?.ok_or(RestError::NotFound)?;
    Ok(Json(CommandRead::from(cmd)))
}

/// List commands for one platform
///
/// Without a `platform` parameter nothing can match.
async fn platform_handler(
    State(api): State<ApiState>,
    Query(query): Query<PlatformQuery>,
) -> RestResult<Json<Vec<CommandRead>>> {
    let Some(platform) = query.platform else {
        return Ok(Json(Vec::new()));
    };

    let repo = api.session();
    let commands = repo.get_by_platform(&platform)?;
    Ok(Json(read_all(commands)))
}

/// Create a command
async fn create_handler(
    State(api): State<ApiState>,
    Json(body): Json<CommandCreate>,
) -> RestResult<impl IntoResponse> {
    body.validate()?;

    let mut repo = api.session();
    repo.create(&Command::from(body))?;
    repo.commit()?;

    let created = repo
        .created()
        .first()
        .cloned()
        .ok_or_else(|| RestError::Internal("commit returned no inserted command".to_string()))?;

    info!(id = created.id, "command created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location(created.id))],
        Json(CommandRead::from(created)),
    ))
}

/// Replace every field of a command
async fn update_handler(
    State(api): State<ApiState>,
    Path(id): Path<i64>,
    Json(body): Json<CommandUpdate>,
) -> RestResult<StatusCode> {
    body.validate()?;

    let mut repo = api.session();
    let mut cmd = repo.get_by_id(id)?.ok_or(RestError::NotFound)?;

    cmd.apply(body);
    repo.update(&cmd)?;
    repo.commit()?;

    info!(id, "command updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Patch a command
///
/// The body is taken as raw JSON so a malformed document still gets a
/// validation problem. The patch goes onto a transient copy that is
/// validated before anything is written.
async fn patch_handler(
    State(api): State<ApiState>,
    Path(id): Path<i64>,
    Json(document): Json<Value>,
) -> RestResult<StatusCode> {
    let mut repo = api.session();
    let mut cmd = repo.get_by_id(id)?.ok_or(RestError::NotFound)?;

    let body = PatchBody::parse(document)?;
    let mut patched = CommandUpdate::from(&cmd);
    body.apply_to(&mut patched)?;

    cmd.apply(patched);
    repo.update(&cmd)?;
    repo.commit()?;

    info!(id, "command patched");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a command
async fn delete_handler(
    State(api): State<ApiState>,
    Path(id): Path<i64>,
) -> RestResult<StatusCode> {
    let mut repo = api.session();
    let cmd = repo.get_by_id(id)?.ok_or(RestError::NotFound)?;

    repo.delete(&cmd)?;
    repo.commit()?;

    info!(id, "command deleted");
    Ok(StatusCode::NO_CONTENT)
}
