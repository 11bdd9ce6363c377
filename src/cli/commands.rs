//! CLI command implementations

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::init_logging;
use crate::repository::{CommanderRepo, SqliteStore, SqliteStoreConfig};

use super::args::CliCommand;
use super::errors::{CliError, CliResult};

/// Config file read when `--config` is not given, if it exists
pub const DEFAULT_CONFIG_PATH: &str = "./commander.json";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file, or ":memory:" (default "./commander.db")
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// SQLite busy timeout in milliseconds (default 5000)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// host, port and cors_origins
    #[serde(flatten)]
    pub http: HttpServerConfig,
}

fn default_database_path() -> String {
    "./commander.db".to_string()
}
fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            http: HttpServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given, else the default file if present, else defaults
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load(default_path);
        }

        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CliResult<()> {
        if self.database_path.trim().is_empty() {
            return Err(CliError::config_error("database_path must not be empty"));
        }

        if self.busy_timeout_ms == 0 {
            return Err(CliError::config_error("busy_timeout_ms must be > 0"));
        }

        self.http.check().map_err(CliError::config_error)?;

        Ok(())
    }

    /// Store settings derived from this config
    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: PathBuf::from(&self.database_path),
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    init_logging();
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: CliCommand) -> CliResult<()> {
    match cmd {
        CliCommand::Init { config } => init(config.as_deref()),
        CliCommand::Serve { config, port } => serve(config.as_deref(), port),
    }
}

/// Create the database file and schema
///
/// Safe to run against an existing database.
pub fn init(config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::resolve(config_path)?;
    let store = open_store(&config)?;
    let commands = store.session().get_all()?.len();

    write_response(json!({
        "initialized": true,
        "database_path": config.database_path,
        "commands": commands,
    }))
}

/// Start the HTTP server and block until it shuts down
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::resolve(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
        config.validate()?;
    }

    let store = open_store(&config)?;
    let server = HttpServer::with_config(config.http.clone(), store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Open the configured store, creating the database directory if needed
pub fn open_store(config: &Config) -> CliResult<SqliteStore> {
    let store_config = config.store_config();

    if !store_config.is_memory() {
        if let Some(parent) = store_config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CliError::store_error(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
    }

    let store = SqliteStore::open(&store_config)?;
    info!(database_path = %config.database_path, "database ready");
    Ok(store)
}

/// Write a success response to stdout
fn write_response(data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
