//! commander - store and look up command-line snippets over HTTP
//!
//! A single `Command` resource (`howTo`, `line`, `platform`) served by Axum
//! and persisted in SQLite through a staged-change repository.

pub mod cli;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod repository;
pub mod rest_api;
