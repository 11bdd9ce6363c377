//! # Commander REST API Module
//!
//! HTTP endpoints for the command resource, backed by the repository.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /api/commands` | 200 | |
//! | `GET /api/commands/{id}` | 200 | 404 |
//! | `GET /api/commands/platform?platform=` | 200 | |
//! | `POST /api/commands` | 201 + `Location` | 400 duplicate, 422 |
//! | `PUT /api/commands/{id}` | 204 | 404, 422 |
//! | `PATCH /api/commands/{id}` | 204 | 404, 422 |
//! | `DELETE /api/commands/{id}` | 204 | 404 |

pub mod errors;
pub mod response;
pub mod server;

pub use errors::{RestError, RestResult};
pub use response::{MessageResponse, ValidationProblem, VALIDATION_TITLE};
pub use server::{CommandsApi, COMMANDS_PATH};
