//! # passwd-web
//!
//! HTTP front-end for self-service password changes. Collects the user's
//! current and new password, runs the change orchestrator and maps its
//! result to a generic, non-leaking response.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use routes::router;
pub use state::AppState;
