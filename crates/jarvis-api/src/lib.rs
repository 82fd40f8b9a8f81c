//! Jarvis API crate - axum HTTP server and route handlers.
//!
//! Exposes the chat pipeline and document upload over a small JSON API.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
