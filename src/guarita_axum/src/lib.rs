//! Axum integration for the authentication library.
//!
//! Route handlers extract and validate the wire format, hand off to the
//! framework-agnostic use cases in `guarita_application`, and translate
//! their errors into HTTP status codes. No authentication logic lives here.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::AuthApiError;
pub use state::AppState;
