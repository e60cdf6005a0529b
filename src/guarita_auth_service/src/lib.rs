mod auth_service;
mod helpers;
mod tracing;

pub use auth_service::AuthService;
pub use helpers::{configure_postgresql, get_postgres_pool, init_tracing};

// Re-export commonly used types
pub use guarita_core::{AccountStore, CredentialHasher, EmailDispatcher, EventStore, TokenCodec};
