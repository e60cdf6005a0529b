//! # Guarita - Authentication & Session-Security Library
//!
//! Facade crate that re-exports the public APIs of the guarita workspace.
//!
//! Guarita is the authentication subsystem of a multi-tenant billing
//! backend. It covers credential verification with failed-attempt lockout,
//! an email one-time-code second factor, password-reset tickets, and signed
//! access/refresh token issuance. Every security-relevant fact is persisted
//! through an append-only event log; "is this still valid" questions are
//! answered by querying the most recent matching records, never by flipping
//! a status column.
//!
//! ## Structure
//!
//! - **Core domain types**: `Account`, `EventRecord`, `OneTimeCode`,
//!   `ResetToken`, `AccessClaims`, plus the port traits (`AccountStore`,
//!   `EventStore`, `EmailDispatcher`, `CredentialHasher`, `TokenCodec`).
//! - **Application**: `LockoutGuard`, `CredentialVerifier`,
//!   `TwoFactorChallenge`, `PasswordResetFlow`, `TokenIssuer` and the
//!   use cases composing them.
//! - **Adapters**: Postgres and in-memory stores, Argon2 hashing, JWT
//!   codec, Postmark email dispatch, configuration.
//! - **Service**: the axum router and standalone server.

pub use guarita_adapters as adapters;
pub use guarita_application as application;
pub use guarita_auth_service as auth_service;
pub use guarita_core as core;

pub use guarita_core::{
    Account, AccountStore, AccountStoreError, ActionKind, CredentialHasher, Email,
    EmailDispatcher, EventRecord, EventStore, EventStoreError, OneTimeCode, Password, ResetToken,
    SubjectType, TokenCodec,
};

pub use guarita_auth_service::AuthService;

// Re-exported so downstream callers construct ports and secrets without
// naming the underlying crates.
pub use async_trait::async_trait;
pub use secrecy::{ExposeSecret, Secret};
