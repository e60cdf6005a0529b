//! Infrastructure adapters: PostgreSQL stores, Argon2 hashing, JWT signing,
//! the Postmark email client, and configuration loading.

pub mod config;
pub mod email;
pub mod hashing;
pub mod persistence;
pub mod tokens;
