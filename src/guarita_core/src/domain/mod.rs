pub mod account;
pub mod claims;
pub mod email;
pub mod event;
pub mod one_time_code;
pub mod password;
pub mod reset_ticket;

use thiserror::Error;

/// Validation failures for values arriving from the boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    WeakPassword,
    #[error("Two-factor code must be exactly 6 digits")]
    MalformedCode,
    #[error("Malformed reset token")]
    MalformedTicket,
}
