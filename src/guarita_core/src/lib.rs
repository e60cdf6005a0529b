pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    account::{Account, AccountStatus, AccountSummary},
    claims::{AccessClaims, RefreshClaims, TokenPair, REFRESH_TOKEN_TYPE},
    email::Email,
    event::{ActionKind, EventRecord, NewEventRecord, SubjectType, ISSUANCE_ID_KEY},
    one_time_code::OneTimeCode,
    password::Password,
    reset_ticket::ResetToken,
    InputError,
};

pub use ports::{
    repositories::{
        AccountStore, AccountStoreError, ConsumeOutcome, EventStore, EventStoreError,
    },
    services::{
        CredentialHashError, CredentialHasher, DispatchFailure, EmailDispatcher, TokenCodec,
        TokenError,
    },
};
