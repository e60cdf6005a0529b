use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    account::Account,
    email::Email,
    event::{ActionKind, EventRecord, NewEventRecord, SubjectType},
};

// AccountStore port trait and errors
#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("Account not found")]
    AccountNotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for AccountStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::AccountNotFound, Self::AccountNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Mutable account state: lookups, the credential hash and the
/// failed-attempt counter.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Resolve a login identifier. A username match takes precedence over an
    /// email match; the two lookups are never merged.
    async fn find_by_username_or_email(&self, identifier: &str)
        -> Result<Account, AccountStoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Account, AccountStoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Account, AccountStoreError>;

    async fn update_credential(
        &self,
        id: Uuid,
        new_hash: Secret<String>,
    ) -> Result<(), AccountStoreError>;

    /// Add one to the failed-attempt counter and return the new value. Must
    /// be a single atomic statement, never read-modify-write in application
    /// code, so concurrent failures cannot under-count.
    async fn increment_failure_counter(&self, id: Uuid) -> Result<i32, AccountStoreError>;

    async fn reset_failure_counter(&self, id: Uuid) -> Result<(), AccountStoreError>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AccountStoreError>;
}

// EventStore port trait and errors
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("Event store error: {0}")]
    DatabaseError(String),
}

/// Outcome of a conditional consuming append.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Consumed,
    /// A record of the consuming kind already references the issuance; the
    /// batch was not appended.
    AlreadyConsumed,
}

/// The append-only security log.
///
/// Records are never updated or deleted. The one conditional operation,
/// [`EventStore::consume`], still only ever appends; the condition guards
/// against appending a second consumer for the same issuance.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append(&self, record: NewEventRecord) -> Result<EventRecord, EventStoreError>;

    /// Append several records atomically; either all land or none do.
    async fn append_all(&self, records: Vec<NewEventRecord>) -> Result<(), EventStoreError>;

    /// The newest record for the subject whose kind is one of `kinds`.
    async fn latest(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kinds: &[ActionKind],
    ) -> Result<Option<EventRecord>, EventStoreError>;

    /// Records of `kind` for the subject recorded at or after `since`,
    /// newest first. Bounding the scan keeps validity checks from degrading
    /// as the log grows.
    async fn recent(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kind: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, EventStoreError>;

    /// Append `records` in one transaction iff no record of the batch
    /// head's kind already references `issuance_id` (via the
    /// `issuance_id` payload field). This is the at-most-once guarantee for
    /// one-time codes and reset tickets under concurrent verification.
    async fn consume(
        &self,
        issuance_id: i64,
        records: Vec<NewEventRecord>,
    ) -> Result<ConsumeOutcome, EventStoreError>;
}
