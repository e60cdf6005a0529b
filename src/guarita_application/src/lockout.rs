use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use guarita_core::{
    AccountStore, AccountStoreError, ActionKind, EventStore, EventStoreError, NewEventRecord,
    SubjectType,
};

/// Consecutive failures that trip the lock.
pub const MAX_ATTEMPTS: i32 = 5;

/// How long a tripped lock refuses logins. The window is fixed from the
/// `AccountLocked` record's timestamp; later failures do not extend it.
pub const LOCK_DURATION_MINUTES: i64 = 30;

pub(crate) fn lock_duration() -> Duration {
    Duration::minutes(LOCK_DURATION_MINUTES)
}

/// Error types for lockout transitions
#[derive(Debug, thiserror::Error)]
pub enum LockoutError {
    #[error("Account is temporarily locked")]
    AccountLocked,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
}

/// Per-account Unlocked/Locked state machine.
///
/// The counter lives on the account row (the one atomic mutable integer in
/// the subsystem); whether a lock is *active* is derived from the log: an
/// `AccountLocked` record inside the window with no newer `LoginSucceeded`
/// for the same account.
#[derive(Clone)]
pub struct LockoutGuard<A, S>
where
    A: AccountStore,
    S: EventStore,
{
    accounts: A,
    events: S,
}

impl<A, S> LockoutGuard<A, S>
where
    A: AccountStore,
    S: EventStore,
{
    pub fn new(accounts: A, events: S) -> Self {
        Self { accounts, events }
    }

    /// Refuse the login if a lock recorded within the last
    /// `LOCK_DURATION_MINUTES` has not been superseded by a successful
    /// login.
    #[tracing::instrument(name = "LockoutGuard::check_not_locked", skip(self))]
    pub async fn check_not_locked(&self, account_id: Uuid) -> Result<(), LockoutError> {
        let latest = self
            .events
            .latest(
                SubjectType::Account,
                &account_id.to_string(),
                &[ActionKind::AccountLocked, ActionKind::LoginSucceeded],
            )
            .await?;

        if let Some(record) = latest {
            if record.action_kind == ActionKind::AccountLocked
                && record.recorded_at + lock_duration() > Utc::now()
            {
                return Err(LockoutError::AccountLocked);
            }
        }

        Ok(())
    }

    /// Record one failed attempt and return the post-increment count.
    ///
    /// The increment is a single atomic statement in the store. The
    /// `LoginFailed` record, and the `AccountLocked` record when the
    /// threshold is reached, land in one transaction.
    #[tracing::instrument(name = "LockoutGuard::record_failure", skip(self))]
    pub async fn record_failure(&self, account_id: Uuid) -> Result<i32, LockoutError> {
        let new_count = self.accounts.increment_failure_counter(account_id).await?;
        let now = Utc::now();
        let subject = account_id.to_string();

        let mut batch = vec![
            NewEventRecord::new(SubjectType::Account, &subject, ActionKind::LoginFailed, now)
                .actor(account_id)
                .new_state(json!({ "failed_attempts": new_count })),
        ];

        if new_count >= MAX_ATTEMPTS {
            batch.push(
                NewEventRecord::new(SubjectType::Account, &subject, ActionKind::AccountLocked, now)
                    .actor(account_id)
                    .new_state(json!({
                        "failed_attempts": new_count,
                        "expires_at": now + lock_duration(),
                    }))
                    .note("failed-attempt threshold reached"),
            );
        }

        self.events.append_all(batch).await?;
        Ok(new_count)
    }

    /// Zero the counter, append `LoginSucceeded` and stamp the login time.
    /// The `LoginSucceeded` record is also what clears any prior lock.
    #[tracing::instrument(name = "LockoutGuard::reset_on_success", skip(self))]
    pub async fn reset_on_success(&self, account_id: Uuid) -> Result<(), LockoutError> {
        let now = Utc::now();
        self.accounts.reset_failure_counter(account_id).await?;
        self.events
            .append(
                NewEventRecord::new(
                    SubjectType::Account,
                    account_id.to_string(),
                    ActionKind::LoginSucceeded,
                    now,
                )
                .actor(account_id),
            )
            .await?;
        self.accounts.record_login(account_id, now).await?;
        Ok(())
    }
}
