use uuid::Uuid;

use guarita_core::{EmailDispatcher, EventStore, EventStoreError};

use crate::two_factor::{TwoFactorChallenge, TwoFactorError};

/// Error types for switching the second factor on or off
#[derive(Debug, thiserror::Error)]
pub enum ToggleTwoFactorError {
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
}

impl From<TwoFactorError> for ToggleTwoFactorError {
    fn from(error: TwoFactorError) -> Self {
        match error {
            // toggle never reads codes, so this arm is unreachable in
            // practice; map it to the store anyway rather than panic.
            TwoFactorError::CodeInvalidOrExpired => ToggleTwoFactorError::EventStoreError(
                EventStoreError::DatabaseError("unexpected code state".to_string()),
            ),
            TwoFactorError::EventStoreError(e) => ToggleTwoFactorError::EventStoreError(e),
        }
    }
}

/// Flips email-code verification on or off for one account and returns the
/// resulting setting.
#[derive(Clone)]
pub struct ToggleTwoFactorUseCase<S, D>
where
    S: EventStore,
    D: EmailDispatcher,
{
    challenge: TwoFactorChallenge<S, D>,
}

impl<S, D> ToggleTwoFactorUseCase<S, D>
where
    S: EventStore,
    D: EmailDispatcher,
{
    pub fn new(events: S, mailer: D) -> Self {
        Self {
            challenge: TwoFactorChallenge::new(events, mailer),
        }
    }

    #[tracing::instrument(name = "ToggleTwoFactorUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        account_id: Uuid,
        enabled: bool,
    ) -> Result<bool, ToggleTwoFactorError> {
        self.challenge.toggle(account_id, enabled).await?;
        Ok(enabled)
    }
}
