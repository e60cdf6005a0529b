use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use guarita_core::{
    Account, ActionKind, ConsumeOutcome, EmailDispatcher, EventStore, EventStoreError,
    NewEventRecord, OneTimeCode, SubjectType,
};

/// Lifetime of a one-time code.
pub const CODE_TTL_MINUTES: i64 = 5;

fn code_ttl() -> Duration {
    Duration::minutes(CODE_TTL_MINUTES)
}

/// Error types for the two-factor challenge
#[derive(Debug, thiserror::Error)]
pub enum TwoFactorError {
    #[error("Two-factor code is invalid or expired")]
    CodeInvalidOrExpired,
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
}

/// One-time email code issuance and verification, persisted entirely as
/// `CodeIssued`/`CodeConsumed` records.
///
/// Issuing a new code does not invalidate outstanding ones; several
/// unexpired codes can be valid for the same account at once. Each is still
/// spendable at most once.
#[derive(Clone)]
pub struct TwoFactorChallenge<S, D>
where
    S: EventStore,
    D: EmailDispatcher,
{
    events: S,
    mailer: D,
}

impl<S, D> TwoFactorChallenge<S, D>
where
    S: EventStore,
    D: EmailDispatcher,
{
    pub fn new(events: S, mailer: D) -> Self {
        Self { events, mailer }
    }

    /// Whether the account has the second factor switched on: the latest of
    /// `TwoFactorEnabled`/`TwoFactorDisabled` wins, defaulting to off.
    #[tracing::instrument(name = "TwoFactorChallenge::is_enabled", skip(self))]
    pub async fn is_enabled(&self, account_id: Uuid) -> Result<bool, TwoFactorError> {
        let latest = self
            .events
            .latest(
                SubjectType::Account,
                &account_id.to_string(),
                &[ActionKind::TwoFactorEnabled, ActionKind::TwoFactorDisabled],
            )
            .await?;

        Ok(matches!(
            latest,
            Some(record) if record.action_kind == ActionKind::TwoFactorEnabled
        ))
    }

    /// Record a fresh code and email it.
    ///
    /// The `CodeIssued` record is durable before dispatch; a mail failure is
    /// returned as a warning string, never an error, and never unwinds the
    /// issuance.
    #[tracing::instrument(name = "TwoFactorChallenge::issue_code", skip(self, account))]
    pub async fn issue_code(&self, account: &Account) -> Result<Option<String>, TwoFactorError> {
        let code = OneTimeCode::generate();
        let now = Utc::now();

        self.events
            .append(
                NewEventRecord::new(
                    SubjectType::TwoFactorCode,
                    account.id.to_string(),
                    ActionKind::CodeIssued,
                    now,
                )
                .actor(account.id)
                .new_state(json!({
                    "code": code.as_str(),
                    "expires_at": now + code_ttl(),
                })),
            )
            .await?;

        let body = format!(
            "<p>Your verification code is <strong>{}</strong>.</p>\
             <p>It expires in {} minutes.</p>",
            code.as_str(),
            CODE_TTL_MINUTES,
        );

        match self
            .mailer
            .send(&account.email, "Your verification code", &body)
            .await
        {
            Ok(()) => Ok(None),
            Err(failure) => {
                tracing::warn!(error = %failure, "code recorded but email dispatch failed");
                Ok(Some(failure.to_string()))
            }
        }
    }

    /// Find an unexpired, unconsumed issuance matching the submitted code
    /// and spend it.
    ///
    /// Spending is a conditional append in the store, so two concurrent
    /// verifications of the same code cannot both succeed.
    #[tracing::instrument(name = "TwoFactorChallenge::verify_code", skip(self, submitted))]
    pub async fn verify_code(
        &self,
        account_id: Uuid,
        submitted: &OneTimeCode,
    ) -> Result<(), TwoFactorError> {
        let now = Utc::now();
        let subject = account_id.to_string();

        let issued = self
            .events
            .recent(
                SubjectType::TwoFactorCode,
                &subject,
                ActionKind::CodeIssued,
                now - code_ttl(),
            )
            .await?;

        for issuance in issued {
            let code_matches = issuance.payload_str("code") == Some(submitted.as_str());
            let unexpired = issuance.expires_at().is_some_and(|at| at > now);
            if !code_matches || !unexpired {
                continue;
            }

            let consuming = NewEventRecord::new(
                SubjectType::TwoFactorCode,
                &subject,
                ActionKind::CodeConsumed,
                now,
            )
            .actor(account_id)
            .new_state(json!({ "issuance_id": issuance.id }));

            match self.events.consume(issuance.id, vec![consuming]).await? {
                ConsumeOutcome::Consumed => return Ok(()),
                ConsumeOutcome::AlreadyConsumed => continue,
            }
        }

        Err(TwoFactorError::CodeInvalidOrExpired)
    }

    /// Flip the second factor on or off. Plain appends; the latest record
    /// wins.
    #[tracing::instrument(name = "TwoFactorChallenge::toggle", skip(self))]
    pub async fn toggle(&self, account_id: Uuid, enable: bool) -> Result<(), TwoFactorError> {
        let previously_enabled = self.is_enabled(account_id).await?;
        let kind = if enable {
            ActionKind::TwoFactorEnabled
        } else {
            ActionKind::TwoFactorDisabled
        };

        self.events
            .append(
                NewEventRecord::new(
                    SubjectType::Account,
                    account_id.to_string(),
                    kind,
                    Utc::now(),
                )
                .actor(account_id)
                .prior_state(json!({ "enabled": previously_enabled }))
                .new_state(json!({ "enabled": enable })),
            )
            .await?;
        Ok(())
    }
}
