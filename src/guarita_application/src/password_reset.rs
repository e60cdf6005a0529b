use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use guarita_core::{
    AccountStore, AccountStoreError, ActionKind, ConsumeOutcome, CredentialHashError,
    CredentialHasher, Email, EmailDispatcher, EventStore, EventStoreError, NewEventRecord,
    Password, ResetToken, SubjectType,
};

/// Lifetime of a reset ticket.
pub const TICKET_TTL_MINUTES: i64 = 30;

fn ticket_ttl() -> Duration {
    Duration::minutes(TICKET_TTL_MINUTES)
}

/// Error types for the password-reset flow
#[derive(Debug, thiserror::Error)]
pub enum PasswordResetError {
    #[error("Reset ticket is invalid or expired")]
    InvalidOrExpiredTicket,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
    #[error("Hashing error: {0}")]
    CredentialHashError(#[from] CredentialHashError),
}

/// Single-use, time-boxed reset tickets, persisted as
/// `ResetTicketIssued`/`ResetTicketRedeemed` records keyed by the opaque
/// token itself.
#[derive(Clone)]
pub struct PasswordResetFlow<A, S, H, D>
where
    A: AccountStore,
    S: EventStore,
    H: CredentialHasher,
    D: EmailDispatcher,
{
    accounts: A,
    events: S,
    hasher: H,
    mailer: D,
}

impl<A, S, H, D> PasswordResetFlow<A, S, H, D>
where
    A: AccountStore,
    S: EventStore,
    H: CredentialHasher,
    D: EmailDispatcher,
{
    pub fn new(accounts: A, events: S, hasher: H, mailer: D) -> Self {
        Self {
            accounts,
            events,
            hasher,
            mailer,
        }
    }

    /// Issue a ticket for the account behind `email` and mail the token.
    ///
    /// An unknown email returns the same generic acknowledgment with no side
    /// effect at all; callers cannot learn whether the address exists. A
    /// dispatch failure is returned as a warning, never an error.
    #[tracing::instrument(name = "PasswordResetFlow::request_reset", skip(self, email))]
    pub async fn request_reset(&self, email: &Email) -> Result<Option<String>, PasswordResetError> {
        let account = match self.accounts.find_by_email(email).await {
            Ok(account) => account,
            Err(AccountStoreError::AccountNotFound) => {
                tracing::debug!("reset requested for an unknown email, acknowledging blindly");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let token = ResetToken::generate();
        let now = Utc::now();

        self.events
            .append(
                NewEventRecord::new(
                    SubjectType::ResetTicket,
                    token.as_str(),
                    ActionKind::ResetTicketIssued,
                    now,
                )
                .actor(account.id)
                .new_state(json!({
                    "account_id": account.id,
                    "expires_at": now + ticket_ttl(),
                })),
            )
            .await?;

        let body = format!(
            "<p>A password reset was requested for your account.</p>\
             <p>Your reset token is <strong>{}</strong>. It is valid for {} minutes \
             and can be used once.</p>\
             <p>If you did not request this, you can ignore this message.</p>",
            token.as_str(),
            TICKET_TTL_MINUTES,
        );

        match self
            .mailer
            .send(&account.email, "Password reset", &body)
            .await
        {
            Ok(()) => Ok(None),
            Err(failure) => {
                tracing::warn!(error = %failure, "ticket recorded but email dispatch failed");
                Ok(Some(failure.to_string()))
            }
        }
    }

    /// Whether the token still authorizes a reset: issued, unexpired, and
    /// not yet redeemed.
    #[tracing::instrument(name = "PasswordResetFlow::verify_ticket", skip_all)]
    pub async fn verify_ticket(&self, token: &ResetToken) -> Result<bool, PasswordResetError> {
        let latest = self
            .events
            .latest(
                SubjectType::ResetTicket,
                token.as_str(),
                &[
                    ActionKind::ResetTicketIssued,
                    ActionKind::ResetTicketRedeemed,
                ],
            )
            .await?;

        Ok(matches!(
            latest,
            Some(record)
                if record.action_kind == ActionKind::ResetTicketIssued
                    && record.expires_at().is_some_and(|at| at > Utc::now())
        ))
    }

    /// Spend the ticket and replace the credential.
    ///
    /// The `ResetTicketRedeemed` and `SessionEnded` records land in one
    /// conditional transaction; only the winner of a concurrent race goes on
    /// to replace the hash and zero the failure counter.
    #[tracing::instrument(name = "PasswordResetFlow::redeem", skip_all)]
    pub async fn redeem(
        &self,
        token: &ResetToken,
        new_password: &Password,
    ) -> Result<(), PasswordResetError> {
        let now = Utc::now();

        let issuance = self
            .events
            .latest(
                SubjectType::ResetTicket,
                token.as_str(),
                &[ActionKind::ResetTicketIssued],
            )
            .await?
            .ok_or(PasswordResetError::InvalidOrExpiredTicket)?;

        if !issuance.expires_at().is_some_and(|at| at > now) {
            return Err(PasswordResetError::InvalidOrExpiredTicket);
        }

        let account_id = issuance
            .payload_str("account_id")
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| {
                EventStoreError::DatabaseError("ticket issuance is missing its account id".into())
            })?;

        let new_hash = self.hasher.hash(new_password).await?;

        let redeemed = NewEventRecord::new(
            SubjectType::ResetTicket,
            token.as_str(),
            ActionKind::ResetTicketRedeemed,
            now,
        )
        .actor(account_id)
        .new_state(json!({ "issuance_id": issuance.id }));

        let session_ended = NewEventRecord::new(
            SubjectType::Session,
            account_id.to_string(),
            ActionKind::SessionEnded,
            now,
        )
        .actor(account_id)
        .note("password reset; previously issued tokens are stale");

        match self
            .events
            .consume(issuance.id, vec![redeemed, session_ended])
            .await?
        {
            ConsumeOutcome::AlreadyConsumed => Err(PasswordResetError::InvalidOrExpiredTicket),
            ConsumeOutcome::Consumed => {
                self.accounts.update_credential(account_id, new_hash).await?;
                self.accounts.reset_failure_counter(account_id).await?;
                Ok(())
            }
        }
    }
}
