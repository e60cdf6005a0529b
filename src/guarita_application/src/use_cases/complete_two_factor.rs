use uuid::Uuid;

use guarita_core::{
    AccountStore, AccountStoreError, AccountSummary, EmailDispatcher, EventStore,
    EventStoreError, OneTimeCode, TokenCodec, TokenError, TokenPair,
};

use crate::{
    token_issuer::{TokenIssueError, TokenIssuer},
    two_factor::{TwoFactorChallenge, TwoFactorError},
};

/// Error types for completing the two-factor challenge
#[derive(Debug, thiserror::Error)]
pub enum CompleteTwoFactorError {
    #[error("Two-factor code is invalid or expired")]
    CodeInvalidOrExpired,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl From<TwoFactorError> for CompleteTwoFactorError {
    fn from(error: TwoFactorError) -> Self {
        match error {
            TwoFactorError::CodeInvalidOrExpired => CompleteTwoFactorError::CodeInvalidOrExpired,
            TwoFactorError::EventStoreError(e) => CompleteTwoFactorError::EventStoreError(e),
        }
    }
}

impl From<TokenIssueError> for CompleteTwoFactorError {
    fn from(error: TokenIssueError) -> Self {
        match error {
            TokenIssueError::TokenError(e) => CompleteTwoFactorError::TokenError(e),
            TokenIssueError::EventStoreError(e) => CompleteTwoFactorError::EventStoreError(e),
        }
    }
}

/// Second half of a challenged login: spend the emailed code, then mint the
/// token pair the first half withheld.
#[derive(Clone)]
pub struct CompleteTwoFactorUseCase<A, S, C, D>
where
    A: AccountStore,
    S: EventStore,
    C: TokenCodec,
    D: EmailDispatcher,
{
    accounts: A,
    challenge: TwoFactorChallenge<S, D>,
    issuer: TokenIssuer<S, C>,
}

impl<A, S, C, D> CompleteTwoFactorUseCase<A, S, C, D>
where
    A: AccountStore,
    S: EventStore + Clone,
    C: TokenCodec,
    D: EmailDispatcher,
{
    pub fn new(accounts: A, events: S, codec: C, mailer: D) -> Self {
        Self {
            accounts,
            challenge: TwoFactorChallenge::new(events.clone(), mailer),
            issuer: TokenIssuer::new(events, codec),
        }
    }

    /// Execute the use case. An unknown account id fails exactly like a bad
    /// code, so the endpoint cannot be used to probe for accounts.
    #[tracing::instrument(name = "CompleteTwoFactorUseCase::execute", skip(self, code))]
    pub async fn execute(
        &self,
        account_id: Uuid,
        code: OneTimeCode,
    ) -> Result<(TokenPair, AccountSummary), CompleteTwoFactorError> {
        self.challenge.verify_code(account_id, &code).await?;

        let account = match self.accounts.find_by_id(account_id).await {
            Ok(account) => account,
            Err(AccountStoreError::AccountNotFound) => {
                return Err(CompleteTwoFactorError::CodeInvalidOrExpired);
            }
            Err(e) => return Err(e.into()),
        };

        let tokens = self.issuer.issue_pair(&account).await?;
        Ok((tokens, AccountSummary::from(&account)))
    }
}

#[cfg(test)]
mod tests {
    use guarita_core::ActionKind;

    use super::*;
    use crate::test_support::{
        seeded_account, MockAccountStore, MockCodec, MockEmailDispatcher, MockEventStore,
    };

    async fn issued_code(events: &MockEventStore) -> OneTimeCode {
        let issued = events.records_of_kind(ActionKind::CodeIssued).await;
        OneTimeCode::parse(issued.last().unwrap().payload_str("code").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn valid_code_yields_a_token_pair() {
        let accounts = MockAccountStore::default();
        let events = MockEventStore::default();
        let mailer = MockEmailDispatcher::default();
        let account = seeded_account("alice", "alice@example.com", "Secret1!");
        accounts.insert(account.clone()).await;

        let challenge = TwoFactorChallenge::new(events.clone(), mailer.clone());
        challenge.issue_code(&account).await.unwrap();
        let code = issued_code(&events).await;

        let use_case =
            CompleteTwoFactorUseCase::new(accounts, events.clone(), MockCodec, mailer);
        let (_tokens, summary) = use_case.execute(account.id, code).await.unwrap();

        assert_eq!(summary.id, account.id);
        assert_eq!(events.records_of_kind(ActionKind::TokenIssued).await.len(), 1);
    }

    #[tokio::test]
    async fn spent_code_cannot_complete_a_second_login() {
        let accounts = MockAccountStore::default();
        let events = MockEventStore::default();
        let mailer = MockEmailDispatcher::default();
        let account = seeded_account("alice", "alice@example.com", "Secret1!");
        accounts.insert(account.clone()).await;

        let challenge = TwoFactorChallenge::new(events.clone(), mailer.clone());
        challenge.issue_code(&account).await.unwrap();
        let code = issued_code(&events).await;

        let use_case =
            CompleteTwoFactorUseCase::new(accounts, events.clone(), MockCodec, mailer);
        use_case.execute(account.id, code.clone()).await.unwrap();

        let repeat = use_case.execute(account.id, code).await;
        assert!(matches!(
            repeat,
            Err(CompleteTwoFactorError::CodeInvalidOrExpired)
        ));
    }

    #[tokio::test]
    async fn unknown_account_fails_like_a_bad_code() {
        let accounts = MockAccountStore::default();
        let events = MockEventStore::default();
        let mailer = MockEmailDispatcher::default();

        let use_case =
            CompleteTwoFactorUseCase::new(accounts, events, MockCodec, mailer);
        let result = use_case
            .execute(Uuid::new_v4(), OneTimeCode::parse("123456").unwrap())
            .await;

        assert!(matches!(
            result,
            Err(CompleteTwoFactorError::CodeInvalidOrExpired)
        ));
    }
}
