use uuid::Uuid;

use guarita_core::{
    AccountStore, AccountStoreError, AccountSummary, CredentialHasher, EmailDispatcher,
    EventStore, EventStoreError, Password, TokenCodec, TokenError, TokenPair,
};

use crate::{
    credential::{CredentialError, CredentialVerifier},
    lockout::{LockoutError, LockoutGuard},
    token_issuer::{TokenIssueError, TokenIssuer},
    two_factor::{TwoFactorChallenge, TwoFactorError},
};

/// Response from the login use case
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials accepted, no second factor configured.
    TokensIssued {
        tokens: TokenPair,
        account: AccountSummary,
    },
    /// Credentials accepted, a one-time code was emailed; no tokens yet.
    ChallengeIssued {
        account_id: Uuid,
        /// Set when the code email could not be dispatched.
        warning: Option<String>,
    },
}

/// Error types specific to the login use case
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is temporarily locked")]
    AccountLocked,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl From<CredentialError> for LoginError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::InvalidCredentials => LoginError::InvalidCredentials,
            CredentialError::AccountLocked => LoginError::AccountLocked,
            CredentialError::AccountStoreError(e) => LoginError::AccountStoreError(e),
            CredentialError::EventStoreError(e) => LoginError::EventStoreError(e),
        }
    }
}

impl From<LockoutError> for LoginError {
    fn from(error: LockoutError) -> Self {
        match error {
            LockoutError::AccountLocked => LoginError::AccountLocked,
            LockoutError::AccountStoreError(e) => LoginError::AccountStoreError(e),
            LockoutError::EventStoreError(e) => LoginError::EventStoreError(e),
        }
    }
}

impl From<TwoFactorError> for LoginError {
    fn from(error: TwoFactorError) -> Self {
        match error {
            // verify_code is never called from login; issuance only fails on
            // the store.
            TwoFactorError::CodeInvalidOrExpired => LoginError::InvalidCredentials,
            TwoFactorError::EventStoreError(e) => LoginError::EventStoreError(e),
        }
    }
}

impl From<TokenIssueError> for LoginError {
    fn from(error: TokenIssueError) -> Self {
        match error {
            TokenIssueError::TokenError(e) => LoginError::TokenError(e),
            TokenIssueError::EventStoreError(e) => LoginError::EventStoreError(e),
        }
    }
}

/// The top-level login state machine: lockout check, credential
/// verification, counter reset, then either a two-factor challenge or a
/// token pair.
#[derive(Clone)]
pub struct LoginUseCase<A, S, H, C, D>
where
    A: AccountStore,
    S: EventStore,
    H: CredentialHasher,
    C: TokenCodec,
    D: EmailDispatcher,
{
    lockout: LockoutGuard<A, S>,
    verifier: CredentialVerifier<A, S, H>,
    challenge: TwoFactorChallenge<S, D>,
    issuer: TokenIssuer<S, C>,
}

impl<A, S, H, C, D> LoginUseCase<A, S, H, C, D>
where
    A: AccountStore + Clone,
    S: EventStore + Clone,
    H: CredentialHasher,
    C: TokenCodec,
    D: EmailDispatcher,
{
    pub fn new(accounts: A, events: S, hasher: H, codec: C, mailer: D) -> Self {
        Self {
            lockout: LockoutGuard::new(accounts.clone(), events.clone()),
            verifier: CredentialVerifier::new(accounts, events.clone(), hasher),
            challenge: TwoFactorChallenge::new(events.clone(), mailer),
            issuer: TokenIssuer::new(events, codec),
        }
    }

    /// Execute the login use case
    ///
    /// # Arguments
    /// * `identifier` - Username or email address
    /// * `password` - Submitted plaintext password
    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        identifier: &str,
        password: Password,
    ) -> Result<LoginOutcome, LoginError> {
        let account = self.verifier.verify(identifier, &password).await?;

        self.lockout.reset_on_success(account.id).await?;

        if self.challenge.is_enabled(account.id).await? {
            let warning = self.challenge.issue_code(&account).await?;
            Ok(LoginOutcome::ChallengeIssued {
                account_id: account.id,
                warning,
            })
        } else {
            let tokens = self.issuer.issue_pair(&account).await?;
            Ok(LoginOutcome::TokensIssued {
                account: AccountSummary::from(&account),
                tokens,
            })
        }
    }
}
