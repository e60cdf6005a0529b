use guarita_core::{
    Account, AccountStore, AccountStoreError, CredentialHasher, EventStore, EventStoreError,
    Password,
};

use crate::lockout::{LockoutError, LockoutGuard};

/// Error types for credential verification
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Covers unknown identifier, wrong password and inactive account alike;
    /// the boundary must not be able to tell them apart.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is temporarily locked")]
    AccountLocked,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),
}

impl From<LockoutError> for CredentialError {
    fn from(error: LockoutError) -> Self {
        match error {
            LockoutError::AccountLocked => CredentialError::AccountLocked,
            LockoutError::AccountStoreError(e) => CredentialError::AccountStoreError(e),
            LockoutError::EventStoreError(e) => CredentialError::EventStoreError(e),
        }
    }
}

/// Password comparison with lockout wiring.
///
/// The lockout check sits between account resolution and the hash
/// comparison: a locked account is refused before the password is even
/// looked at, which also guarantees that failures during an active lock
/// never reach the counter and cannot extend the window.
#[derive(Clone)]
pub struct CredentialVerifier<A, S, H>
where
    A: AccountStore,
    S: EventStore,
    H: CredentialHasher,
{
    accounts: A,
    hasher: H,
    lockout: LockoutGuard<A, S>,
}

impl<A, S, H> CredentialVerifier<A, S, H>
where
    A: AccountStore + Clone,
    S: EventStore,
    H: CredentialHasher,
{
    pub fn new(accounts: A, events: S, hasher: H) -> Self {
        Self {
            lockout: LockoutGuard::new(accounts.clone(), events),
            accounts,
            hasher,
        }
    }

    /// Resolve the identifier and compare the password.
    ///
    /// An unknown identifier still pays for a full hash comparison against a
    /// throwaway hash, so response timing does not reveal which accounts
    /// exist.
    #[tracing::instrument(name = "CredentialVerifier::verify", skip(self, password))]
    pub async fn verify(
        &self,
        identifier: &str,
        password: &Password,
    ) -> Result<Account, CredentialError> {
        let account = match self.accounts.find_by_username_or_email(identifier).await {
            Ok(account) => account,
            Err(AccountStoreError::AccountNotFound) => {
                self.hasher.verify_dummy(password).await;
                return Err(CredentialError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        self.lockout.check_not_locked(account.id).await?;

        if !self.hasher.verify(password, &account.credential_hash).await {
            self.lockout.record_failure(account.id).await?;
            return Err(CredentialError::InvalidCredentials);
        }

        if !account.is_active() {
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(account)
    }
}
