use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use tokio::sync::RwLock;
use uuid::Uuid;

use guarita_core::{Account, AccountStore, AccountStoreError, Email};

/// HashMap-backed account store for tests and local development.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, account: Account) {
        self.accounts.write().await.insert(account.id, account);
    }

    pub async fn get(&self, id: Uuid) -> Option<Account> {
        self.accounts.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Account, AccountStoreError> {
        let accounts = self.accounts.read().await;
        // Username match takes precedence over an email match.
        if let Some(account) = accounts.values().find(|a| a.username == identifier) {
            return Ok(account.clone());
        }
        accounts
            .values()
            .find(|a| a.email.as_str() == identifier.to_lowercase())
            .cloned()
            .ok_or(AccountStoreError::AccountNotFound)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Account, AccountStoreError> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| a.email == *email)
            .cloned()
            .ok_or(AccountStoreError::AccountNotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Account, AccountStoreError> {
        self.get(id).await.ok_or(AccountStoreError::AccountNotFound)
    }

    async fn update_credential(
        &self,
        id: Uuid,
        new_hash: Secret<String>,
    ) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or(AccountStoreError::AccountNotFound)?;
        account.credential_hash = new_hash;
        Ok(())
    }

    async fn increment_failure_counter(&self, id: Uuid) -> Result<i32, AccountStoreError> {
        // The write lock makes the read-modify-write atomic here; the
        // Postgres store uses a single UPDATE for the same guarantee.
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or(AccountStoreError::AccountNotFound)?;
        account.failed_attempt_count += 1;
        Ok(account.failed_attempt_count)
    }

    async fn reset_failure_counter(&self, id: Uuid) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or(AccountStoreError::AccountNotFound)?;
        account.failed_attempt_count = 0;
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or(AccountStoreError::AccountNotFound)?;
        account.last_login_at = Some(at);
        Ok(())
    }
}
