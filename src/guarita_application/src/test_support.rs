//! Shared in-memory mocks for the unit tests in this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;
use uuid::Uuid;

use guarita_core::{
    AccessClaims, Account, AccountStatus, AccountStore, AccountStoreError, ActionKind,
    ConsumeOutcome, CredentialHashError, CredentialHasher, DispatchFailure, Email,
    EmailDispatcher, EventRecord, EventStore, EventStoreError, NewEventRecord, Password,
    RefreshClaims, SubjectType, TokenCodec, TokenError, REFRESH_TOKEN_TYPE,
};

/// Build an account whose hash matches [`MockHasher`]'s scheme.
pub fn seeded_account(username: &str, email: &str, password: &str) -> Account {
    Account {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: Email::parse(email).unwrap(),
        credential_hash: Secret::from(format!("plain${password}")),
        failed_attempt_count: 0,
        status: AccountStatus::Active,
        last_login_at: None,
        company_id: Uuid::new_v4(),
        role: "operator".to_string(),
    }
}

pub fn password(raw: &str) -> Password {
    Password::try_from(Secret::from(raw.to_string())).unwrap()
}

#[derive(Clone, Default)]
pub struct MockAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl MockAccountStore {
    pub async fn insert(&self, account: Account) {
        self.accounts.write().await.insert(account.id, account);
    }

    pub async fn get(&self, id: Uuid) -> Option<Account> {
        self.accounts.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl AccountStore for MockAccountStore {
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Account, AccountStoreError> {
        let accounts = self.accounts.read().await;
        if let Some(account) = accounts.values().find(|a| a.username == identifier) {
            return Ok(account.clone());
        }
        accounts
            .values()
            .find(|a| a.email.as_str() == identifier)
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
        let account = accounts.get_mut(&id).ok_or(AccountStoreError::AccountNotFound)?;
        account.credential_hash = new_hash;
        Ok(())
    }

    async fn increment_failure_counter(&self, id: Uuid) -> Result<i32, AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(AccountStoreError::AccountNotFound)?;
        account.failed_attempt_count += 1;
        Ok(account.failed_attempt_count)
    }

    async fn reset_failure_counter(&self, id: Uuid) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(AccountStoreError::AccountNotFound)?;
        account.failed_attempt_count = 0;
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(AccountStoreError::AccountNotFound)?;
        account.last_login_at = Some(at);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockEventStore {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl MockEventStore {
    pub async fn all(&self) -> Vec<EventRecord> {
        self.records.read().await.clone()
    }

    pub async fn records_of_kind(&self, kind: ActionKind) -> Vec<EventRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.action_kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn append(&self, record: NewEventRecord) -> Result<EventRecord, EventStoreError> {
        let mut records = self.records.write().await;
        let stored = record.into_record(records.len() as i64 + 1);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn append_all(&self, batch: Vec<NewEventRecord>) -> Result<(), EventStoreError> {
        let mut records = self.records.write().await;
        for record in batch {
            let stored = record.into_record(records.len() as i64 + 1);
            records.push(stored);
        }
        Ok(())
    }

    async fn latest(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kinds: &[ActionKind],
    ) -> Result<Option<EventRecord>, EventStoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| {
                r.subject_type == subject_type
                    && r.subject_id == subject_id
                    && kinds.contains(&r.action_kind)
            })
            .max_by_key(|r| (r.recorded_at, r.id))
            .cloned())
    }

    async fn recent(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
        kind: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, EventStoreError> {
        let mut matching: Vec<EventRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| {
                r.subject_type == subject_type
                    && r.subject_id == subject_id
                    && r.action_kind == kind
                    && r.recorded_at >= since
            })
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse((r.recorded_at, r.id)));
        Ok(matching)
    }

    async fn consume(
        &self,
        issuance_id: i64,
        batch: Vec<NewEventRecord>,
    ) -> Result<ConsumeOutcome, EventStoreError> {
        let consuming_kind = batch
            .first()
            .ok_or_else(|| EventStoreError::DatabaseError("empty consume batch".into()))?
            .action_kind;

        let mut records = self.records.write().await;
        let already_spent = records.iter().any(|r| {
            r.action_kind == consuming_kind && r.references_issuance() == Some(issuance_id)
        });
        if already_spent {
            return Ok(ConsumeOutcome::AlreadyConsumed);
        }
        for record in batch {
            let stored = record.into_record(records.len() as i64 + 1);
            records.push(stored);
        }
        Ok(ConsumeOutcome::Consumed)
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: Email,
    pub subject: String,
    pub html_body: String,
}

#[derive(Clone, Default)]
pub struct MockEmailDispatcher {
    sent: Arc<RwLock<Vec<SentEmail>>>,
    fail: bool,
}

impl MockEmailDispatcher {
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl EmailDispatcher for MockEmailDispatcher {
    async fn send(
        &self,
        recipient: &Email,
        subject: &str,
        html_body: &str,
    ) -> Result<(), DispatchFailure> {
        if self.fail {
            return Err(DispatchFailure("provider unreachable".to_string()));
        }
        self.sent.write().await.push(SentEmail {
            recipient: recipient.clone(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Plaintext "hashing" so unit tests stay fast; the Argon2 adapter has its
/// own tests.
#[derive(Clone, Default)]
pub struct MockHasher {
    dummy_comparisons: Arc<AtomicUsize>,
}

impl MockHasher {
    pub fn dummy_comparisons(&self) -> usize {
        self.dummy_comparisons.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialHasher for MockHasher {
    async fn hash(&self, password: &Password) -> Result<Secret<String>, CredentialHashError> {
        Ok(Secret::from(format!("plain${}", password.expose())))
    }

    async fn verify(&self, candidate: &Password, expected_hash: &Secret<String>) -> bool {
        expected_hash.expose_secret() == &format!("plain${}", candidate.expose())
    }

    async fn verify_dummy(&self, _candidate: &Password) {
        self.dummy_comparisons.fetch_add(1, Ordering::SeqCst);
    }
}

/// Codec that serializes claims as plain JSON. Signature checks are out of
/// scope here; expiry is still honored so time-based tests behave.
#[derive(Clone, Copy, Default)]
pub struct MockCodec;

impl TokenCodec for MockCodec {
    fn encode_access(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        serde_json::to_string(claims).map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenError> {
        serde_json::to_string(claims).map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims = self.decode_access_ignoring_expiry(token)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::ExpiredToken);
        }
        Ok(claims)
    }

    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims =
            serde_json::from_str(token).map_err(|_| TokenError::InvalidToken)?;
        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(TokenError::InvalidToken);
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::ExpiredToken);
        }
        Ok(claims)
    }

    fn decode_access_ignoring_expiry(&self, token: &str) -> Result<AccessClaims, TokenError> {
        serde_json::from_str(token).map_err(|_| TokenError::InvalidToken)
    }
}
