use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use guarita_core::{Account, AccountStatus, AccountStore, AccountStoreError, Email};

#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresAccountStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    credential_hash: String,
    failed_attempt_count: i32,
    status: String,
    last_login_at: Option<DateTime<Utc>>,
    company_id: Uuid,
    role: String,
}

impl AccountRow {
    fn into_account(self) -> Result<Account, AccountStoreError> {
        let email = Email::parse(&self.email)
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        let status = AccountStatus::parse(&self.status).ok_or_else(|| {
            AccountStoreError::UnexpectedError(format!("unknown account status: {}", self.status))
        })?;

        Ok(Account {
            id: self.id,
            username: self.username,
            email,
            credential_hash: Secret::from(self.credential_hash),
            failed_attempt_count: self.failed_attempt_count,
            status,
            last_login_at: self.last_login_at,
            company_id: self.company_id,
            role: self.role,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, username, email, credential_hash, \
     failed_attempt_count, status, last_login_at, company_id, role FROM accounts";

fn unexpected(e: sqlx::Error) -> AccountStoreError {
    AccountStoreError::UnexpectedError(e.to_string())
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[tracing::instrument(name = "Resolving login identifier in PostgreSQL", skip_all)]
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Account, AccountStoreError> {
        // Username first; only fall through to email when no username matched.
        let by_username: Option<AccountRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE username = $1"))
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;

        if let Some(row) = by_username {
            return row.into_account();
        }

        let by_email: Option<AccountRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE email = lower($1)"))
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;

        by_email
            .ok_or(AccountStoreError::AccountNotFound)?
            .into_account()
    }

    #[tracing::instrument(name = "Retrieving account by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<Account, AccountStoreError> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;

        row.ok_or(AccountStoreError::AccountNotFound)?.into_account()
    }

    #[tracing::instrument(name = "Retrieving account by id from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: Uuid) -> Result<Account, AccountStoreError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        row.ok_or(AccountStoreError::AccountNotFound)?.into_account()
    }

    #[tracing::instrument(name = "Updating credential hash in PostgreSQL", skip_all)]
    async fn update_credential(
        &self,
        id: Uuid,
        new_hash: Secret<String>,
    ) -> Result<(), AccountStoreError> {
        let result = sqlx::query("UPDATE accounts SET credential_hash = $1 WHERE id = $2")
            .bind(new_hash.expose_secret())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(AccountStoreError::AccountNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Incrementing failure counter in PostgreSQL", skip_all)]
    async fn increment_failure_counter(&self, id: Uuid) -> Result<i32, AccountStoreError> {
        // Single statement so concurrent failures cannot under-count.
        let count: Option<i32> = sqlx::query_scalar(
            "UPDATE accounts \
             SET failed_attempt_count = failed_attempt_count + 1 \
             WHERE id = $1 \
             RETURNING failed_attempt_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        count.ok_or(AccountStoreError::AccountNotFound)
    }

    #[tracing::instrument(name = "Resetting failure counter in PostgreSQL", skip_all)]
    async fn reset_failure_counter(&self, id: Uuid) -> Result<(), AccountStoreError> {
        let result = sqlx::query("UPDATE accounts SET failed_attempt_count = 0 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(AccountStoreError::AccountNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Recording login time in PostgreSQL", skip_all)]
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AccountStoreError> {
        let result = sqlx::query("UPDATE accounts SET last_login_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(AccountStoreError::AccountNotFound);
        }
        Ok(())
    }
}
