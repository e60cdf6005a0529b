use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::Serialize;
use uuid::Uuid;

use super::email::Email;

/// The authenticated principal.
///
/// Accounts are the one place with true mutable state: the failed-attempt
/// counter, the credential hash and `last_login_at`. Everything else about a
/// login's history lives in the append-only event log. Accounts are never
/// hard-deleted; deactivation flips `status` to `Inactive`.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: Email,
    pub credential_hash: Secret<String>,
    pub failed_attempt_count: i32,
    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Tenant the account belongs to; carried into access-token claims.
    pub company_id: Uuid,
    pub role: String,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(AccountStatus::Active),
            "inactive" => Some(AccountStatus::Inactive),
            _ => None,
        }
    }
}

/// The non-sensitive slice of an account returned alongside a token pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub username: String,
    pub email: Email,
    pub company_id: Uuid,
    pub role: String,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            company_id: account.company_id,
            role: account.role.clone(),
            last_login_at: account.last_login_at,
        }
    }
}
