use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Payload key used by consuming records (`CodeConsumed`,
/// `ResetTicketRedeemed`) to reference the issuance they spend.
pub const ISSUANCE_ID_KEY: &str = "issuance_id";

/// Logical category of the thing an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectType {
    Account,
    Session,
    TwoFactorCode,
    ResetTicket,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Account => "account",
            SubjectType::Session => "session",
            SubjectType::TwoFactorCode => "two_factor_code",
            SubjectType::ResetTicket => "reset_ticket",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "account" => Some(SubjectType::Account),
            "session" => Some(SubjectType::Session),
            "two_factor_code" => Some(SubjectType::TwoFactorCode),
            "reset_ticket" => Some(SubjectType::ResetTicket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    LoginFailed,
    AccountLocked,
    LoginSucceeded,
    TokenIssued,
    SessionEnded,
    CodeIssued,
    CodeConsumed,
    ResetTicketIssued,
    ResetTicketRedeemed,
    TwoFactorEnabled,
    TwoFactorDisabled,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::LoginFailed => "login_failed",
            ActionKind::AccountLocked => "account_locked",
            ActionKind::LoginSucceeded => "login_succeeded",
            ActionKind::TokenIssued => "token_issued",
            ActionKind::SessionEnded => "session_ended",
            ActionKind::CodeIssued => "code_issued",
            ActionKind::CodeConsumed => "code_consumed",
            ActionKind::ResetTicketIssued => "reset_ticket_issued",
            ActionKind::ResetTicketRedeemed => "reset_ticket_redeemed",
            ActionKind::TwoFactorEnabled => "two_factor_enabled",
            ActionKind::TwoFactorDisabled => "two_factor_disabled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "login_failed" => Some(ActionKind::LoginFailed),
            "account_locked" => Some(ActionKind::AccountLocked),
            "login_succeeded" => Some(ActionKind::LoginSucceeded),
            "token_issued" => Some(ActionKind::TokenIssued),
            "session_ended" => Some(ActionKind::SessionEnded),
            "code_issued" => Some(ActionKind::CodeIssued),
            "code_consumed" => Some(ActionKind::CodeConsumed),
            "reset_ticket_issued" => Some(ActionKind::ResetTicketIssued),
            "reset_ticket_redeemed" => Some(ActionKind::ResetTicketRedeemed),
            "two_factor_enabled" => Some(ActionKind::TwoFactorEnabled),
            "two_factor_disabled" => Some(ActionKind::TwoFactorDisabled),
            _ => None,
        }
    }
}

/// One row of the append-only security log.
///
/// Records are immutable once written: no updates, no deletes. Anything
/// derived from them (lockout state, code validity, ticket redemption) is a
/// query over the newest matching records.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub id: i64,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub actor_account_id: Option<Uuid>,
    pub action_kind: ActionKind,
    pub prior_state: Option<Value>,
    pub new_state: Option<Value>,
    pub recorded_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl EventRecord {
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.new_state.as_ref()?.get(key)?.as_str()
    }

    pub fn payload_i64(&self, key: &str) -> Option<i64> {
        self.new_state.as_ref()?.get(key)?.as_i64()
    }

    /// `expires_at` carried by issuance payloads, if present.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let value = self.new_state.as_ref()?.get("expires_at")?.clone();
        serde_json::from_value(value).ok()
    }

    /// The issuance a consuming record spends, if any.
    pub fn references_issuance(&self) -> Option<i64> {
        self.payload_i64(ISSUANCE_ID_KEY)
    }
}

/// An event about to be appended. The caller supplies `recorded_at`; stores
/// persist it untouched so the log reflects the moment the transition was
/// decided, not when the row landed.
#[derive(Debug, Clone)]
pub struct NewEventRecord {
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub actor_account_id: Option<Uuid>,
    pub action_kind: ActionKind,
    pub prior_state: Option<Value>,
    pub new_state: Option<Value>,
    pub recorded_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl NewEventRecord {
    pub fn new(
        subject_type: SubjectType,
        subject_id: impl Into<String>,
        action_kind: ActionKind,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_type,
            subject_id: subject_id.into(),
            actor_account_id: None,
            action_kind,
            prior_state: None,
            new_state: None,
            recorded_at,
            note: None,
        }
    }

    pub fn actor(mut self, account_id: Uuid) -> Self {
        self.actor_account_id = Some(account_id);
        self
    }

    pub fn prior_state(mut self, state: Value) -> Self {
        self.prior_state = Some(state);
        self
    }

    pub fn new_state(mut self, state: Value) -> Self {
        self.new_state = Some(state);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Materialize the record as persisted, with its assigned id.
    pub fn into_record(self, id: i64) -> EventRecord {
        EventRecord {
            id,
            subject_type: self.subject_type,
            subject_id: self.subject_id,
            actor_account_id: self.actor_account_id,
            action_kind: self.action_kind,
            prior_state: self.prior_state,
            new_state: self.new_state,
            recorded_at: self.recorded_at,
            note: self.note,
        }
    }
}
