use rand::Rng;

use super::InputError;

/// Opaque single-use token authorizing a password change.
///
/// 128 random bits rendered as lowercase hex. The token doubles as the
/// event-log subject id for its reset ticket, so its lifecycle can be
/// reconstructed from `ResetTicketIssued` / `ResetTicketRedeemed` records
/// alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken(String);

impl ResetToken {
    pub fn generate() -> Self {
        let value: u128 = rand::rng().random();
        Self(format!("{value:032x}"))
    }

    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InputError> {
        let candidate = raw.as_ref().trim();
        if candidate.len() == 32 && candidate.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(candidate.to_ascii_lowercase()))
        } else {
            Err(InputError::MalformedTicket)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
