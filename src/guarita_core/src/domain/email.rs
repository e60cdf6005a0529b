use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::InputError;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
        .expect("email regex must compile")
});

/// A syntactically validated email address.
///
/// Lowercased on construction so that lookups and uniqueness checks do not
/// depend on the casing the client happened to send.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InputError> {
        let candidate = raw.as_ref().trim().to_ascii_lowercase();
        if EMAIL_REGEX.is_match(&candidate) {
            Ok(Self(candidate))
        } else {
            Err(InputError::InvalidEmail)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        let email = Email::parse("Billing@Example.com.br").unwrap();
        assert_eq!(email.as_str(), "billing@example.com.br");
    }

    #[test]
    fn rejects_missing_at_sign() {
        assert_eq!(Email::parse("not-an-email"), Err(InputError::InvalidEmail));
    }

    #[test]
    fn rejects_missing_domain() {
        assert_eq!(Email::parse("someone@"), Err(InputError::InvalidEmail));
        assert_eq!(Email::parse("someone@host"), Err(InputError::InvalidEmail));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let email = Email::parse("  ana@empresa.com ").unwrap();
        assert_eq!(email.as_str(), "ana@empresa.com");
    }
}
