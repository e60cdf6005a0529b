use rand::Rng;

use super::InputError;

/// A 6-digit one-time code for the email second factor.
///
/// Codes live for five minutes and are spent at most once; both properties
/// are enforced by the event log, not by this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Generate a uniformly random code. Zero-padded so "004217" is as
    /// likely as any other value.
    pub fn generate() -> Self {
        let value: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InputError> {
        let candidate = raw.as_ref().trim();
        if candidate.len() == 6 && candidate.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(InputError::MalformedCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn parse_rejects_wrong_lengths() {
        assert!(OneTimeCode::parse("12345").is_err());
        assert!(OneTimeCode::parse("1234567").is_err());
        assert!(OneTimeCode::parse("").is_err());
    }

    #[test]
    fn parse_rejects_non_digits() {
        assert!(OneTimeCode::parse("12a456").is_err());
        assert!(OneTimeCode::parse("12 456").is_err());
    }

    #[test]
    fn parse_accepts_leading_zeroes() {
        assert_eq!(OneTimeCode::parse("004217").unwrap().as_str(), "004217");
    }

    #[quickcheck]
    fn generated_codes_are_always_six_digits(_seed: u64) -> bool {
        let code = OneTimeCode::generate();
        code.as_str().len() == 6 && code.as_str().chars().all(|c| c.is_ascii_digit())
    }
}
