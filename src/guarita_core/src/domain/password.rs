use secrecy::{ExposeSecret, Secret};

use super::InputError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// A candidate plaintext password, wrapped so it never appears in logs or
/// debug output.
#[derive(Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = InputError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(InputError::WeakPassword);
        }
        Ok(Self(value))
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(REDACTED)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_passwords() {
        let result = Password::try_from(Secret::from("curta".to_string()));
        assert!(matches!(result, Err(InputError::WeakPassword)));
    }

    #[test]
    fn accepts_passwords_of_minimum_length() {
        assert!(Password::try_from(Secret::from("Secret1!".to_string())).is_ok());
    }

    #[test]
    fn debug_output_is_redacted() {
        let password = Password::try_from(Secret::from("Secret1!".to_string())).unwrap();
        assert_eq!(format!("{password:?}"), "Password(REDACTED)");
    }
}
