//! Password value object - bcrypt hashing for staff accounts.
//!
//! Hashes stay in the `$2a$`/`$2b$` format already stored in `usuarios`.

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a new plain-text password with the given bcrypt cost.
    ///
    /// # Errors
    /// Returns a validation error if the password is too short.
    pub fn new(plain_text: &str, cost: u32) -> AppResult<Self> {
        Self::check_length(plain_text)?;
        let hash = bcrypt::hash(plain_text, cost)?;
        Ok(Self { hash })
    }

    /// Validate a candidate password without hashing it.
    pub fn check_length(plain_text: &str) -> AppResult<()> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "La contraseña debe tener al menos {} caracteres",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    /// Wrap an existing hash read from the database.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// Malformed hashes never verify.
    pub fn verify(&self, plain_text: &str) -> bool {
        bcrypt::verify(plain_text, &self.hash).unwrap_or(false)
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_password_hash_and_verify() {
        let password = Password::new("cerveza123", TEST_COST).unwrap();

        assert!(password.verify("cerveza123"));
        assert!(!password.verify("cerveza124"));
    }

    #[test]
    fn test_password_from_hash() {
        let hash = Password::new("schop-lager", TEST_COST).unwrap().into_string();
        assert!(hash.starts_with("$2"));

        let restored = Password::from_hash(hash);
        assert!(restored.verify("schop-lager"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let first = Password::new("igual123", TEST_COST).unwrap();
        let second = Password::new("igual123", TEST_COST).unwrap();

        assert_ne!(first.as_str(), second.as_str());
        assert!(first.verify("igual123"));
        assert!(second.verify("igual123"));
    }

    #[test]
    fn test_password_too_short() {
        assert!(matches!(
            Password::new("corta", TEST_COST),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let password = Password::from_hash("not-a-bcrypt-hash".to_string());
        assert!(!password.verify("anything"));
    }
}
