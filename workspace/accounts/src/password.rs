use std::fmt::Debug;

use argon2::{
    Algorithm, Argon2, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString},
};
use rand::{TryRngCore, rngs::OsRng};

pub use argon2::Params;

use crate::error::{AccountError, Result};

/// Prefix marking a stored password that no raw password verifies against.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Password transformation applied before an account is persisted.
pub trait CredentialHasher: Send + Sync + Debug {
    /// Hash a raw password into a string suitable for storage.
    fn hash(&self, raw: &str) -> Result<String>;

    /// Check a raw password against a stored hash.
    fn verify(&self, raw: &str, hashed: &str) -> Result<bool>;
}

/// Argon2id hasher producing PHC strings with a random salt.
#[derive(Debug)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Build a hasher with the argon2 crate's recommended parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Build a hasher with caller-specified parameters (useful for tests or
    /// constrained environments).
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, raw: &str) -> Result<String> {
        let mut salt_bytes = [0u8; Salt::RECOMMENDED_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| AccountError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| AccountError::PasswordHash(err.to_string()))?;

        let hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|err| AccountError::PasswordHash(err.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, raw: &str, hashed: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(hashed).map_err(|err| AccountError::PasswordHash(err.to_string()))?;
        Ok(self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok())
    }
}

/// Generate a stored password value that can never match.
pub fn make_unusable_password() -> String {
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, uuid::Uuid::new_v4().simple())
}

/// Whether a stored password value came from a real password.
pub fn is_password_usable(stored: &str) -> bool {
    !stored.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    // Minimum cost parameters keep the test suite fast
    let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
        .expect("valid argon2 params");
    Argon2Hasher::with_params(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_passwords_and_verifies() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn salts_every_hash() {
        let hasher = test_hasher();
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn unusable_passwords_are_detected() {
        let unusable = make_unusable_password();
        assert!(!is_password_usable(&unusable));
        assert_ne!(unusable, make_unusable_password());

        let hash = test_hasher().hash("pw").unwrap();
        assert!(is_password_usable(&hash));
    }

    #[test]
    fn verify_rejects_malformed_hashes() {
        let result = test_hasher().verify("pw", "not-a-phc-string");
        assert!(matches!(result, Err(AccountError::PasswordHash(_))));
    }
}
