//! Password hashing primitive.
//!
//! The services only see the [`PasswordHasher`] trait. The default
//! [`Argon2Hasher`] stores Argon2id hashes in PHC string format, so the
//! cost parameters travel with every hash.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::error::CredentialError;

/// One-way salted hashing with constant-time verification.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Returns `Ok(false)` on mismatch, `Err` only when `hash` is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError>;
}

/// Argon2id with configurable memory and time cost.
#[derive(Clone, Debug)]
pub struct Argon2Hasher {
    params: Params,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Hasher {
    /// Hasher with a custom cost: memory in KiB and number of passes.
    /// Tests use the smallest accepted values.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| CredentialError::Hashing(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|_| CredentialError::MalformedHash)?;
        // Cost parameters come from the stored hash, not from `self`.
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(CredentialError::MalformedHash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_cost(8, 1).unwrap()
    }

    #[test]
    fn verifies_own_hash() {
        let hash = hasher().hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=8,t=1,p=1$"));
        assert!(hasher().verify("correct horse", &hash).unwrap());
        assert!(!hasher().verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let first = hasher().hash("password123").unwrap();
        let second = hasher().hash("password123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn cost_is_read_from_the_hash() {
        let hash = Argon2Hasher::with_cost(16, 2)
            .unwrap()
            .hash("password123")
            .unwrap();
        assert!(hasher().verify("password123", &hash).unwrap());
    }

    #[test]
    fn malformed_hashes_are_rejected() {
        for hash in ["", "plain", "sha256$1$00$00", "$argon2id$v=19$m=8"] {
            assert_eq!(
                hasher().verify("password123", hash),
                Err(CredentialError::MalformedHash),
                "{hash}"
            );
        }
    }

    #[test]
    fn invalid_cost_is_rejected() {
        assert!(matches!(
            Argon2Hasher::with_cost(1, 0),
            Err(CredentialError::Hashing(_))
        ));
    }
}
