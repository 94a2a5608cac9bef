//! Argon2 implementation of the password-hashing port.
//!
//! Hashes are emitted in PHC string format with a fresh OS-random salt per
//! password, so equal passwords never produce equal hashes. Verification
//! reads the parameters back out of the stored string.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher with the crate's default parameters.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| PasswordHashError::verify(err.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::verify(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for hashing and verification.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn hash_then_verify_round_trips() {
        let hasher = Argon2PasswordHasher::new();

        let hash = hasher.hash("correct horse battery staple").expect("hashing succeeds");

        assert!(hash.starts_with("$argon2id$"));
        assert!(
            hasher
                .verify("correct horse battery staple", &hash)
                .expect("verification runs")
        );
    }

    #[rstest]
    fn wrong_password_verifies_false_not_error() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("secret").expect("hashing succeeds");

        assert!(!hasher.verify("not secret", &hash).expect("verification runs"));
    }

    #[rstest]
    fn equal_passwords_produce_distinct_hashes() {
        let hasher = Argon2PasswordHasher::new();

        let first = hasher.hash("secret").expect("hashing succeeds");
        let second = hasher.hash("secret").expect("hashing succeeds");

        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_stored_hash_surfaces_verify_error() {
        let hasher = Argon2PasswordHasher::new();

        let err = hasher
            .verify("secret", "not-a-phc-string")
            .expect_err("malformed hash must error");

        assert!(matches!(err, PasswordHashError::Verify { .. }));
    }
}
