use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::HashCost;
use crate::error::{Error, Result};

/// Hashes and verifies account credentials with Argon2id.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Verified against when a username is unknown, so that path costs the
    /// same as a wrong password.
    dummy_hash: String,
}

impl CredentialHasher {
    pub fn new(cost: &HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| Error::Config(format!("invalid argon2 params: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"varvault-dummy-credential", &salt)
            .map_err(|e| Error::Config(format!("failed to hash credential: {e}")))?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    /// Hashes a plaintext credential into a PHC string with a fresh salt.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Internal(format!("failed to hash credential: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext credential against a stored hash.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::Internal(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Internal(format!("failed to verify credential: {e}"))),
        }
    }

    /// Burns one verification for a username that does not exist.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }
}
