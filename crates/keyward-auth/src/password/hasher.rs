//! Argon2id password hashing at the persistence boundary.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use keyward_core::config::PasswordHashConfig;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;

/// PHC prefix shared by every Argon2 variant.
const ARGON2_PREFIX: &str = "$argon2";

/// Hashes passwords with Argon2id using fixed, configured cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher; fails with `Configuration` on out-of-range parameters.
    pub fn new(config: &PasswordHashConfig) -> AppResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes `value` unless it already is an Argon2 PHC string.
    ///
    /// Safe to apply on every write path; an existing hash passes through.
    pub fn hash_for_storage(&self, value: &str) -> AppResult<String> {
        if Self::is_hashed(value) {
            return Ok(value.to_string());
        }
        self.hash(value)
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies `candidate` against a stored hash.
    ///
    /// Malformed hashes never match.
    pub fn verify(&self, candidate: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        self.argon2()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }

    /// Returns `true` if `value` is an Argon2 PHC string.
    pub fn is_hashed(value: &str) -> bool {
        value.starts_with(ARGON2_PREFIX) && PasswordHash::new(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash_for_storage("Secr3t!pass").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Secr3t!pass", &hash));
        assert!(!hasher.verify("secr3t!pass", &hash));
    }

    #[test]
    fn test_hash_for_storage_is_idempotent() {
        let hasher = hasher();
        let once = hasher.hash_for_storage("hunter2").unwrap();
        let twice = hasher.hash_for_storage(&once).unwrap();

        assert_eq!(once, twice);
        assert!(hasher.verify("hunter2", &twice));
    }

    #[test]
    fn test_fresh_salt_per_call() {
        let hasher = hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let hasher = hasher();
        assert!(!hasher.verify("anything", "plain-text-password"));
        assert!(!hasher.verify("anything", "$argon2id$!!!"));
        assert!(!PasswordHasher::is_hashed("$argon2id$!!!"));
        assert!(!PasswordHasher::is_hashed("password"));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let err = PasswordHasher::new(&PasswordHashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert_eq!(err.kind, keyward_core::ErrorKind::Configuration);
    }
}
