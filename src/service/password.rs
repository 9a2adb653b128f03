use argon2::{
    password_hash::{PasswordHash, SaltString},
    Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version,
};
use rand::RngCore;

use super::ServiceError;

/// Argon2id hashing with configurable cost. Verification reads the cost back out of the
/// stored hash, so hashes made under older parameters keep verifying.
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
}

impl Passwords {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, argon2::Error> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|err| ServiceError::PasswordHash(err.to_string()))?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| ServiceError::PasswordHash(err.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Spends one full hash on `password` and always returns false. Used when there is no
    /// stored hash to check, so that path costs as much as a wrong password.
    pub fn reject(&self, password: &str) -> bool {
        let salt = SaltString::encode_b64(&[0u8; 16]);
        if let Ok(salt) = salt {
            let _ = self.argon2.hash_password(password.as_bytes(), &salt);
        }
        false
    }

    /// False for a mismatch and for a stored hash that does not parse.
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(err) => {
                tracing::warn!(error = %err, "stored password hash is malformed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Passwords {
        Passwords::new(64, 1).expect("argon2 params")
    }

    #[test]
    fn hash_is_not_the_plaintext_and_verifies() {
        let passwords = cheap();
        let hash = passwords.hash("correct-horse").expect("hash");
        assert_ne!(hash, "correct-horse");
        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify(&hash, "correct-horse"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let passwords = cheap();
        let hash = passwords.hash("correct-horse").expect("hash");
        assert!(!passwords.verify(&hash, "battery-staple"));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!cheap().verify("not-a-hash", "anything"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let passwords = cheap();
        let first = passwords.hash("correct-horse").expect("hash");
        let second = passwords.hash("correct-horse").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn reject_never_accepts() {
        let passwords = cheap();
        assert!(!passwords.reject("correct-horse"));
        assert!(!passwords.reject(""));
    }

    #[test]
    fn rejects_memory_cost_below_minimum() {
        assert!(Passwords::new(1, 1).is_err());
    }
}
