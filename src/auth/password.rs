// Password hashing and verification

use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt
///
/// Stored format: `hex(salt)$hex(sha256(salt || password))`. The salt makes
/// equal passwords hash differently across accounts.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

fn digest_with_salt(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Plaintext password wrapper with memory protection
///
/// Uses `secrecy::Secret` to prevent accidental logging of the supplied
/// password while it travels through the login flow.
pub struct Password(Secret<String>);

impl Password {
    /// Create a new Password from a string
    pub fn new(password: &str) -> Self {
        Self(Secret::new(password.to_string()))
    }

    /// Verify this password against a stored salted hash
    ///
    /// Comparison is constant-time. Any malformed stored value (missing
    /// separator, bad hex) verifies false rather than erroring, which keeps
    /// the login failure path uniform.
    pub fn verify(&self, stored: &str) -> bool {
        let (salt_hex, hash_hex) = match stored.split_once('$') {
            Some(parts) => parts,
            None => return false,
        };
        let salt = match hex::decode(salt_hex) {
            Ok(salt) => salt,
            Err(_) => return false,
        };
        let expected = match hex::decode(hash_hex) {
            Ok(expected) => expected,
            Err(_) => return false,
        };

        let computed = digest_with_salt(&salt, self.0.expose_secret());
        computed.as_slice().ct_eq(expected.as_slice()).into()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("value", &"<REDACTED>")
            .finish()
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<REDACTED>")
    }
}
