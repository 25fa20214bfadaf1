//! Encryption at rest for wallet secrets
//!
//! Only secret seeds are sealed. Public addresses stay readable as the key
//! store's lookup keys so an encrypted store can still be listed.

pub mod cipher;

pub use cipher::{Aes256GcmCipher, EncryptionResult, SecureKey};

use crate::error::{FactomError, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

pub const SALT_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Argon2id, 64 MiB, 3 passes, one lane, 32-byte output
pub fn derive_key_from_password(password: &str, salt: &[u8]) -> Result<SecureKey> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(FactomError::Encryption(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    let params = Params::new(65536, 3, 1, Some(cipher::KEY_LENGTH))
        .map_err(|e| FactomError::Encryption(format!("Invalid Argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = vec![0u8; cipher::KEY_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| FactomError::Encryption(format!("Key derivation failed: {e}")))?;

    Ok(SecureKey::new(key))
}
