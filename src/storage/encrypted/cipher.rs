use crate::error::{FactomError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

pub const KEY_LENGTH: usize = 32;
/// AES-GCM uses 96-bit nonces
pub const NONCE_LENGTH: usize = 12;

/// Ciphertext plus the nonce it was sealed under
#[derive(Debug, Clone, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct EncryptionResult {
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// Key bytes that are zeroed when dropped
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureKey {
    key: Vec<u8>,
}

impl SecureKey {
    pub fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl std::fmt::Debug for SecureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureKey")
            .field("length", &self.key.len())
            .finish()
    }
}

/// AES-256-GCM over key-store records
pub struct Aes256GcmCipher {
    cipher: Aes256Gcm,
}

impl Aes256GcmCipher {
    pub fn new(key: &SecureKey) -> Result<Self> {
        if key.len() != KEY_LENGTH {
            return Err(FactomError::Encryption(format!(
                "AES-256-GCM requires a {KEY_LENGTH}-byte key"
            )));
        }
        let aes_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Ok(Self {
            cipher: Aes256Gcm::new(aes_key),
        })
    }

    /// Seal under a fresh random nonce
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptionResult> {
        let mut nonce_bytes = vec![0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| FactomError::Encryption(format!("AES-256-GCM encryption failed: {e}")))?;

        Ok(EncryptionResult {
            ciphertext,
            nonce: nonce_bytes,
        })
    }

    pub fn decrypt(&self, sealed: &EncryptionResult) -> Result<Vec<u8>> {
        if sealed.nonce.len() != NONCE_LENGTH {
            return Err(FactomError::Encryption(format!(
                "AES-256-GCM requires a {NONCE_LENGTH}-byte nonce"
            )));
        }
        self.cipher
            .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
            .map_err(|e| FactomError::Encryption(format!("AES-256-GCM decryption failed: {e}")))
    }
}
