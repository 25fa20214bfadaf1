use ring::digest::{digest, SHA256, SHA512};
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{Ed25519KeyPair, KeyPair, UnparsedPublicKey, ED25519};

use crate::error::{FactomError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

pub const HASH_LENGTH: usize = 32;
pub const SEED_LENGTH: usize = 32;
pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const SIGNATURE_LENGTH: usize = 64;
/// Wire timestamps keep the low 6 bytes of the millisecond clock
pub const TIMESTAMP_LENGTH: usize = 6;

pub fn current_timestamp_millis() -> Result<u64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| FactomError::Crypto(format!("System time error: {e}")))?
        .as_millis();

    u64::try_from(duration).map_err(|_| FactomError::Crypto("Timestamp overflow".to_string()))
}

/// Big-endian milliseconds, truncated to the low 6 bytes
pub fn milli_timestamp_bytes(millis: u64) -> [u8; TIMESTAMP_LENGTH] {
    let full = millis.to_be_bytes();
    let mut out = [0u8; TIMESTAMP_LENGTH];
    out.copy_from_slice(&full[2..]);
    out
}

pub fn sha256_digest(data: &[u8]) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

pub fn sha512_digest(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(digest(&SHA512, data).as_ref());
    out
}

/// sha256(sha256(data)), the ledger's double hash
pub fn sha256d(data: &[u8]) -> [u8; HASH_LENGTH] {
    sha256_digest(&sha256_digest(data))
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| FactomError::InvalidAddress(format!("Invalid base58 encoding: {e}")))
}

/// Fresh ed25519 seed from the system entropy source
pub fn new_seed() -> Result<[u8; SEED_LENGTH]> {
    let rng = SystemRandom::new();
    let mut seed = [0u8; SEED_LENGTH];
    rng.fill(&mut seed)
        .map_err(|e| FactomError::Crypto(format!("Failed to gather key entropy: {e}")))?;
    Ok(seed)
}

fn key_pair_from_seed(seed: &[u8]) -> Result<Ed25519KeyPair> {
    Ed25519KeyPair::from_seed_unchecked(seed)
        .map_err(|e| FactomError::InvalidKey(format!("Rejected ed25519 seed: {e}")))
}

pub fn ed25519_public_key(seed: &[u8]) -> Result<[u8; PUBLIC_KEY_LENGTH]> {
    let key_pair = key_pair_from_seed(seed)?;
    let mut public = [0u8; PUBLIC_KEY_LENGTH];
    public.copy_from_slice(key_pair.public_key().as_ref());
    Ok(public)
}

/// Plain ed25519 over the raw message bytes
pub fn ed25519_sign(seed: &[u8], message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
    let key_pair = key_pair_from_seed(seed)?;
    let signature = key_pair.sign(message);
    let mut out = [0u8; SIGNATURE_LENGTH];
    out.copy_from_slice(signature.as_ref());
    Ok(out)
}

pub fn ed25519_verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let peer_public_key = UnparsedPublicKey::new(&ED25519, public_key);
    peer_public_key.verify(message, signature).is_ok()
}
