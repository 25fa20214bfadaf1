//! Recovery phrases
//!
//! A wallet seed is 16 bytes of entropy shown to the user as a 12-word BIP39
//! phrase. Keys come from the phrase's BIP39 seed along the BIP44 path
//! `m/44'/<coin>'/0'/0/<index>`: coin 131 for Factoid keys, 132 for entry
//! credit keys. The 32-byte BIP32 private key is used directly as the ed25519
//! seed.

use crate::address::{EcKey, FactoidKey, SecretKey};
use crate::error::{FactomError, Result};
use crate::utils::SEED_LENGTH;
use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use zeroize::Zeroizing;

pub const FACTOID_COIN_TYPE: u32 = 131;
pub const EC_COIN_TYPE: u32 = 132;
pub const MNEMONIC_ENTROPY_LENGTH: usize = 16;
pub const MNEMONIC_WORD_COUNT: usize = 12;

fn parse(words: &str) -> Result<Mnemonic> {
    let normalized = words
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
    if normalized.len() != MNEMONIC_WORD_COUNT {
        return Err(FactomError::InvalidKey(format!(
            "Mnemonic has {} words, expected {MNEMONIC_WORD_COUNT}",
            normalized.len()
        )));
    }
    let phrase = Zeroizing::new(normalized.join(" "));
    Mnemonic::parse_in_normalized(Language::English, &phrase)
        .map_err(|e| FactomError::InvalidKey(format!("Invalid mnemonic: {e}")))
}

/// Words for a wallet seed's entropy
pub fn mnemonic_from_entropy(entropy: &[u8]) -> Result<Zeroizing<String>> {
    if entropy.len() != MNEMONIC_ENTROPY_LENGTH {
        return Err(FactomError::InvalidKey(format!(
            "Wallet seed has {} bytes, expected {MNEMONIC_ENTROPY_LENGTH}",
            entropy.len()
        )));
    }
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| FactomError::InvalidKey(format!("Invalid wallet seed: {e}")))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// BIP39 seed of `words` with an empty passphrase
pub fn seed_from_mnemonic(words: &str) -> Result<Zeroizing<[u8; 64]>> {
    Ok(Zeroizing::new(parse(words)?.to_seed_normalized("")))
}

/// Key number `index` of one coin type
pub fn derive_secret(seed: &[u8], coin_type: u32, index: u32) -> Result<SecretKey> {
    let path: DerivationPath = format!("m/44'/{coin_type}'/0'/0/{index}")
        .parse()
        .map_err(|e| FactomError::InvalidKey(format!("Bad derivation path: {e}")))?;
    let xprv = XPrv::derive_from_path(seed, &path)
        .map_err(|e| FactomError::InvalidKey(format!("Key derivation failed: {e}")))?;
    let bytes: Zeroizing<[u8; SEED_LENGTH]> = Zeroizing::new(xprv.to_bytes());
    Ok(SecretKey::from_seed(*bytes))
}

pub fn factoid_key_from_seed(seed: &[u8], index: u32) -> Result<FactoidKey> {
    FactoidKey::from_secret(derive_secret(seed, FACTOID_COIN_TYPE, index)?)
}

pub fn ec_key_from_seed(seed: &[u8], index: u32) -> Result<EcKey> {
    EcKey::from_secret(derive_secret(seed, EC_COIN_TYPE, index)?)
}

/// The first Factoid key of a recovery phrase
pub fn factoid_key_from_mnemonic(words: &str) -> Result<FactoidKey> {
    factoid_key_from_seed(seed_from_mnemonic(words)?.as_slice(), 0)
}
