// Key pairs behind the two address families
// Both wrap a 32-byte ed25519 seed; they differ only in which public payload
// their address carries (RCD hash for Factoids, raw key for entry credits)

use crate::address::{Address, AddressKind, Rcd1};
use crate::error::{FactomError, Result};
use crate::utils::{ed25519_public_key, ed25519_sign, ed25519_verify, new_seed};
use crate::utils::{PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_LENGTH};
use log::info;
use std::fmt;
use zeroize::ZeroizeOnDrop;

/// ed25519 seed that is wiped from memory on drop
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecretKey {
    seed: [u8; SEED_LENGTH],
}

impl SecretKey {
    pub fn from_seed(seed: [u8; SEED_LENGTH]) -> SecretKey {
        SecretKey { seed }
    }

    pub fn generate() -> Result<SecretKey> {
        Ok(SecretKey::from_seed(new_seed()?))
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.seed
    }

    pub fn public_key(&self) -> Result<[u8; PUBLIC_KEY_LENGTH]> {
        ed25519_public_key(&self.seed)
    }

    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
        ed25519_sign(&self.seed, message)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}

pub fn verify(
    public_key: &[u8; PUBLIC_KEY_LENGTH],
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
) -> bool {
    ed25519_verify(public_key, message, signature)
}

fn secret_from_text(text: &str, expected: AddressKind) -> Result<SecretKey> {
    let address = Address::decode(text)?;
    if address.kind() != expected {
        return Err(FactomError::InvalidKey(format!(
            "expected a {expected} address, got a {} address",
            address.kind()
        )));
    }
    Ok(SecretKey::from_seed(*address.payload()))
}

/// Spending key for a Factoid address
#[derive(Clone, Debug)]
pub struct FactoidKey {
    secret: SecretKey,
    public: [u8; PUBLIC_KEY_LENGTH],
}

impl FactoidKey {
    pub fn generate() -> Result<FactoidKey> {
        let key = FactoidKey::from_secret(SecretKey::generate()?)?;
        info!("Generated factoid address {}", key.address());
        Ok(key)
    }

    pub fn from_secret(secret: SecretKey) -> Result<FactoidKey> {
        let public = secret.public_key()?;
        Ok(FactoidKey { secret, public })
    }

    /// Build from an `Fs...` secret address
    pub fn from_secret_text(text: &str) -> Result<FactoidKey> {
        FactoidKey::from_secret(secret_from_text(text, AddressKind::FactoidSecret)?)
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public
    }

    pub fn rcd(&self) -> Rcd1 {
        Rcd1::new(self.public)
    }

    /// `FA...` address: the RCD hash of the public key
    pub fn address(&self) -> Address {
        self.rcd().address()
    }

    pub fn secret_address(&self) -> Address {
        Address::FactoidSecret(*self.secret.as_bytes())
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
        self.secret.sign(message)
    }
}

/// Key for an entry-credit address, used to pay for commits
#[derive(Clone, Debug)]
pub struct EcKey {
    secret: SecretKey,
    public: [u8; PUBLIC_KEY_LENGTH],
}

impl EcKey {
    pub fn generate() -> Result<EcKey> {
        let key = EcKey::from_secret(SecretKey::generate()?)?;
        info!("Generated entry credit address {}", key.address());
        Ok(key)
    }

    pub fn from_secret(secret: SecretKey) -> Result<EcKey> {
        let public = secret.public_key()?;
        Ok(EcKey { secret, public })
    }

    /// Build from an `Es...` secret address
    pub fn from_secret_text(text: &str) -> Result<EcKey> {
        EcKey::from_secret(secret_from_text(text, AddressKind::EcSecret)?)
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public
    }

    pub fn address(&self) -> Address {
        Address::EcPublic(self.public)
    }

    pub fn secret_address(&self) -> Address {
        Address::EcSecret(*self.secret.as_bytes())
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
        self.secret.sign(message)
    }
}
