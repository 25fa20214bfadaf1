use crate::address::Address;
use crate::error::{FactomError, Result};
use crate::utils::{sha256d, ByteReader, PUBLIC_KEY_LENGTH};

/// Type byte of a single-key ed25519 redeem condition
pub const RCD_TYPE_1: u8 = 0x01;
pub const RCD_1_LEN: usize = 1 + PUBLIC_KEY_LENGTH;

/// Redeem condition type 1: one ed25519 key.
///
/// A Factoid public address is the base58check of this RCD's hash, so
/// recomputing the hash from a presented key and comparing it against the
/// address payload is the spending check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rcd1 {
    public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl Rcd1 {
    pub fn new(public_key: [u8; PUBLIC_KEY_LENGTH]) -> Rcd1 {
        Rcd1 { public_key }
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    pub fn to_bytes(&self) -> [u8; RCD_1_LEN] {
        let mut out = [0u8; RCD_1_LEN];
        out[0] = RCD_TYPE_1;
        out[1..].copy_from_slice(&self.public_key);
        out
    }

    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Rcd1> {
        let rcd_type = reader.read_u8()?;
        if rcd_type != RCD_TYPE_1 {
            return Err(FactomError::UnsupportedVersion(rcd_type.into()));
        }
        Ok(Rcd1::new(reader.read_array()?))
    }

    pub fn hash(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    pub fn address(&self) -> Address {
        Address::FactoidPublic(self.hash())
    }

    /// True only for a Factoid public address whose payload is this RCD's hash
    pub fn matches(&self, address: &Address) -> bool {
        match address {
            Address::FactoidPublic(rcd_hash) => *rcd_hash == self.hash(),
            Address::FactoidSecret(_) | Address::EcPublic(_) | Address::EcSecret(_) => false,
        }
    }
}

/// sha256d(0x01 ‖ public key)
pub fn derive_rcd_hash(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> [u8; 32] {
    Rcd1::new(*public_key).hash()
}
