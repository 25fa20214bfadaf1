use crate::error::{FactomError, Result};
use crate::utils::{base58_decode, base58_encode, sha256d};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_PREFIX_LEN: usize = 2;
pub const ADDRESS_PAYLOAD_LEN: usize = 32;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;
/// prefix + payload
pub const ADDRESS_BODY_LEN: usize = ADDRESS_PREFIX_LEN + ADDRESS_PAYLOAD_LEN;
/// prefix + payload + checksum
pub const ADDRESS_RAW_LEN: usize = ADDRESS_BODY_LEN + ADDRESS_CHECK_SUM_LEN;
/// Every address type encodes to the same number of base58 characters
pub const ADDRESS_TEXT_LEN: usize = 52;

const FACTOID_PUBLIC_PREFIX: [u8; 2] = [0x5f, 0xb1];
const FACTOID_SECRET_PREFIX: [u8; 2] = [0x64, 0x78];
const EC_PUBLIC_PREFIX: [u8; 2] = [0x59, 0x2a];
const EC_SECRET_PREFIX: [u8; 2] = [0x5d, 0xb6];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    FactoidPublic,
    FactoidSecret,
    EcPublic,
    EcSecret,
}

impl AddressKind {
    pub const ALL: [AddressKind; 4] = [
        AddressKind::FactoidPublic,
        AddressKind::FactoidSecret,
        AddressKind::EcPublic,
        AddressKind::EcSecret,
    ];

    pub const fn prefix(self) -> [u8; 2] {
        match self {
            AddressKind::FactoidPublic => FACTOID_PUBLIC_PREFIX,
            AddressKind::FactoidSecret => FACTOID_SECRET_PREFIX,
            AddressKind::EcPublic => EC_PUBLIC_PREFIX,
            AddressKind::EcSecret => EC_SECRET_PREFIX,
        }
    }

    pub fn from_prefix(prefix: &[u8]) -> Option<AddressKind> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }

    pub const fn is_secret(self) -> bool {
        match self {
            AddressKind::FactoidSecret | AddressKind::EcSecret => true,
            AddressKind::FactoidPublic | AddressKind::EcPublic => false,
        }
    }

    pub const fn is_factoid(self) -> bool {
        match self {
            AddressKind::FactoidPublic | AddressKind::FactoidSecret => true,
            AddressKind::EcPublic | AddressKind::EcSecret => false,
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressKind::FactoidPublic => "factoid public",
            AddressKind::FactoidSecret => "factoid secret",
            AddressKind::EcPublic => "entry credit public",
            AddressKind::EcSecret => "entry credit secret",
        };
        write!(f, "{name}")
    }
}

/// One of the four ledger address variants with its 32-byte payload.
///
/// `FactoidPublic` carries an RCD hash, `EcPublic` a raw ed25519 public key
/// and both secret variants the ed25519 seed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Address {
    FactoidPublic([u8; ADDRESS_PAYLOAD_LEN]),
    FactoidSecret([u8; ADDRESS_PAYLOAD_LEN]),
    EcPublic([u8; ADDRESS_PAYLOAD_LEN]),
    EcSecret([u8; ADDRESS_PAYLOAD_LEN]),
}

impl Address {
    pub fn new(kind: AddressKind, payload: [u8; ADDRESS_PAYLOAD_LEN]) -> Address {
        match kind {
            AddressKind::FactoidPublic => Address::FactoidPublic(payload),
            AddressKind::FactoidSecret => Address::FactoidSecret(payload),
            AddressKind::EcPublic => Address::EcPublic(payload),
            AddressKind::EcSecret => Address::EcSecret(payload),
        }
    }

    pub fn kind(&self) -> AddressKind {
        match self {
            Address::FactoidPublic(_) => AddressKind::FactoidPublic,
            Address::FactoidSecret(_) => AddressKind::FactoidSecret,
            Address::EcPublic(_) => AddressKind::EcPublic,
            Address::EcSecret(_) => AddressKind::EcSecret,
        }
    }

    pub fn payload(&self) -> &[u8; ADDRESS_PAYLOAD_LEN] {
        match self {
            Address::FactoidPublic(p)
            | Address::FactoidSecret(p)
            | Address::EcPublic(p)
            | Address::EcSecret(p) => p,
        }
    }

    pub fn encode(&self) -> String {
        encode_address(self.kind(), self.payload())
    }

    pub fn decode(text: &str) -> Result<Address> {
        let (kind, payload) = decode_address(text)?;
        Ok(Address::new(kind, payload))
    }

    /// Decode and insist on a particular variant
    pub fn decode_as(text: &str, expected: AddressKind) -> Result<Address> {
        let address = Address::decode(text)?;
        if address.kind() != expected {
            return Err(FactomError::InvalidAddress(format!(
                "{text} is a {} address, expected {expected}",
                address.kind()
            )));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

// Secret variants are never printed through Debug
impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::FactoidPublic(_) | Address::EcPublic(_) => {
                f.debug_tuple("Address").field(&self.encode()).finish()
            }
            Address::FactoidSecret(_) | Address::EcSecret(_) => f
                .debug_tuple("Address")
                .field(&self.kind())
                .field(&"<redacted>")
                .finish(),
        }
    }
}

impl FromStr for Address {
    type Err = FactomError;

    fn from_str(s: &str) -> Result<Self> {
        Address::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::decode(&text).map_err(serde::de::Error::custom)
    }
}

fn checksum(body: &[u8]) -> [u8; ADDRESS_CHECK_SUM_LEN] {
    let hash = sha256d(body);
    let mut out = [0u8; ADDRESS_CHECK_SUM_LEN];
    out.copy_from_slice(&hash[..ADDRESS_CHECK_SUM_LEN]);
    out
}

/// base58(prefix ‖ payload ‖ sha256d(prefix ‖ payload)[0..4])
pub fn encode_address(kind: AddressKind, payload: &[u8; ADDRESS_PAYLOAD_LEN]) -> String {
    let mut raw = Vec::with_capacity(ADDRESS_RAW_LEN);
    raw.extend_from_slice(&kind.prefix());
    raw.extend_from_slice(payload);
    let check = checksum(&raw);
    raw.extend_from_slice(&check);
    base58_encode(&raw)
}

/// Checksum is verified before the prefix is looked at, so the payload is
/// never handed out unless both pass.
pub fn decode_address(text: &str) -> Result<(AddressKind, [u8; ADDRESS_PAYLOAD_LEN])> {
    let raw = base58_decode(text)?;
    if raw.len() != ADDRESS_RAW_LEN {
        return Err(FactomError::InvalidAddress(format!(
            "{text}: decoded to {} bytes, expected {ADDRESS_RAW_LEN}",
            raw.len()
        )));
    }

    let (body, check) = raw.split_at(ADDRESS_BODY_LEN);
    if checksum(body) != check {
        return Err(FactomError::InvalidChecksum);
    }

    let kind = AddressKind::from_prefix(&body[..ADDRESS_PREFIX_LEN])
        .ok_or_else(|| FactomError::UnknownAddressType(text.to_string()))?;

    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    payload.copy_from_slice(&body[ADDRESS_PREFIX_LEN..]);
    Ok((kind, payload))
}

/// Prefix and length sniff without checksum validation
pub fn classify(text: &str) -> Option<AddressKind> {
    if text.len() != ADDRESS_TEXT_LEN {
        return None;
    }
    let raw = base58_decode(text).ok()?;
    if raw.len() != ADDRESS_RAW_LEN {
        return None;
    }
    AddressKind::from_prefix(&raw[..ADDRESS_PREFIX_LEN])
}
