//! Addresses, redeem conditions and the key pairs behind them
//!
//! The four textual address forms are one closed enum ([`Address`]). Factoid
//! public addresses commit to a type-1 redeem condition ([`Rcd1`]); every
//! other form carries raw ed25519 material.

#[allow(clippy::module_inception)]
pub mod address;
pub mod keys;
pub mod mnemonic;
pub mod rcd;

pub use address::{
    classify, decode_address, encode_address, Address, AddressKind,
    ADDRESS_BODY_LEN, ADDRESS_CHECK_SUM_LEN, ADDRESS_PAYLOAD_LEN, ADDRESS_PREFIX_LEN,
    ADDRESS_RAW_LEN, ADDRESS_TEXT_LEN,
};
pub use keys::{verify, EcKey, FactoidKey, SecretKey};
pub use mnemonic::{factoid_key_from_mnemonic, mnemonic_from_entropy, MNEMONIC_ENTROPY_LENGTH};
pub use rcd::{derive_rcd_hash, Rcd1, RCD_1_LEN, RCD_TYPE_1};
