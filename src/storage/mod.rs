//! Wallet persistence
//!
//! The sled-backed key store and the optional encryption layer it seals
//! secret seeds with.

pub mod encrypted;
pub mod keystore;

pub use encrypted::{derive_key_from_password, Aes256GcmCipher, EncryptionResult, SecureKey};
pub use keystore::KeyStore;
