//! Error handling for the client library
//!
//! Every fallible operation in the crate returns [`FactomError`]. Nothing is
//! swallowed or downgraded to a default: decode failures, signing failures and
//! transport failures all reach the immediate caller unchanged.

use std::fmt;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, FactomError>;

/// Error kinds for encoding, credentials, composition and the ledger channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactomError {
    /// Trailing checksum of an address did not match its body
    InvalidChecksum,
    /// Address prefix matched none of the four known address types
    UnknownAddressType(String),
    /// Address text is not well formed (base58, length or slot type)
    InvalidAddress(String),
    /// Key material could not be used for signing or verification
    InvalidKey(String),
    /// Declared lengths exceed the bytes that are actually present
    TruncatedInput { needed: usize, available: usize },
    /// Version byte is not one this library understands
    UnsupportedVersion(u64),
    /// Entry payload exceeds what the ledger accepts
    EntryTooLarge { size: usize, max: usize },
    /// Inputs cannot cover outputs plus fee
    InsufficientFunds { required: u64, available: u64 },
    /// Transaction cannot be signed in its current form
    NotSignable(String),
    /// Transaction working-set or shape errors
    Transaction(String),
    /// Ledger query or local lookup found nothing
    NotFound(String),
    /// External channel failed before a response was produced
    Transport(String),
    /// External channel answered with a JSON-RPC error object
    Rpc { code: i64, message: String },
    /// Ledger answers that contradict each other
    InconsistentLedger(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Key store database errors
    Database(String),
    /// Encryption/decryption errors
    Encryption(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Cryptographic primitive errors (entropy, digest)
    Crypto(String),
}

impl fmt::Display for FactomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactomError::InvalidChecksum => write!(f, "Invalid address checksum"),
            FactomError::UnknownAddressType(addr) => write!(f, "Unknown address type: {addr}"),
            FactomError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            FactomError::InvalidKey(msg) => write!(f, "Invalid key: {msg}"),
            FactomError::TruncatedInput { needed, available } => {
                write!(
                    f,
                    "Truncated input: needed {needed} bytes, {available} available"
                )
            }
            FactomError::UnsupportedVersion(v) => write!(f, "Unsupported version: {v}"),
            FactomError::EntryTooLarge { size, max } => {
                write!(f, "Entry too large: {size} bytes, maximum is {max}")
            }
            FactomError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            FactomError::NotSignable(msg) => write!(f, "Transaction not signable: {msg}"),
            FactomError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            FactomError::NotFound(msg) => write!(f, "Not found: {msg}"),
            FactomError::Transport(msg) => write!(f, "Transport error: {msg}"),
            FactomError::Rpc { code, message } => write!(f, "RPC error {code}: {message}"),
            FactomError::InconsistentLedger(msg) => write!(f, "Inconsistent ledger: {msg}"),
            FactomError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            FactomError::Database(msg) => write!(f, "Database error: {msg}"),
            FactomError::Encryption(msg) => write!(f, "Encryption error: {msg}"),
            FactomError::Config(msg) => write!(f, "Configuration error: {msg}"),
            FactomError::Io(msg) => write!(f, "I/O error: {msg}"),
            FactomError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
        }
    }
}

impl std::error::Error for FactomError {}

impl From<std::io::Error> for FactomError {
    fn from(err: std::io::Error) -> Self {
        FactomError::Io(err.to_string())
    }
}

impl From<sled::Error> for FactomError {
    fn from(err: sled::Error) -> Self {
        FactomError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for FactomError {
    fn from(err: bincode::error::EncodeError) -> Self {
        FactomError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for FactomError {
    fn from(err: bincode::error::DecodeError) -> Self {
        FactomError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for FactomError {
    fn from(err: serde_json::Error) -> Self {
        FactomError::Serialization(err.to_string())
    }
}

impl From<hex::FromHexError> for FactomError {
    fn from(err: hex::FromHexError) -> Self {
        FactomError::Serialization(format!("Invalid hex: {err}"))
    }
}
