//! Codec primitives
//!
//! Hashing, ed25519 signing, base58 text encoding, the big-endian varint and
//! length-prefixed byte helpers, and bincode record serialization.

pub mod codec;
pub mod crypto;
pub mod hex_serde;
pub mod serialization;

pub use codec::{encode_varint, write_length_prefixed, ByteReader};
pub use crypto::{
    base58_decode, base58_encode, current_timestamp_millis, ed25519_public_key, ed25519_sign,
    ed25519_verify, milli_timestamp_bytes, new_seed, sha256_digest, sha256d, sha512_digest,
    HASH_LENGTH, PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_LENGTH, TIMESTAMP_LENGTH,
};
pub use serialization::{deserialize, serialize};
