//! Commit and reveal artifacts
//!
//! Publishing is pay-then-publish: a commit spends entry credits on a hash
//! and is signed by the paying EC key, the reveal then carries the entry
//! bytes that hash to it. Nothing here talks to the network; callers hand
//! the artifacts to [`crate::network::FactomdClient`] or any other channel.
//!
//! Entry commit, 136 bytes:
//! `version ‖ ts(6) ‖ entry hash ‖ credits(1) ‖ EC key ‖ signature`,
//! signature over the first 40 bytes.
//!
//! Chain commit, 200 bytes:
//! `version ‖ ts(6) ‖ sha256d(chain id) ‖ weld ‖ entry hash ‖ credits(1) ‖ EC key ‖ signature`,
//! signature over the first 104 bytes, `weld = sha256d(entry hash ‖ chain id)`.

use crate::address::{Address, EcKey};
use crate::core::chain::Chain;
use crate::core::entry::{entry_hash, Entry};
use crate::core::fees::{chain_cost, entry_cost};
use crate::error::{FactomError, Result};
use crate::utils::{
    current_timestamp_millis, ed25519_verify, milli_timestamp_bytes, sha256d, HASH_LENGTH,
    PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, TIMESTAMP_LENGTH,
};
use log::debug;
use serde::{Deserialize, Serialize};

pub const COMMIT_VERSION: u8 = 0;
pub const ENTRY_COMMIT_LEN: usize = 136;
pub const CHAIN_COMMIT_LEN: usize = 200;
const ENTRY_COMMIT_SIGNED_LEN: usize = ENTRY_COMMIT_LEN - PUBLIC_KEY_LENGTH - SIGNATURE_LENGTH;
const CHAIN_COMMIT_SIGNED_LEN: usize = CHAIN_COMMIT_LEN - PUBLIC_KEY_LENGTH - SIGNATURE_LENGTH;
const TS_START: usize = 1;
const TS_END: usize = TS_START + TIMESTAMP_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishKind {
    Entry,
    Chain,
}

/// `{"message": "<hex commit>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitParams {
    pub message: String,
}

/// `{"entry": "<hex entry>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealParams {
    pub entry: String,
}

/// A signed, paid declaration of an upcoming entry or chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    kind: PublishKind,
    bytes: Vec<u8>,
}

impl Commit {
    /// Accepts raw commit bytes, telling the two layouts apart by length
    pub fn parse(bytes: &[u8]) -> Result<Commit> {
        let kind = match bytes.len() {
            ENTRY_COMMIT_LEN => PublishKind::Entry,
            CHAIN_COMMIT_LEN => PublishKind::Chain,
            n => {
                return Err(FactomError::Serialization(format!(
                    "Commit must be {ENTRY_COMMIT_LEN} or {CHAIN_COMMIT_LEN} bytes, got {n}"
                )))
            }
        };
        if bytes[0] != COMMIT_VERSION {
            return Err(FactomError::UnsupportedVersion(bytes[0].into()));
        }
        Ok(Commit {
            kind,
            bytes: bytes.to_vec(),
        })
    }

    pub fn kind(&self) -> PublishKind {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn method(&self) -> &'static str {
        match self.kind {
            PublishKind::Entry => "commit-entry",
            PublishKind::Chain => "commit-chain",
        }
    }

    pub fn params(&self) -> CommitParams {
        CommitParams {
            message: hex::encode(&self.bytes),
        }
    }

    fn signed_len(&self) -> usize {
        match self.kind {
            PublishKind::Entry => ENTRY_COMMIT_SIGNED_LEN,
            PublishKind::Chain => CHAIN_COMMIT_SIGNED_LEN,
        }
    }

    fn slice<const N: usize>(&self, start: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[start..start + N]);
        out
    }

    pub fn timestamp_millis(&self) -> u64 {
        let mut ts = [0u8; 8];
        ts[8 - TIMESTAMP_LENGTH..].copy_from_slice(&self.bytes[TS_START..TS_END]);
        u64::from_be_bytes(ts)
    }

    pub fn entry_hash(&self) -> [u8; HASH_LENGTH] {
        match self.kind {
            PublishKind::Entry => self.slice(TS_END),
            PublishKind::Chain => self.slice(TS_END + 2 * HASH_LENGTH),
        }
    }

    /// Entry credits paid
    pub fn credits(&self) -> u8 {
        self.bytes[self.signed_len() - 1]
    }

    pub fn ec_public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.slice(self.signed_len())
    }

    pub fn ec_address(&self) -> Address {
        Address::EcPublic(self.ec_public_key())
    }

    /// Checks the signature against the embedded EC key
    pub fn verify(&self) -> Result<()> {
        let signed_len = self.signed_len();
        let signature = &self.bytes[signed_len + PUBLIC_KEY_LENGTH..];
        if ed25519_verify(&self.ec_public_key(), &self.bytes[..signed_len], signature) {
            Ok(())
        } else {
            Err(FactomError::InvalidKey(
                "commit signature does not verify".to_string(),
            ))
        }
    }
}

/// Entry bytes published after their commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    kind: PublishKind,
    entry: Vec<u8>,
}

impl Reveal {
    pub fn kind(&self) -> PublishKind {
        self.kind
    }

    pub fn entry_bytes(&self) -> &[u8] {
        &self.entry
    }

    pub fn method(&self) -> &'static str {
        match self.kind {
            PublishKind::Entry => "reveal-entry",
            PublishKind::Chain => "reveal-chain",
        }
    }

    pub fn params(&self) -> RevealParams {
        RevealParams {
            entry: hex::encode(&self.entry),
        }
    }
}

fn sign_commit(mut bytes: Vec<u8>, ec: &EcKey, kind: PublishKind) -> Result<Commit> {
    bytes.extend_from_slice(ec.public_key());
    let signed_len = bytes.len() - PUBLIC_KEY_LENGTH;
    let signature = ec.sign(&bytes[..signed_len])?;
    bytes.extend_from_slice(&signature);
    debug!(
        "Composed {kind:?} commit paid by {}: {}",
        ec.address(),
        hex::encode(&bytes)
    );
    Ok(Commit { kind, bytes })
}

pub fn compose_entry_commit(entry: &Entry, ec: &EcKey) -> Result<Commit> {
    compose_entry_commit_at(entry, ec, current_timestamp_millis()?)
}

/// Entry commit stamped with `timestamp_millis`
pub fn compose_entry_commit_at(entry: &Entry, ec: &EcKey, timestamp_millis: u64) -> Result<Commit> {
    let marshaled = entry.marshal_binary()?;
    let credits = entry_cost(marshaled.len())?;

    let mut bytes = Vec::with_capacity(ENTRY_COMMIT_LEN);
    bytes.push(COMMIT_VERSION);
    bytes.extend_from_slice(&milli_timestamp_bytes(timestamp_millis));
    bytes.extend_from_slice(&entry_hash(&marshaled));
    bytes.push(credits);
    sign_commit(bytes, ec, PublishKind::Entry)
}

pub fn compose_chain_commit(chain: &Chain, ec: &EcKey) -> Result<Commit> {
    compose_chain_commit_at(chain, ec, current_timestamp_millis()?)
}

/// Chain commit stamped with `timestamp_millis`
pub fn compose_chain_commit_at(chain: &Chain, ec: &EcKey, timestamp_millis: u64) -> Result<Commit> {
    let marshaled = chain.first_entry.marshal_binary()?;
    let credits = chain_cost(marshaled.len())?;
    let hash = entry_hash(&marshaled);

    let mut weld_preimage = Vec::with_capacity(2 * HASH_LENGTH);
    weld_preimage.extend_from_slice(&hash);
    weld_preimage.extend_from_slice(chain.chain_id.as_bytes());

    let mut bytes = Vec::with_capacity(CHAIN_COMMIT_LEN);
    bytes.push(COMMIT_VERSION);
    bytes.extend_from_slice(&milli_timestamp_bytes(timestamp_millis));
    bytes.extend_from_slice(&sha256d(chain.chain_id.as_bytes()));
    bytes.extend_from_slice(&sha256d(&weld_preimage));
    bytes.extend_from_slice(&hash);
    bytes.push(credits);
    sign_commit(bytes, ec, PublishKind::Chain)
}

pub fn compose_entry_reveal(entry: &Entry) -> Result<Reveal> {
    Ok(Reveal {
        kind: PublishKind::Entry,
        entry: entry.marshal_binary()?,
    })
}

pub fn compose_chain_reveal(chain: &Chain) -> Result<Reveal> {
    Ok(Reveal {
        kind: PublishKind::Chain,
        entry: chain.first_entry.marshal_binary()?,
    })
}
