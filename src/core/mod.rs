//! Core ledger artifacts
//!
//! Entries and chains with their canonical encoding, the commit/reveal pair
//! used to publish them, entry-credit pricing, and Factoid transactions.

pub mod chain;
pub mod commit;
pub mod entry;
pub mod fees;
pub mod monetary;
pub mod transaction;

pub use chain::{derive_chain_id, Chain};
pub use commit::{
    compose_chain_commit, compose_chain_commit_at, compose_chain_reveal, compose_entry_commit,
    compose_entry_commit_at, compose_entry_reveal, Commit, CommitParams, PublishKind, Reveal,
    RevealParams, CHAIN_COMMIT_LEN, ENTRY_COMMIT_LEN,
};
pub use entry::{entry_hash, ChainId, Entry, ENTRY_HEADER_SIZE, MAX_ENTRY_SIZE};
pub use fees::{chain_cost, entry_cost, FeeSchedule};
pub use monetary::FACTOSHIS_PER_FCT;
pub use transaction::{RcdSignature, Transaction, TxAmount};
