//! # Factom client
//!
//! Client-side building blocks for the Factom ledger: addresses and keys,
//! entries and chains, the commit/reveal pair that publishes them, Factoid
//! transactions, a wallet to hold keys and drafts, and a JSON-RPC client for
//! factomd.
//!
//! ## Layout
//! - `address/`: the four address types, ed25519 keys and RCDs
//! - `core/`: entries, chains, commits and reveals, fees, transactions
//! - `wallet/`: key custody and the named transaction working set
//! - `storage/`: sled key store with optional encryption at rest
//! - `network/`: JSON-RPC types, transports, the ledger read channel
//! - `api/`: the wallet JSON-RPC dispatcher
//! - `staking/`: staking registration entries
//! - `config/`, `cli/`, `utils/`: ambient plumbing
//!
//! Everything in `address/` and `core/` is pure: nothing there touches the
//! network or disk, and every artifact can be built offline and handed to a
//! [`network::FactomdClient`] (or any other channel) afterwards.

pub mod address;
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod staking;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

pub use address::{Address, AddressKind, EcKey, FactoidKey, Rcd1};
pub use api::WalletApi;
pub use cli::{Command, Opt};
pub use config::Config;
pub use core::{
    compose_chain_commit, compose_chain_reveal, compose_entry_commit, compose_entry_reveal,
    derive_chain_id, Chain, ChainId, Commit, Entry, FeeSchedule, Reveal, Transaction,
};
pub use error::{FactomError, Result};
pub use network::{FactomdClient, HttpTransport, Ledger, Transport};
pub use storage::KeyStore;
pub use wallet::{TransactionStore, TxState, Wallet};
