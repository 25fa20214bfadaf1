//! Wallet: key custody and the named transaction working set
//!
//! Keys live in a `KeyStore`; transactions are built by name in a
//! `TransactionStore` and signed with those keys.

pub mod transactions;
#[allow(clippy::module_inception)]
pub mod wallet;

pub use transactions::{TransactionStore, TxRecord, TxState};
pub use wallet::{AddressPair, Wallet, WalletBackup, WalletProperties, WALLET_VERSION};
