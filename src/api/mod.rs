//! Wallet JSON-RPC surface
//!
//! Request dispatch only. Serving it over HTTP is left to the embedding
//! program.

pub mod wallet_api;

pub use wallet_api::{
    AllTransactionsResponse, AmountResponse, MultiAddressResponse, MultiTransactionResponse,
    PropertiesResponse, TransactionDetail, TransactionResponse, WalletApi,
};
