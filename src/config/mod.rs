//! Client configuration
//!
//! Built-in defaults, an optional TOML file and environment overrides,
//! resolved into one `Config` value that is handed to the ledger client and
//! the wallet.

pub mod settings;

pub use settings::Config;
