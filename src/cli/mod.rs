//! Command-line interface
//!
//! Argument parsing for the `factom-cli` binary.

pub mod commands;

pub use commands::{AddressKindArg, Command, Opt};
