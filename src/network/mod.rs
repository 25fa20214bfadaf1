//! Talking to a factomd node
//!
//! JSON-RPC 2.0 message types, a pluggable synchronous transport, the
//! ledger read channel and the client that submits commits, reveals and
//! Factoid transactions.

pub mod client;
pub mod jsonrpc;
pub mod ledger;
pub mod transport;

pub use client::{CommitResponse, FactoidSubmitResponse, FactomdClient, RevealResponse};
pub use jsonrpc::{Json2Request, Json2Response, JsonError};
pub use ledger::{
    ChainHead, DirectoryBlock, EntryBlock, EntryBlockEntry, EntryBlockHeader, Heights, Ledger,
    ZERO_HASH,
};
pub use transport::{HttpTransport, Transport};
