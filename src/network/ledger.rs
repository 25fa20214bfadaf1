//! Read side of the ledger
//!
//! Result shapes of the factomd queries the library depends on and the
//! `Ledger` trait over them. Block and entry identifiers travel as hex text,
//! as factomd returns them.

use crate::core::{ChainId, Entry};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// KeyMR marking the start of a chain when walking back
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    #[serde(rename = "chainhead", default)]
    pub chain_head: String,
    /// Chain is known but not yet in a directory block
    #[serde(rename = "chaininprocesslist", default)]
    pub in_process_list: bool,
}

impl ChainHead {
    pub fn is_pending(&self) -> bool {
        self.chain_head.is_empty() && self.in_process_list
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBlockHeader {
    #[serde(rename = "blocksequencenumber")]
    pub sequence_number: u64,
    #[serde(rename = "chainid")]
    pub chain_id: String,
    #[serde(rename = "prevkeymr")]
    pub prev_key_mr: String,
    pub timestamp: i64,
    #[serde(rename = "dbheight")]
    pub db_height: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBlockEntry {
    #[serde(rename = "entryhash")]
    pub entry_hash: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBlock {
    pub header: EntryBlockHeader,
    #[serde(rename = "entrylist", default)]
    pub entry_list: Vec<EntryBlockEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryBlockHeader {
    #[serde(rename = "prevblockkeymr")]
    pub prev_block_key_mr: String,
    #[serde(rename = "sequencenumber")]
    pub sequence_number: i64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryBlockEntry {
    #[serde(rename = "chainid")]
    pub chain_id: String,
    #[serde(rename = "keymr")]
    pub key_mr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryBlock {
    pub header: DirectoryBlockHeader,
    #[serde(rename = "entryblocklist", default)]
    pub entry_block_list: Vec<DirectoryBlockEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heights {
    #[serde(rename = "directoryblockheight")]
    pub directory_block_height: i64,
    #[serde(rename = "leaderheight")]
    pub leader_height: i64,
    #[serde(rename = "entryblockheight")]
    pub entry_block_height: i64,
    #[serde(rename = "entryheight")]
    pub entry_height: i64,
}

/// Idempotent queries against ledger state.
///
/// Absent objects come back as `NotFound`; channel failures pass through
/// as `Transport`.
pub trait Ledger {
    fn chain_head(&self, chain_id: &ChainId) -> Result<ChainHead>;

    fn directory_block(&self, key_mr: &str) -> Result<DirectoryBlock>;

    fn entry_block(&self, key_mr: &str) -> Result<EntryBlock>;

    fn entry(&self, entry_hash: &str) -> Result<Entry>;

    fn heights(&self) -> Result<Heights>;

    /// Factoshis per entry credit
    fn entry_credit_rate(&self) -> Result<u64>;

    /// Every entry an entry block references, in block order
    fn entry_block_entries(&self, key_mr: &str) -> Result<Vec<Entry>> {
        let block = self.entry_block(key_mr)?;
        block
            .entry_list
            .iter()
            .map(|item| self.entry(&item.entry_hash))
            .collect()
    }
}
