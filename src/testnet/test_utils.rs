//! Shared fixtures: published ledger vectors and in-memory stand-ins for
//! the node

use crate::address::{Address, EcKey, SecretKey};
use crate::core::{ChainId, Entry, Transaction};
use crate::error::{FactomError, Result};
use crate::network::{
    ChainHead, DirectoryBlock, EntryBlock, EntryBlockEntry, EntryBlockHeader, Heights,
    Json2Request, Json2Response, JsonError, Ledger, Transport, ZERO_HASH,
};
use crate::utils::sha256_digest;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Chain of the two-extid sample entry
pub const SAMPLE_CHAIN_ID: &str =
    "5a402200c5cf278e47905ce52d7d64529a0291829a7bd230072c5468be709069";
/// Chain whose only external id is "test"
pub const TEST_CHAIN_ID: &str =
    "954d5a49fd70d9b8bcdb35d252267829957f7ef7fa6c74f88419bdc5e82209f4";

pub const FCT_SECRET_1: &str = "Fs2TCa7Mo4XGy9FQSoZS8JPnDfv7SjwUSGqrjMWvc1RJ9sKbJeXA";
pub const FCT_PUBLIC_1: &str = "FA3T1gTkuKGG2MWpAkskSoTnfjxZDKVaAYwziNTC1pAYH5B9A1rh";
pub const FCT_SECRET_2: &str = "Fs1os7xg2mN9fTuJmaYZLk6EXz51x2wmmHr2365UAuPMJW3aNr25";
pub const FCT_PUBLIC_2: &str = "FA3oaS2D2GkrZJuWuiDohnLruxV3AWbrM3PmG3HSSE7DHzPWio36";
pub const EC_SECRET_1: &str = "Es355qB6tWo1ZZRTK8cXpHjxGECXaPGw98AFCRJ6kxZ3J6vp1M2i";
pub const EC_PUBLIC_1: &str = "EC2R4bPDj9WQ8eWA4X3K8NYfTkBh4HFvCopLBq48FyrNXNumSK6w";
pub const EC_SECRET_2: &str = "Es4KmwK65t9HCsibYzVDFrijvkgTFZKdEaEAgfMtYTPSVtM3NDSx";
pub const EC_PUBLIC_2: &str = "EC2CyGKaNddLFxrjkFgiaRZnk77b8iQia3Zj6h5fxFReAcDwCo3i";
/// Public side of the all-zero EC seed
pub const ZERO_EC_PUBLIC: &str = "EC2DKSYyRcNWf7RS963VFYgMExoHRYLHVeCfQ9PGPmNzwrcmgm2r";

pub fn sample_entry() -> Entry {
    Entry::from_strings(
        SAMPLE_CHAIN_ID,
        "This is a test Entry.",
        &["This is the first extid.", "This is the second extid."],
    )
    .unwrap()
}

pub fn test_entry() -> Entry {
    Entry::from_strings(TEST_CHAIN_ID, "test!", &["test"]).unwrap()
}

pub fn zero_ec_key() -> EcKey {
    EcKey::from_secret(SecretKey::from_seed([0u8; 32])).unwrap()
}

pub fn address(text: &str) -> Address {
    text.parse().unwrap()
}

/// 1 FCT from the first test address: 0.99 to the second, 0.005 to EC
pub fn sample_transaction() -> Transaction {
    let mut tx = Transaction::new(1_500_000_000_000);
    tx.add_input(address(FCT_PUBLIC_1), 100_000_000).unwrap();
    tx.add_output(address(FCT_PUBLIC_2), 99_000_000).unwrap();
    tx.add_ec_output(address(EC_PUBLIC_2), 500_000).unwrap();
    tx
}

#[derive(Default)]
struct MockState {
    responses: HashMap<String, std::result::Result<Value, JsonError>>,
    requests: Vec<Json2Request>,
}

/// Scripted JSON-RPC endpoint. Clones share the script and the request log.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport::default()
    }

    pub fn respond(&self, method: &str, result: Value) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(method.to_string(), Ok(result));
    }

    pub fn fail(&self, method: &str, error: JsonError) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(method.to_string(), Err(error));
    }

    pub fn requests(&self) -> Vec<Json2Request> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Transport for MockTransport {
    fn call(&self, request: &Json2Request) -> Result<Json2Response> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        match state.responses.get(&request.method) {
            Some(Ok(result)) => Ok(Json2Response::success(request.id.clone(), result.clone())),
            Some(Err(error)) => Ok(Json2Response::failure(request.id.clone(), error.clone())),
            None => Err(FactomError::Transport(format!(
                "connection refused ({})",
                request.method
            ))),
        }
    }
}

/// In-memory ledger holding whole chains of entry blocks
pub struct MockLedger {
    heads: HashMap<String, ChainHead>,
    blocks: HashMap<String, EntryBlock>,
    entries: HashMap<String, Entry>,
    pub heights: Heights,
    pub rate: u64,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> MockLedger {
        MockLedger {
            heads: HashMap::new(),
            blocks: HashMap::new(),
            entries: HashMap::new(),
            heights: Heights {
                directory_block_height: 100,
                leader_height: 100,
                entry_block_height: 100,
                entry_height: 100,
            },
            rate: 1000,
        }
    }

    /// Append an entry block to `chain_id` at `db_height`; returns its KeyMR
    pub fn push_block(&mut self, chain_id: &ChainId, db_height: i64, entries: Vec<Entry>) -> String {
        let chain = chain_id.to_hex();
        let prev = self
            .heads
            .get(&chain)
            .map(|head| head.chain_head.clone())
            .unwrap_or_else(|| ZERO_HASH.to_string());
        let sequence = self
            .blocks
            .values()
            .filter(|block| block.header.chain_id == chain)
            .count() as u64;
        let key_mr = hex::encode(sha256_digest(format!("{chain}/{sequence}").as_bytes()));

        let mut entry_list = Vec::with_capacity(entries.len());
        for entry in entries {
            let hash = hex::encode(entry.hash().unwrap());
            entry_list.push(EntryBlockEntry {
                entry_hash: hash.clone(),
                timestamp: 0,
            });
            self.entries.insert(hash, entry);
        }

        self.blocks.insert(
            key_mr.clone(),
            EntryBlock {
                header: EntryBlockHeader {
                    sequence_number: sequence,
                    chain_id: chain.clone(),
                    prev_key_mr: prev,
                    timestamp: 0,
                    db_height,
                },
                entry_list,
            },
        );
        self.heads.insert(
            chain,
            ChainHead {
                chain_head: key_mr.clone(),
                in_process_list: false,
            },
        );
        key_mr
    }

    /// Point the block `key_mr` back at `prev_key_mr`
    pub fn relink(&mut self, key_mr: &str, prev_key_mr: &str) {
        if let Some(block) = self.blocks.get_mut(key_mr) {
            block.header.prev_key_mr = prev_key_mr.to_string();
        }
    }

    /// Chain seen by the node but not yet in a directory block
    pub fn mark_pending(&mut self, chain_id: &ChainId) {
        self.heads.insert(
            chain_id.to_hex(),
            ChainHead {
                chain_head: String::new(),
                in_process_list: true,
            },
        );
    }
}

impl Ledger for MockLedger {
    fn chain_head(&self, chain_id: &ChainId) -> Result<ChainHead> {
        self.heads
            .get(&chain_id.to_hex())
            .cloned()
            .ok_or_else(|| FactomError::NotFound(format!("Missing Chain Head {chain_id}")))
    }

    fn directory_block(&self, key_mr: &str) -> Result<DirectoryBlock> {
        Err(FactomError::NotFound(format!("Block Not Found {key_mr}")))
    }

    fn entry_block(&self, key_mr: &str) -> Result<EntryBlock> {
        self.blocks
            .get(key_mr)
            .cloned()
            .ok_or_else(|| FactomError::NotFound(format!("Block Not Found {key_mr}")))
    }

    fn entry(&self, entry_hash: &str) -> Result<Entry> {
        self.entries
            .get(entry_hash)
            .cloned()
            .ok_or_else(|| FactomError::NotFound(format!("Entry Not Found {entry_hash}")))
    }

    fn heights(&self) -> Result<Heights> {
        Ok(self.heights)
    }

    fn entry_credit_rate(&self) -> Result<u64> {
        Ok(self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::FactoidKey;

    #[test]
    fn test_fixture_keys_match_addresses() {
        for (secret, public) in [(FCT_SECRET_1, FCT_PUBLIC_1), (FCT_SECRET_2, FCT_PUBLIC_2)] {
            let key = FactoidKey::from_secret_text(secret).unwrap();
            assert_eq!(key.address().to_string(), public);
        }
        for (secret, public) in [(EC_SECRET_1, EC_PUBLIC_1), (EC_SECRET_2, EC_PUBLIC_2)] {
            let key = EcKey::from_secret_text(secret).unwrap();
            assert_eq!(key.address().to_string(), public);
        }
        assert_eq!(zero_ec_key().address().to_string(), ZERO_EC_PUBLIC);
    }

    #[test]
    fn test_mock_ledger_links_blocks() {
        let mut ledger = MockLedger::new();
        let chain = test_entry().chain_id;
        let first = ledger.push_block(&chain, 10, vec![test_entry()]);
        let second = ledger.push_block(&chain, 20, vec![test_entry(), test_entry()]);

        assert_eq!(ledger.chain_head(&chain).unwrap().chain_head, second);
        let block = ledger.entry_block(&second).unwrap();
        assert_eq!(block.header.prev_key_mr, first);
        assert_eq!(ledger.entry_block_entries(&second).unwrap().len(), 2);
        assert_eq!(
            ledger.entry_block(&first).unwrap().header.prev_key_mr,
            ZERO_HASH
        );
    }
}
