use crate::address::{Address, AddressKind};
use crate::config::Config;
use crate::core::{ChainId, Commit, Entry, PublishKind, Reveal};
use crate::error::{FactomError, Result};
use crate::network::jsonrpc::Json2Request;
use crate::network::ledger::{ChainHead, DirectoryBlock, EntryBlock, Heights, Ledger};
use crate::network::transport::{HttpTransport, Transport};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    pub message: String,
    #[serde(default)]
    pub txid: String,
    #[serde(rename = "entryhash", default)]
    pub entry_hash: String,
    #[serde(rename = "chainid", default)]
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResponse {
    pub message: String,
    #[serde(rename = "entryhash", default)]
    pub entry_hash: String,
    #[serde(rename = "chainid", default)]
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoidSubmitResponse {
    pub message: String,
    #[serde(default)]
    pub txid: String,
}

#[derive(Deserialize)]
struct RateResponse {
    rate: u64,
}

#[derive(Deserialize)]
struct BalanceResponse {
    balance: i64,
}

/// JSON-RPC client for a factomd node.
///
/// Every call is a single request over the configured transport. Request
/// ids come from a per-client counter.
pub struct FactomdClient {
    transport: Box<dyn Transport>,
    next_id: AtomicU64,
}

impl FactomdClient {
    pub fn new(transport: Box<dyn Transport>) -> FactomdClient {
        FactomdClient {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &Config) -> Result<FactomdClient> {
        info!("Using factomd at {}", config.factomd_server);
        Ok(FactomdClient::new(Box::new(HttpTransport::factomd(config)?)))
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn request<R: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> Result<R> {
        let id = self.next_id();
        let request = match params {
            Some(params) => Json2Request::new(id, method, params)?,
            None => Json2Request::bare(id, method),
        };
        self.transport.call(&request)?.into_result()
    }

    pub fn submit_commit(&self, commit: &Commit) -> Result<CommitResponse> {
        let response: CommitResponse =
            self.request(commit.method(), Some(serde_json::to_value(commit.params())?))?;
        info!("{}: {}", commit.method(), response.message);
        Ok(response)
    }

    pub fn submit_reveal(&self, reveal: &Reveal) -> Result<RevealResponse> {
        let response: RevealResponse =
            self.request(reveal.method(), Some(serde_json::to_value(reveal.params())?))?;
        info!("{}: {} {}", reveal.method(), response.message, response.entry_hash);
        Ok(response)
    }

    pub fn commit_chain(&self, commit: &Commit) -> Result<CommitResponse> {
        expect_kind(commit.kind(), PublishKind::Chain)?;
        self.submit_commit(commit)
    }

    pub fn reveal_chain(&self, reveal: &Reveal) -> Result<RevealResponse> {
        expect_kind(reveal.kind(), PublishKind::Chain)?;
        self.submit_reveal(reveal)
    }

    pub fn commit_entry(&self, commit: &Commit) -> Result<CommitResponse> {
        expect_kind(commit.kind(), PublishKind::Entry)?;
        self.submit_commit(commit)
    }

    pub fn reveal_entry(&self, reveal: &Reveal) -> Result<RevealResponse> {
        expect_kind(reveal.kind(), PublishKind::Entry)?;
        self.submit_reveal(reveal)
    }

    /// Submit a composed Factoid transaction
    pub fn factoid_submit(&self, transaction: &[u8]) -> Result<FactoidSubmitResponse> {
        let response: FactoidSubmitResponse = self.request(
            "factoid-submit",
            Some(json!({ "transaction": hex::encode(transaction) })),
        )?;
        info!("factoid-submit: {} {}", response.message, response.txid);
        Ok(response)
    }

    /// True once the chain is in a block or waiting in the process list
    pub fn chain_exists(&self, chain_id: &ChainId) -> Result<bool> {
        match self.chain_head(chain_id) {
            Ok(head) => Ok(!head.chain_head.is_empty() || head.in_process_list),
            Err(FactomError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn factoid_balance(&self, address: &Address) -> Result<i64> {
        expect_address(address, AddressKind::FactoidPublic)?;
        let response: BalanceResponse =
            self.request("factoid-balance", Some(json!({ "address": address })))?;
        Ok(response.balance)
    }

    pub fn entry_credit_balance(&self, address: &Address) -> Result<i64> {
        expect_address(address, AddressKind::EcPublic)?;
        let response: BalanceResponse =
            self.request("entry-credit-balance", Some(json!({ "address": address })))?;
        Ok(response.balance)
    }
}

fn expect_kind(actual: PublishKind, expected: PublishKind) -> Result<()> {
    if actual != expected {
        return Err(FactomError::Transaction(format!(
            "Expected a {expected:?} artifact, got {actual:?}"
        )));
    }
    Ok(())
}

fn expect_address(address: &Address, expected: AddressKind) -> Result<()> {
    if address.kind() != expected {
        return Err(FactomError::InvalidAddress(format!(
            "{address} is not a {expected} address"
        )));
    }
    Ok(())
}

impl Ledger for FactomdClient {
    fn chain_head(&self, chain_id: &ChainId) -> Result<ChainHead> {
        self.request("chain-head", Some(json!({ "chainid": chain_id.to_hex() })))
    }

    fn directory_block(&self, key_mr: &str) -> Result<DirectoryBlock> {
        self.request("directory-block", Some(json!({ "keymr": key_mr })))
    }

    fn entry_block(&self, key_mr: &str) -> Result<EntryBlock> {
        self.request("entry-block", Some(json!({ "keymr": key_mr })))
    }

    fn entry(&self, entry_hash: &str) -> Result<Entry> {
        debug!("Fetching entry {entry_hash}");
        self.request("entry", Some(json!({ "hash": entry_hash })))
    }

    fn heights(&self) -> Result<Heights> {
        self.request("heights", None)
    }

    fn entry_credit_rate(&self) -> Result<u64> {
        let response: RateResponse = self.request("entry-credit-rate", None)?;
        Ok(response.rate)
    }
}
