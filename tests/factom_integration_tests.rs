//! Factom client integration tests
//!
//! Drives the public API end to end: publishing through a recording
//! transport, building a transaction through the wallet JSON-RPC handler,
//! and reopening an on-disk wallet.

use factom_client::core::{FeeSchedule, PublishKind};
use factom_client::network::{
    ChainHead, DirectoryBlock, EntryBlock, Heights, Json2Request, Json2Response, JsonError,
};
use factom_client::staking::{ec_staking_entry, is_valid_ec_staking_entry};
use factom_client::{
    compose_chain_commit, compose_chain_reveal, compose_entry_commit, compose_entry_reveal,
    Address, Chain, ChainId, Commit, Config, EcKey, Entry, FactomError, FactomdClient, Ledger,
    Transaction, Transport, Wallet, WalletApi,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const FCT_SECRET: &str = "Fs2TCa7Mo4XGy9FQSoZS8JPnDfv7SjwUSGqrjMWvc1RJ9sKbJeXA";
const FCT_PUBLIC: &str = "FA3T1gTkuKGG2MWpAkskSoTnfjxZDKVaAYwziNTC1pAYH5B9A1rh";
const FCT_PAYEE: &str = "FA3oaS2D2GkrZJuWuiDohnLruxV3AWbrM3PmG3HSSE7DHzPWio36";
const EC_SECRET: &str = "Es355qB6tWo1ZZRTK8cXpHjxGECXaPGw98AFCRJ6kxZ3J6vp1M2i";
const EC_PUBLIC: &str = "EC2R4bPDj9WQ8eWA4X3K8NYfTkBh4HFvCopLBq48FyrNXNumSK6w";

/// Answers every call with `{"message": ...}` and keeps what it was sent
#[derive(Clone, Default)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<Json2Request>>>,
}

impl Transport for RecordingTransport {
    fn call(&self, request: &Json2Request) -> factom_client::Result<Json2Response> {
        self.sent.lock().unwrap().push(request.clone());
        let result = match request.method.as_str() {
            "chain-head" => {
                return Ok(Json2Response::failure(
                    request.id.clone(),
                    JsonError::new(-32009, "Missing Chain Head"),
                ))
            }
            "commit-chain" | "commit-entry" => json!({
                "message": "Entry Commit Success",
                "txid": "ab".repeat(32),
            }),
            _ => json!({
                "message": "Entry Reveal Success",
                "entryhash": "cd".repeat(32),
            }),
        };
        Ok(Json2Response::success(request.id.clone(), result))
    }
}

/// Ledger that only knows the exchange rate
struct FixedRate(u64);

impl Ledger for FixedRate {
    fn chain_head(&self, chain_id: &ChainId) -> factom_client::Result<ChainHead> {
        Err(FactomError::NotFound(chain_id.to_hex()))
    }

    fn directory_block(&self, key_mr: &str) -> factom_client::Result<DirectoryBlock> {
        Err(FactomError::NotFound(key_mr.to_string()))
    }

    fn entry_block(&self, key_mr: &str) -> factom_client::Result<EntryBlock> {
        Err(FactomError::NotFound(key_mr.to_string()))
    }

    fn entry(&self, entry_hash: &str) -> factom_client::Result<Entry> {
        Err(FactomError::NotFound(entry_hash.to_string()))
    }

    fn heights(&self) -> factom_client::Result<Heights> {
        Err(FactomError::NotFound("heights".to_string()))
    }

    fn entry_credit_rate(&self) -> factom_client::Result<u64> {
        Ok(self.0)
    }
}

fn param(request: &Json2Request, key: &str) -> Vec<u8> {
    hex::decode(request.params[key].as_str().unwrap()).unwrap()
}

#[test]
fn test_publish_chain_then_entry() {
    let wallet = Wallet::in_memory().unwrap();
    wallet.import_secret(EC_SECRET).unwrap();
    let ec = wallet.ec_key(&EC_PUBLIC.parse().unwrap()).unwrap();

    let transport = RecordingTransport::default();
    let client = FactomdClient::new(Box::new(transport.clone()));

    let chain = Chain::from_strings("genesis", &["integration", "test"]);
    assert!(!client.chain_exists(&chain.chain_id).unwrap());

    let committed = client
        .commit_chain(&compose_chain_commit(&chain, &ec).unwrap())
        .unwrap();
    assert_eq!(committed.txid, "ab".repeat(32));
    client
        .reveal_chain(&compose_chain_reveal(&chain).unwrap())
        .unwrap();

    let entry = Entry::from_strings(&chain.chain_id.to_hex(), "second", &["more"]).unwrap();
    client
        .commit_entry(&compose_entry_commit(&entry, &ec).unwrap())
        .unwrap();
    client
        .reveal_entry(&compose_entry_reveal(&entry).unwrap())
        .unwrap();

    let sent = transport.sent.lock().unwrap().clone();
    let methods: Vec<&str> = sent.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(
        methods,
        ["chain-head", "commit-chain", "reveal-chain", "commit-entry", "reveal-entry"]
    );

    // what reached the node is self-consistent
    let chain_commit = Commit::parse(&param(&sent[1], "message")).unwrap();
    assert_eq!(chain_commit.kind(), PublishKind::Chain);
    chain_commit.verify().unwrap();
    assert_eq!(chain_commit.ec_address().to_string(), EC_PUBLIC);
    assert_eq!(chain_commit.credits(), 11);
    assert_eq!(chain_commit.entry_hash(), chain.first_entry.hash().unwrap());

    let revealed = Entry::unmarshal_binary(&param(&sent[2], "entry")).unwrap();
    assert_eq!(revealed, chain.first_entry);

    let entry_commit = Commit::parse(&param(&sent[3], "message")).unwrap();
    entry_commit.verify().unwrap();
    assert_eq!(entry_commit.credits(), 1);
    assert_eq!(entry_commit.entry_hash(), entry.hash().unwrap());

    // ids come from one counter
    let ids: Vec<u64> = sent.iter().map(|r| r.id.as_u64().unwrap()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_kind_mismatch_is_not_sent() {
    let ec = EcKey::from_secret_text(EC_SECRET).unwrap();
    let transport = RecordingTransport::default();
    let client = FactomdClient::new(Box::new(transport.clone()));

    let entry = Entry::from_strings(&"11".repeat(32), "x", &[]).unwrap();
    let commit = compose_entry_commit(&entry, &ec).unwrap();
    assert!(client.commit_chain(&commit).is_err());
    assert!(transport.sent.lock().unwrap().is_empty());
}

#[test]
fn test_wallet_api_builds_submittable_transaction() {
    let api = WalletApi::new(Wallet::in_memory().unwrap(), FixedRate(1000));
    let call = |method: &str, params: Value| -> Value {
        let response = api.handle(&Json2Request::new(7, method, params).unwrap());
        assert!(response.error.is_none(), "{method}: {:?}", response.error);
        response.result.unwrap()
    };

    call(
        "import-addresses",
        json!({ "addresses": [{ "secret": FCT_SECRET }] }),
    );
    call("new-transaction", json!({ "tx-name": "pay" }));
    call(
        "add-input",
        json!({ "tx-name": "pay", "address": FCT_PUBLIC, "amount": 100_000_000u64 }),
    );
    call(
        "add-output",
        json!({ "tx-name": "pay", "address": FCT_PAYEE, "amount": 99_000_000u64 }),
    );
    let funded = call("add-fee", json!({ "tx-name": "pay", "address": FCT_PUBLIC }));
    assert_eq!(funded["totaloutputs"], 99_000_000u64);

    let signed = call("sign-transaction", json!({ "tx-name": "pay" }));
    assert_eq!(signed["state"], "signed");

    let composed = call("compose-transaction", json!({ "tx-name": "pay" }));
    let submit: Json2Request = serde_json::from_value(composed).unwrap();
    assert_eq!(submit.method, "factoid-submit");

    let tx = Transaction::unmarshal_binary(&param(&submit, "transaction")).unwrap();
    tx.verify_signatures().unwrap();
    let fee = tx.fee(1000, &FeeSchedule::default()).unwrap();
    assert_eq!(tx.total_inputs().unwrap(), 99_000_000 + fee);
    assert_eq!(hex::encode(tx.txid().unwrap()), signed["txid"].as_str().unwrap());

    // an edit after composing drops the transaction back to draft
    let edited = call(
        "add-output",
        json!({ "tx-name": "pay", "address": FCT_PAYEE, "amount": 1u64 }),
    );
    assert_eq!(edited["state"], "draft");
    let response = api.handle(
        &Json2Request::new(8, "compose-transaction", json!({ "tx-name": "pay" })).unwrap(),
    );
    assert!(response.error.is_some());
}

#[test]
fn test_wallet_reopens_from_disk() {
    let dir = tempdir().unwrap();
    let config = Config {
        wallet_path: dir.path().join("wallet"),
        wallet_password: Some("correct horse".to_string()),
        ..Config::default()
    };

    let generated = {
        let wallet = Wallet::open(&config).unwrap();
        assert!(wallet.properties().unwrap().encrypted);
        let fct = wallet.generate_factoid_address().unwrap();
        let ec = wallet.import_secret(EC_SECRET).unwrap();
        (fct, ec)
    };

    let wallet = Wallet::open(&config).unwrap();
    let fct: &Address = &generated.0.public;
    assert_eq!(
        wallet.factoid_key(fct).unwrap().secret_address(),
        generated.0.secret
    );
    assert_eq!(generated.1.public.to_string(), EC_PUBLIC);
    assert_eq!(wallet.all_addresses().unwrap().len(), 2);
    drop(wallet);

    let wrong = Config {
        wallet_password: Some("battery staple".to_string()),
        ..config
    };
    assert!(Wallet::open(&wrong).is_err());
}

#[test]
fn test_staking_entry_is_publishable() {
    let ec = EcKey::from_secret_text(EC_SECRET).unwrap();
    let identity = ChainId::new([0x42; 32]);
    let entry = ec_staking_entry(&identity, &ec).unwrap();
    assert!(is_valid_ec_staking_entry(&identity, &entry));

    let commit = compose_entry_commit(&entry, &ec).unwrap();
    commit.verify().unwrap();
    assert_eq!(commit.entry_hash(), entry.hash().unwrap());
}
