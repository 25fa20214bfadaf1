use crate::address::Address;
use crate::network::jsonrpc::{Json2Request, Json2Response, JsonError};
use crate::network::Ledger;
use crate::core::TxAmount;
use crate::wallet::{AddressPair, TxRecord, TxState, Wallet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

type ApiResult = std::result::Result<Value, JsonError>;

#[derive(Deserialize)]
struct AddressRequest {
    address: String,
}

#[derive(Deserialize)]
struct SecretParam {
    secret: String,
}

#[derive(Deserialize)]
struct ImportRequest {
    addresses: Vec<SecretParam>,
}

#[derive(Deserialize)]
struct MnemonicRequest {
    words: String,
}

#[derive(Deserialize)]
struct TransactionRequest {
    #[serde(rename = "tx-name")]
    name: String,
}

#[derive(Deserialize)]
struct TransactionValueRequest {
    #[serde(rename = "tx-name")]
    name: String,
    address: String,
    amount: u64,
}

#[derive(Deserialize)]
struct TransactionAddressRequest {
    #[serde(rename = "tx-name")]
    name: String,
    address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiAddressResponse {
    pub addresses: Vec<AddressPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "tx-name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub txid: String,
    #[serde(rename = "totalinputs", default)]
    pub total_inputs: u64,
    #[serde(rename = "totaloutputs", default)]
    pub total_outputs: u64,
    #[serde(rename = "totalecoutputs", default)]
    pub total_ec_outputs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TxState>,
    #[serde(rename = "rawtransaction", default, skip_serializing_if = "Option::is_none")]
    pub raw_transaction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTransactionResponse {
    pub transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountResponse {
    pub address: Address,
    pub amount: u64,
}

impl From<&TxAmount> for AmountResponse {
    fn from(slot: &TxAmount) -> Self {
        AmountResponse {
            address: slot.address.clone(),
            amount: slot.amount,
        }
    }
}

/// Every slot of one named transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    #[serde(rename = "tx-name")]
    pub name: String,
    pub txid: String,
    #[serde(rename = "millitimestamp")]
    pub timestamp_millis: u64,
    pub state: TxState,
    pub inputs: Vec<AmountResponse>,
    pub outputs: Vec<AmountResponse>,
    #[serde(rename = "outecs")]
    pub ec_outputs: Vec<AmountResponse>,
    pub signed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllTransactionsResponse {
    pub transactions: Vec<TransactionDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertiesResponse {
    #[serde(rename = "walletversion")]
    pub wallet_version: String,
}

fn failed<E: std::fmt::Display>(e: E) -> JsonError {
    JsonError::operation_failed(e)
}

fn to_value<T: Serialize>(value: T) -> ApiResult {
    serde_json::to_value(value).map_err(failed)
}

fn parse_address(text: &str) -> std::result::Result<Address, JsonError> {
    text.parse().map_err(failed)
}

fn summarize(record: &TxRecord) -> std::result::Result<TransactionResponse, JsonError> {
    let tx = &record.transaction;
    Ok(TransactionResponse {
        name: record.name.clone(),
        txid: hex::encode(tx.txid().map_err(failed)?),
        total_inputs: tx.total_inputs().map_err(failed)?,
        total_outputs: tx.total_outputs().map_err(failed)?,
        total_ec_outputs: tx.total_ec_outputs().map_err(failed)?,
        state: Some(record.state),
        raw_transaction: None,
    })
}

fn detail(record: &TxRecord) -> std::result::Result<TransactionDetail, JsonError> {
    let tx = &record.transaction;
    let slots = |list: &[TxAmount]| -> Vec<AmountResponse> {
        list.iter().map(AmountResponse::from).collect()
    };
    Ok(TransactionDetail {
        name: record.name.clone(),
        txid: hex::encode(tx.txid().map_err(failed)?),
        timestamp_millis: tx.timestamp_millis(),
        state: record.state,
        inputs: slots(tx.inputs()),
        outputs: slots(tx.outputs()),
        ec_outputs: slots(tx.ec_outputs()),
        signed: tx.is_signed(),
    })
}

/// Transport-free wallet JSON-RPC handler.
///
/// Each method name maps onto one `Wallet` operation. Fee methods read the
/// current entry-credit rate from `ledger`.
pub struct WalletApi<L: Ledger> {
    wallet: Wallet,
    ledger: L,
}

impl<L: Ledger> WalletApi<L> {
    pub fn new(wallet: Wallet, ledger: L) -> WalletApi<L> {
        WalletApi { wallet, ledger }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Raw request body in, response out; unparseable input gets a null id
    pub fn handle_text(&self, body: &str) -> Json2Response {
        match Json2Request::parse(body) {
            Ok(request) => self.handle(&request),
            Err(error) => Json2Response::failure(Value::Null, error),
        }
    }

    pub fn handle(&self, request: &Json2Request) -> Json2Response {
        debug!("Wallet API {}", request.method);
        match self.dispatch(request) {
            Ok(result) => Json2Response::success(request.id.clone(), result),
            Err(error) => {
                warn!("Wallet API {} failed: {error}", request.method);
                Json2Response::failure(request.id.clone(), error)
            }
        }
    }

    fn dispatch(&self, request: &Json2Request) -> ApiResult {
        match request.method.as_str() {
            "address" => self.address(request.params_as()?),
            "all-addresses" => self.all_addresses(),
            "generate-ec-address" => to_value(self.wallet.generate_ec_address().map_err(failed)?),
            "generate-factoid-address" => {
                to_value(self.wallet.generate_factoid_address().map_err(failed)?)
            }
            "import-addresses" => self.import_addresses(request.params_as()?),
            "import-mnemonic" => {
                let req: MnemonicRequest = request.params_as()?;
                to_value(self.wallet.import_mnemonic(&req.words).map_err(failed)?)
            }
            "wallet-backup" => to_value(self.wallet.backup().map_err(failed)?),
            "new-transaction" => {
                let req: TransactionRequest = request.params_as()?;
                let record = self.wallet.new_transaction(&req.name).map_err(failed)?;
                to_value(summarize(&record)?)
            }
            "delete-transaction" => {
                let req: TransactionRequest = request.params_as()?;
                self.wallet.delete_transaction(&req.name).map_err(failed)?;
                Ok(json!({ "tx-name": req.name }))
            }
            "transactions" => self.transactions(),
            "all-transactions" => {
                let records = self.wallet.transactions().map_err(failed)?;
                let transactions = records.iter().map(detail).collect::<Result<Vec<_>, _>>()?;
                to_value(AllTransactionsResponse { transactions })
            }
            "transaction-hash" => {
                let req: TransactionRequest = request.params_as()?;
                let txid = self.wallet.transaction_hash(&req.name).map_err(failed)?;
                Ok(json!({ "tx-name": req.name, "txid": hex::encode(txid) }))
            }
            "add-input" => self.with_value(request, |w, name, address, amount| {
                w.add_input(name, address, amount)
            }),
            "add-output" => self.with_value(request, |w, name, address, amount| {
                w.add_output(name, address, amount)
            }),
            "add-ec-output" => self.with_value(request, |w, name, address, amount| {
                w.add_ec_output(name, address, amount)
            }),
            "remove-input" => {
                self.with_address(request, |w, name, address| w.remove_input(name, address))
            }
            "remove-output" => {
                self.with_address(request, |w, name, address| w.remove_output(name, address))
            }
            "remove-ec-output" => self.with_address(request, |w, name, address| {
                w.remove_ec_output(name, address)
            }),
            "add-fee" => self.with_fee(request, |w, name, address, rate| {
                w.add_fee(name, address, rate)
            }),
            "sub-fee" => self.with_fee(request, |w, name, address, rate| {
                w.sub_fee(name, address, rate)
            }),
            "sign-transaction" => {
                let req: TransactionRequest = request.params_as()?;
                let record = self.wallet.sign_transaction(&req.name).map_err(failed)?;
                to_value(summarize(&record)?)
            }
            "compose-transaction" => {
                let req: TransactionRequest = request.params_as()?;
                let bytes = self.wallet.compose_transaction(&req.name).map_err(failed)?;
                let submit = Json2Request::new(
                    0,
                    "factoid-submit",
                    json!({ "transaction": hex::encode(bytes) }),
                )
                .map_err(failed)?;
                to_value(submit)
            }
            "properties" => {
                let props = self.wallet.properties().map_err(failed)?;
                to_value(PropertiesResponse {
                    wallet_version: props.wallet_version,
                })
            }
            _ => Err(JsonError::method_not_found()),
        }
    }

    fn address(&self, req: AddressRequest) -> ApiResult {
        let address = parse_address(&req.address)?;
        to_value(self.wallet.address(&address).map_err(failed)?)
    }

    fn all_addresses(&self) -> ApiResult {
        let addresses = self.wallet.all_addresses().map_err(failed)?;
        to_value(MultiAddressResponse { addresses })
    }

    fn import_addresses(&self, req: ImportRequest) -> ApiResult {
        let mut addresses = Vec::with_capacity(req.addresses.len());
        for param in &req.addresses {
            addresses.push(self.wallet.import_secret(&param.secret).map_err(failed)?);
        }
        to_value(MultiAddressResponse { addresses })
    }

    fn transactions(&self) -> ApiResult {
        let mut transactions = Vec::new();
        for record in self.wallet.transactions().map_err(failed)? {
            let mut summary = summarize(&record)?;
            summary.raw_transaction = Some(hex::encode(
                record.transaction.marshal_binary().map_err(failed)?,
            ));
            transactions.push(summary);
        }
        to_value(MultiTransactionResponse { transactions })
    }

    fn with_value<F>(&self, request: &Json2Request, op: F) -> ApiResult
    where
        F: FnOnce(&Wallet, &str, &Address, u64) -> crate::error::Result<TxRecord>,
    {
        let req: TransactionValueRequest = request.params_as()?;
        let address = parse_address(&req.address)?;
        let record = op(&self.wallet, &req.name, &address, req.amount).map_err(failed)?;
        to_value(summarize(&record)?)
    }

    fn with_address<F>(&self, request: &Json2Request, op: F) -> ApiResult
    where
        F: FnOnce(&Wallet, &str, &Address) -> crate::error::Result<TxRecord>,
    {
        let req: TransactionAddressRequest = request.params_as()?;
        let address = parse_address(&req.address)?;
        let record = op(&self.wallet, &req.name, &address).map_err(failed)?;
        to_value(summarize(&record)?)
    }

    fn with_fee<F>(&self, request: &Json2Request, op: F) -> ApiResult
    where
        F: FnOnce(&Wallet, &str, &Address, u64) -> crate::error::Result<(u64, TxRecord)>,
    {
        let req: TransactionAddressRequest = request.params_as()?;
        let address = parse_address(&req.address)?;
        let rate = self.ledger.entry_credit_rate().map_err(failed)?;
        let (_, record) = op(&self.wallet, &req.name, &address, rate).map_err(failed)?;
        to_value(summarize(&record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;
    use crate::network::jsonrpc::{
        INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    };
    use crate::testnet::test_utils::{
        MockLedger, EC_PUBLIC_2, EC_SECRET_1, FCT_PUBLIC_1, FCT_PUBLIC_2, FCT_SECRET_1,
    };

    fn api() -> WalletApi<MockLedger> {
        WalletApi::new(Wallet::in_memory().unwrap(), MockLedger::new())
    }

    fn call(api: &WalletApi<MockLedger>, method: &str, params: Value) -> Json2Response {
        api.handle(&Json2Request::new(1, method, params).unwrap())
    }

    fn ok(api: &WalletApi<MockLedger>, method: &str, params: Value) -> Value {
        let response = call(api, method, params);
        assert!(response.error.is_none(), "{method}: {:?}", response.error);
        response.result.unwrap()
    }

    fn error_code(response: &Json2Response) -> i64 {
        response.error.as_ref().unwrap().code
    }

    #[test]
    fn test_protocol_errors() {
        let api = api();
        assert_eq!(error_code(&api.handle_text("][")), PARSE_ERROR);
        assert_eq!(
            error_code(&api.handle_text(r#"{"jsonrpc": "1.0", "id": 1, "method": "properties"}"#)),
            INVALID_REQUEST
        );
        assert_eq!(
            error_code(&call(&api, "wallet-balances", Value::Null)),
            METHOD_NOT_FOUND
        );
        assert_eq!(
            error_code(&call(&api, "add-input", json!({"tx-name": 5}))),
            INVALID_PARAMS
        );

        let missing = call(&api, "sign-transaction", json!({"tx-name": "ghost"}));
        assert_eq!(error_code(&missing), INTERNAL_ERROR);
        assert!(missing.error.unwrap().message.contains("ghost"));
    }

    #[test]
    fn test_address_methods() {
        let api = api();
        let imported = ok(
            &api,
            "import-addresses",
            json!({"addresses": [{"secret": FCT_SECRET_1}, {"secret": EC_SECRET_1}]}),
        );
        assert_eq!(imported["addresses"][0]["public"], FCT_PUBLIC_1);

        let generated = ok(&api, "generate-ec-address", Value::Null);
        let public = generated["public"].as_str().unwrap().to_string();
        assert!(public.starts_with("EC"));

        let looked_up = ok(&api, "address", json!({"address": public}));
        assert_eq!(looked_up, generated);

        let all = ok(&api, "all-addresses", Value::Null);
        assert_eq!(all["addresses"].as_array().unwrap().len(), 3);

        let bad = call(&api, "address", json!({"address": FCT_PUBLIC_2}));
        assert_eq!(error_code(&bad), INTERNAL_ERROR);
    }

    #[test]
    fn test_transaction_flow() {
        let api = api();
        ok(&api, "import-addresses", json!({"addresses": [{"secret": FCT_SECRET_1}]}));

        ok(&api, "new-transaction", json!({"tx-name": "tx"}));
        ok(
            &api,
            "add-input",
            json!({"tx-name": "tx", "address": FCT_PUBLIC_1, "amount": 100_000_000}),
        );
        ok(
            &api,
            "add-output",
            json!({"tx-name": "tx", "address": FCT_PUBLIC_2, "amount": 50_000_000}),
        );
        ok(
            &api,
            "add-ec-output",
            json!({"tx-name": "tx", "address": EC_PUBLIC_2, "amount": 10_000}),
        );
        let summary = ok(&api, "add-fee", json!({"tx-name": "tx", "address": FCT_PUBLIC_1}));
        let inputs = summary["totalinputs"].as_u64().unwrap();
        // rate 1000 from the ledger; 1 KiB + 10 per input + 1 per output
        assert_eq!(inputs, 50_000_000 + 10_000 + 13 * 1000);

        let signed = ok(&api, "sign-transaction", json!({"tx-name": "tx"}));
        assert_eq!(signed["state"], "signed");

        let composed = ok(&api, "compose-transaction", json!({"tx-name": "tx"}));
        assert_eq!(composed["method"], "factoid-submit");
        let raw = hex::decode(composed["params"]["transaction"].as_str().unwrap()).unwrap();
        let tx = Transaction::unmarshal_binary(&raw).unwrap();
        tx.verify_signatures().unwrap();

        let hash = ok(&api, "transaction-hash", json!({"tx-name": "tx"}));
        assert_eq!(hash["txid"], hex::encode(tx.txid().unwrap()));

        let listed = ok(&api, "transactions", Value::Null);
        assert_eq!(listed["transactions"][0]["tx-name"], "tx");
        assert_eq!(
            listed["transactions"][0]["rawtransaction"],
            hex::encode(&raw)
        );

        ok(&api, "delete-transaction", json!({"tx-name": "tx"}));
        let listed = ok(&api, "transactions", Value::Null);
        assert!(listed["transactions"].as_array().unwrap().is_empty());

        let props = ok(&api, "properties", Value::Null);
        assert!(props["walletversion"].is_string());
    }

    #[test]
    fn test_mnemonic_and_backup() {
        let api = api();
        let generated = ok(&api, "generate-factoid-address", Value::Null);
        ok(&api, "import-addresses", json!({"addresses": [{"secret": EC_SECRET_1}]}));

        let backup = ok(&api, "wallet-backup", Value::Null);
        let words = backup["wallet-seed"].as_str().unwrap();
        assert_eq!(words.split(' ').count(), 12);
        let addresses = backup["addresses"].as_array().unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0], generated);

        // the backup words restore the first generated address elsewhere
        let restored = self::api();
        let imported = ok(&restored, "import-mnemonic", json!({"words": words}));
        assert_eq!(imported, generated);

        let bad = call(&restored, "import-mnemonic", json!({"words": "one two three"}));
        assert_eq!(error_code(&bad), INTERNAL_ERROR);
        let missing = call(&restored, "import-mnemonic", json!({"phrase": words}));
        assert_eq!(error_code(&missing), INVALID_PARAMS);
    }

    #[test]
    fn test_all_transactions_lists_every_slot() {
        let api = api();
        ok(&api, "import-addresses", json!({"addresses": [{"secret": FCT_SECRET_1}]}));
        ok(&api, "new-transaction", json!({"tx-name": "b"}));
        ok(&api, "new-transaction", json!({"tx-name": "a"}));
        ok(
            &api,
            "add-input",
            json!({"tx-name": "a", "address": FCT_PUBLIC_1, "amount": 100_000_000}),
        );
        ok(
            &api,
            "add-output",
            json!({"tx-name": "a", "address": FCT_PUBLIC_2, "amount": 60_000_000}),
        );
        ok(
            &api,
            "add-ec-output",
            json!({"tx-name": "a", "address": EC_PUBLIC_2, "amount": 20_000}),
        );
        ok(&api, "sub-fee", json!({"tx-name": "a", "address": FCT_PUBLIC_2}));
        let signed = ok(&api, "sign-transaction", json!({"tx-name": "a"}));

        let all = ok(&api, "all-transactions", Value::Null);
        let listed = all["transactions"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["tx-name"], "a");
        assert_eq!(listed[1]["tx-name"], "b");

        let a = &listed[0];
        assert_eq!(a["txid"], signed["txid"]);
        assert_eq!(a["state"], "signed");
        assert_eq!(a["signed"], true);
        assert_eq!(a["inputs"][0]["address"], FCT_PUBLIC_1);
        assert_eq!(a["inputs"][0]["amount"], 100_000_000);
        assert_eq!(a["outputs"][0]["address"], FCT_PUBLIC_2);
        assert_eq!(a["outecs"][0]["amount"], 20_000);
        assert!(a["millitimestamp"].as_u64().unwrap() > 0);

        assert!(listed[1]["inputs"].as_array().unwrap().is_empty());
        assert_eq!(listed[1]["signed"], false);
    }

    #[test]
    fn test_sub_fee_without_funds() {
        let api = api();
        ok(&api, "new-transaction", json!({"tx-name": "tx"}));
        ok(
            &api,
            "add-input",
            json!({"tx-name": "tx", "address": FCT_PUBLIC_1, "amount": 10}),
        );
        ok(
            &api,
            "add-output",
            json!({"tx-name": "tx", "address": FCT_PUBLIC_2, "amount": 10}),
        );
        let response = call(&api, "sub-fee", json!({"tx-name": "tx", "address": FCT_PUBLIC_2}));
        assert_eq!(error_code(&response), INTERNAL_ERROR);

        // the draft is untouched
        let listed = ok(&api, "transactions", Value::Null);
        assert_eq!(listed["transactions"][0]["totaloutputs"], 10);
    }
}
