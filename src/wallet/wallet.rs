use crate::address::{
    classify, factoid_key_from_mnemonic, Address, AddressKind, EcKey, FactoidKey,
};
use crate::config::Config;
use crate::core::{FeeSchedule, Transaction};
use crate::error::{FactomError, Result};
use crate::storage::KeyStore;
use crate::wallet::transactions::{TransactionStore, TxRecord};
use log::info;
use serde::{Deserialize, Serialize};

pub const WALLET_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Public address with the secret that controls it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPair {
    pub public: Address,
    pub secret: Address,
}

impl From<&FactoidKey> for AddressPair {
    fn from(key: &FactoidKey) -> Self {
        AddressPair {
            public: key.address(),
            secret: key.secret_address(),
        }
    }
}

impl From<&EcKey> for AddressPair {
    fn from(key: &EcKey) -> Self {
        AddressPair {
            public: key.address(),
            secret: key.secret_address(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletProperties {
    pub wallet_version: String,
    pub encrypted: bool,
    pub transactions: usize,
}

/// Recovery phrase plus every key the wallet holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBackup {
    #[serde(rename = "wallet-seed")]
    pub seed: String,
    pub addresses: Vec<AddressPair>,
}

/// Keys plus the named transactions being built against them
pub struct Wallet {
    keys: KeyStore,
    transactions: TransactionStore,
    fees: FeeSchedule,
}

impl Wallet {
    pub fn new(keys: KeyStore) -> Wallet {
        Wallet {
            keys,
            transactions: TransactionStore::new(),
            fees: FeeSchedule::default(),
        }
    }

    /// Open the key store named by the configuration
    pub fn open(config: &Config) -> Result<Wallet> {
        let keys = KeyStore::open(&config.wallet_path, config.wallet_password.as_deref())?;
        info!("Opened wallet at {}", config.wallet_path.display());
        Ok(Wallet::new(keys))
    }

    /// Wallet whose keys vanish when it is dropped
    pub fn in_memory() -> Result<Wallet> {
        Ok(Wallet::new(KeyStore::temporary(None)?))
    }

    pub fn with_fee_schedule(mut self, fees: FeeSchedule) -> Wallet {
        self.fees = fees;
        self
    }

    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Next Factoid address derived from the wallet seed
    pub fn generate_factoid_address(&self) -> Result<AddressPair> {
        let pair = AddressPair::from(&self.keys.next_factoid_key()?);
        info!("Generated {}", pair.public);
        Ok(pair)
    }

    pub fn generate_ec_address(&self) -> Result<AddressPair> {
        let pair = AddressPair::from(&self.keys.next_ec_key()?);
        info!("Generated {}", pair.public);
        Ok(pair)
    }

    /// Store the first Factoid key of a 12-word recovery phrase
    pub fn import_mnemonic(&self, words: &str) -> Result<AddressPair> {
        let key = factoid_key_from_mnemonic(words)?;
        self.keys.insert_factoid(&key)?;
        let pair = AddressPair::from(&key);
        info!("Imported {} from a mnemonic", pair.public);
        Ok(pair)
    }

    pub fn backup(&self) -> Result<WalletBackup> {
        Ok(WalletBackup {
            seed: self.keys.wallet_mnemonic()?.to_string(),
            addresses: self.all_addresses()?,
        })
    }

    /// Store the key behind an `Fs...` or `Es...` secret address
    pub fn import_secret(&self, text: &str) -> Result<AddressPair> {
        let pair = match classify(text) {
            Some(AddressKind::FactoidSecret) => {
                let key = FactoidKey::from_secret_text(text)?;
                self.keys.insert_factoid(&key)?;
                AddressPair::from(&key)
            }
            Some(AddressKind::EcSecret) => {
                let key = EcKey::from_secret_text(text)?;
                self.keys.insert_ec(&key)?;
                AddressPair::from(&key)
            }
            Some(kind) => {
                return Err(FactomError::InvalidKey(format!(
                    "Cannot import a {kind} address"
                )))
            }
            None => {
                // surfaces the precise decoding failure
                Address::decode(text)?;
                return Err(FactomError::InvalidKey("Unrecognized secret".to_string()));
            }
        };
        info!("Imported {}", pair.public);
        Ok(pair)
    }

    pub fn factoid_key(&self, public: &Address) -> Result<FactoidKey> {
        self.keys
            .factoid_key(public)?
            .ok_or_else(|| FactomError::NotFound(format!("No secret key for {public}")))
    }

    pub fn ec_key(&self, public: &Address) -> Result<EcKey> {
        self.keys
            .ec_key(public)?
            .ok_or_else(|| FactomError::NotFound(format!("No secret key for {public}")))
    }

    /// Secret for a public address held by this wallet
    pub fn address(&self, public: &Address) -> Result<AddressPair> {
        match public.kind() {
            AddressKind::FactoidPublic => Ok(AddressPair::from(&self.factoid_key(public)?)),
            AddressKind::EcPublic => Ok(AddressPair::from(&self.ec_key(public)?)),
            AddressKind::FactoidSecret | AddressKind::EcSecret => Err(
                FactomError::InvalidAddress(format!("{public} is not a public address")),
            ),
        }
    }

    /// Factoid addresses first, then entry credit addresses
    pub fn all_addresses(&self) -> Result<Vec<AddressPair>> {
        let mut pairs: Vec<AddressPair> = self
            .keys
            .factoid_keys()?
            .iter()
            .map(AddressPair::from)
            .collect();
        pairs.extend(self.keys.ec_keys()?.iter().map(AddressPair::from));
        Ok(pairs)
    }

    pub fn new_transaction(&self, name: &str) -> Result<TxRecord> {
        self.transactions.create(name)
    }

    pub fn delete_transaction(&self, name: &str) -> Result<TxRecord> {
        self.transactions.delete(name)
    }

    pub fn transaction(&self, name: &str) -> Result<TxRecord> {
        self.transactions.get(name)
    }

    pub fn transactions(&self) -> Result<Vec<TxRecord>> {
        self.transactions.list()
    }

    pub fn transaction_hash(&self, name: &str) -> Result<[u8; 32]> {
        self.transactions.get(name)?.transaction.txid()
    }

    fn edit<F>(&self, name: &str, change: F) -> Result<TxRecord>
    where
        F: FnOnce(&mut Transaction) -> Result<()>,
    {
        Ok(self.transactions.mutate(name, change)?.1)
    }

    pub fn add_input(&self, name: &str, address: &Address, amount: u64) -> Result<TxRecord> {
        self.edit(name, |tx| tx.add_input(address.clone(), amount))
    }

    pub fn add_output(&self, name: &str, address: &Address, amount: u64) -> Result<TxRecord> {
        self.edit(name, |tx| tx.add_output(address.clone(), amount))
    }

    pub fn add_ec_output(&self, name: &str, address: &Address, amount: u64) -> Result<TxRecord> {
        self.edit(name, |tx| tx.add_ec_output(address.clone(), amount))
    }

    pub fn remove_input(&self, name: &str, address: &Address) -> Result<TxRecord> {
        self.edit(name, |tx| tx.remove_input(address))
    }

    pub fn remove_output(&self, name: &str, address: &Address) -> Result<TxRecord> {
        self.edit(name, |tx| tx.remove_output(address))
    }

    pub fn remove_ec_output(&self, name: &str, address: &Address) -> Result<TxRecord> {
        self.edit(name, |tx| tx.remove_ec_output(address))
    }

    /// Returns the fee charged at `rate` factoshis per entry credit, with
    /// the transaction as it was balanced
    pub fn add_fee(&self, name: &str, address: &Address, rate: u64) -> Result<(u64, TxRecord)> {
        self.transactions
            .mutate(name, |tx| tx.add_fee(address, rate, &self.fees))
    }

    pub fn sub_fee(&self, name: &str, address: &Address, rate: u64) -> Result<(u64, TxRecord)> {
        self.transactions
            .mutate(name, |tx| tx.sub_fee(address, rate, &self.fees))
    }

    pub fn sign_transaction(&self, name: &str) -> Result<TxRecord> {
        self.transactions
            .sign(name, |address| self.keys.factoid_key(address))
    }

    pub fn compose_transaction(&self, name: &str) -> Result<Vec<u8>> {
        self.transactions.compose(name)
    }

    pub fn properties(&self) -> Result<WalletProperties> {
        Ok(WalletProperties {
            wallet_version: WALLET_VERSION.to_string(),
            encrypted: self.keys.is_encrypted(),
            transactions: self.transactions.len()?,
        })
    }
}
