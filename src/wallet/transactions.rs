use crate::address::{Address, FactoidKey};
use crate::core::Transaction;
use crate::error::{FactomError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

/// Where a named transaction sits in its build cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxState {
    Draft,
    Signed,
    Composed,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxState::Draft => "draft",
            TxState::Signed => "signed",
            TxState::Composed => "composed",
        };
        write!(f, "{name}")
    }
}

/// Snapshot of one named transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    pub name: String,
    pub state: TxState,
    pub transaction: Transaction,
}

/// ( K -> name, V => transaction under its own lock )
///
/// The outer lock only guards the name table. Work on one name holds that
/// name's mutex, so edits to one draft are serialized while different
/// drafts proceed in parallel. A rejected edit leaves the draft untouched.
pub struct TransactionStore {
    inner: RwLock<HashMap<String, Arc<Mutex<TxRecord>>>>,
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(what: &str) -> FactomError {
    FactomError::Transaction(format!("Transaction store {what} lock poisoned"))
}

impl TransactionStore {
    pub fn new() -> TransactionStore {
        TransactionStore {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn slot(&self, name: &str) -> Result<Arc<Mutex<TxRecord>>> {
        let table = self.inner.read().map_err(|_| poisoned("table"))?;
        table
            .get(name)
            .cloned()
            .ok_or_else(|| FactomError::NotFound(format!("Transaction {name} does not exist")))
    }

    pub fn create(&self, name: &str) -> Result<TxRecord> {
        self.insert(name, Transaction::new_now()?)
    }

    /// Start a named draft from an existing transaction
    pub fn insert(&self, name: &str, transaction: Transaction) -> Result<TxRecord> {
        let mut table = self.inner.write().map_err(|_| poisoned("table"))?;
        if table.contains_key(name) {
            return Err(FactomError::Transaction(format!(
                "Transaction {name} already exists"
            )));
        }
        let record = TxRecord {
            name: name.to_string(),
            state: TxState::Draft,
            transaction,
        };
        table.insert(name.to_string(), Arc::new(Mutex::new(record.clone())));
        debug!("Created transaction {name}");
        Ok(record)
    }

    pub fn delete(&self, name: &str) -> Result<TxRecord> {
        let mut table = self.inner.write().map_err(|_| poisoned("table"))?;
        let slot = table
            .remove(name)
            .ok_or_else(|| FactomError::NotFound(format!("Transaction {name} does not exist")))?;
        let record = slot.lock().map_err(|_| poisoned(name))?.clone();
        debug!("Deleted transaction {name}");
        Ok(record)
    }

    pub fn get(&self, name: &str) -> Result<TxRecord> {
        let slot = self.slot(name)?;
        let record = slot.lock().map_err(|_| poisoned(name))?;
        Ok(record.clone())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        let table = self.inner.read().map_err(|_| poisoned("table"))?;
        Ok(table.contains_key(name))
    }

    /// Every transaction, ordered by name
    pub fn list(&self) -> Result<Vec<TxRecord>> {
        let slots: Vec<_> = {
            let table = self.inner.read().map_err(|_| poisoned("table"))?;
            table.values().cloned().collect()
        };
        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            records.push(slot.lock().map_err(|_| poisoned("record"))?.clone());
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.read().map_err(|_| poisoned("table"))?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Apply an edit to a copy of the named transaction and keep it only if
    /// the edit succeeds. Any accepted edit returns the transaction to draft.
    ///
    /// Returns the edit's value with the record as the edit left it, read
    /// before any other edit to the same name can land.
    pub fn mutate<F, R>(&self, name: &str, edit: F) -> Result<(R, TxRecord)>
    where
        F: FnOnce(&mut Transaction) -> Result<R>,
    {
        let slot = self.slot(name)?;
        let mut record = slot.lock().map_err(|_| poisoned(name))?;
        let mut next = record.transaction.clone();
        match edit(&mut next) {
            Ok(value) => {
                if record.state != TxState::Draft {
                    debug!("Transaction {name} back to draft from {}", record.state);
                }
                record.transaction = next;
                record.state = TxState::Draft;
                Ok((value, record.clone()))
            }
            Err(e) => {
                warn!("Rejected change to transaction {name}: {e}");
                Err(e)
            }
        }
    }

    pub fn sign<F>(&self, name: &str, find_key: F) -> Result<TxRecord>
    where
        F: FnMut(&Address) -> Result<Option<FactoidKey>>,
    {
        let slot = self.slot(name)?;
        let mut record = slot.lock().map_err(|_| poisoned(name))?;
        if record.state == TxState::Composed {
            return Err(FactomError::Transaction(format!(
                "Transaction {name} is already composed"
            )));
        }
        let mut next = record.transaction.clone();
        next.sign(find_key)?;
        record.transaction = next;
        record.state = TxState::Signed;
        debug!("Signed transaction {name}");
        Ok(record.clone())
    }

    /// Composed binary form of a signed transaction
    pub fn compose(&self, name: &str) -> Result<Vec<u8>> {
        let slot = self.slot(name)?;
        let mut record = slot.lock().map_err(|_| poisoned(name))?;
        if record.state == TxState::Draft {
            return Err(FactomError::Transaction(format!(
                "Transaction {name} must be signed before composing"
            )));
        }
        let bytes = record.transaction.marshal_binary()?;
        record.state = TxState::Composed;
        debug!("Composed transaction {name} ({} bytes)", bytes.len());
        Ok(bytes)
    }
}
