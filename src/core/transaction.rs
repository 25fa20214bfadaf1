use crate::address::{Address, AddressKind, FactoidKey, Rcd1, RCD_1_LEN};
use crate::core::fees::FeeSchedule;
use crate::core::monetary::conversions::factoshis_to_fct;
use crate::error::{FactomError, Result};
use crate::utils::{
    current_timestamp_millis, ed25519_verify, encode_varint, milli_timestamp_bytes,
    sha256_digest, ByteReader, HASH_LENGTH, SIGNATURE_LENGTH, TIMESTAMP_LENGTH,
};
use log::debug;
use std::fmt;

pub const TRANSACTION_VERSION: u64 = 2;
/// Bytes one input adds once signed: its RCD plus the signature
pub const SIGNED_INPUT_LEN: usize = RCD_1_LEN + SIGNATURE_LENGTH;
/// Inputs, outputs and EC outputs are each counted in a single byte
pub const MAX_SLOT_COUNT: usize = u8::MAX as usize;
/// Fee balancing re-prices until amounts stop moving; size only shifts
/// across a KiB boundary a bounded number of times
const MAX_FEE_PASSES: usize = 8;

/// One amount paid into or out of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxAmount {
    pub address: Address,
    pub amount: u64,
}

/// Redeem condition revealed for one input, with its signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RcdSignature {
    pub rcd: Rcd1,
    pub signature: [u8; SIGNATURE_LENGTH],
}

/// Factoid value transfer.
///
/// Inputs and outputs pay to Factoid public addresses, EC outputs buy entry
/// credits for EC public addresses. Signatures line up with inputs by
/// position. Every mutation drops them, so a transaction can only be signed
/// as a whole and never partially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    timestamp_millis: u64,
    inputs: Vec<TxAmount>,
    outputs: Vec<TxAmount>,
    ec_outputs: Vec<TxAmount>,
    signatures: Vec<RcdSignature>,
}

fn check_slot(address: &Address, expected: AddressKind) -> Result<()> {
    if address.kind() != expected {
        return Err(FactomError::InvalidAddress(format!(
            "{} is a {} address, expected {expected}",
            address,
            address.kind()
        )));
    }
    Ok(())
}

fn sum(slots: &[TxAmount]) -> Result<u64> {
    slots.iter().try_fold(0u64, |acc, slot| {
        acc.checked_add(slot.amount)
            .ok_or_else(|| FactomError::Transaction("Amount total overflows".to_string()))
    })
}

fn remove_all(slots: &mut Vec<TxAmount>, address: &Address) -> Result<()> {
    let before = slots.len();
    slots.retain(|slot| slot.address != *address);
    if slots.len() == before {
        return Err(FactomError::NotFound(format!(
            "{address} is not in the transaction"
        )));
    }
    Ok(())
}

fn count_byte(len: usize, what: &str) -> Result<u8> {
    u8::try_from(len).map_err(|_| {
        FactomError::Transaction(format!("Too many {what}: {len}, maximum {MAX_SLOT_COUNT}"))
    })
}

fn unsettled_fee(passes: usize) -> FactomError {
    FactomError::Transaction(format!("Fee did not settle after {passes} passes"))
}

fn write_slots(out: &mut Vec<u8>, slots: &[TxAmount]) {
    for slot in slots {
        encode_varint(out, slot.amount);
        out.extend_from_slice(slot.address.payload());
    }
}

fn read_slots(
    reader: &mut ByteReader<'_>,
    count: u8,
    kind: AddressKind,
) -> Result<Vec<TxAmount>> {
    let mut slots = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let amount = reader.read_varint()?;
        let address = Address::new(kind, reader.read_array()?);
        slots.push(TxAmount { address, amount });
    }
    Ok(slots)
}

impl Transaction {
    pub fn new(timestamp_millis: u64) -> Transaction {
        Transaction {
            timestamp_millis,
            inputs: Vec::new(),
            outputs: Vec::new(),
            ec_outputs: Vec::new(),
            signatures: Vec::new(),
        }
    }

    /// Empty transaction stamped with the current clock
    pub fn new_now() -> Result<Transaction> {
        Ok(Transaction::new(current_timestamp_millis()?))
    }

    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp_millis
    }

    pub fn inputs(&self) -> &[TxAmount] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxAmount] {
        &self.outputs
    }

    pub fn ec_outputs(&self) -> &[TxAmount] {
        &self.ec_outputs
    }

    pub fn signatures(&self) -> &[RcdSignature] {
        &self.signatures
    }

    /// Every input carries a signature
    pub fn is_signed(&self) -> bool {
        !self.inputs.is_empty() && self.signatures.len() == self.inputs.len()
    }

    fn invalidate(&mut self) {
        if !self.signatures.is_empty() {
            debug!("Dropping {} signatures after mutation", self.signatures.len());
        }
        self.signatures.clear();
    }

    pub fn add_input(&mut self, address: Address, amount: u64) -> Result<()> {
        check_slot(&address, AddressKind::FactoidPublic)?;
        self.invalidate();
        self.inputs.push(TxAmount { address, amount });
        Ok(())
    }

    pub fn add_output(&mut self, address: Address, amount: u64) -> Result<()> {
        check_slot(&address, AddressKind::FactoidPublic)?;
        self.invalidate();
        self.outputs.push(TxAmount { address, amount });
        Ok(())
    }

    pub fn add_ec_output(&mut self, address: Address, amount: u64) -> Result<()> {
        check_slot(&address, AddressKind::EcPublic)?;
        self.invalidate();
        self.ec_outputs.push(TxAmount { address, amount });
        Ok(())
    }

    /// Removes every input paying from `address`
    pub fn remove_input(&mut self, address: &Address) -> Result<()> {
        remove_all(&mut self.inputs, address)?;
        self.invalidate();
        Ok(())
    }

    pub fn remove_output(&mut self, address: &Address) -> Result<()> {
        remove_all(&mut self.outputs, address)?;
        self.invalidate();
        Ok(())
    }

    pub fn remove_ec_output(&mut self, address: &Address) -> Result<()> {
        remove_all(&mut self.ec_outputs, address)?;
        self.invalidate();
        Ok(())
    }

    pub fn total_inputs(&self) -> Result<u64> {
        sum(&self.inputs)
    }

    pub fn total_outputs(&self) -> Result<u64> {
        sum(&self.outputs)
    }

    pub fn total_ec_outputs(&self) -> Result<u64> {
        sum(&self.ec_outputs)
    }

    /// The bytes every input signs, and the preimage of the transaction ID
    pub fn unsigned_bytes(&self) -> Result<Vec<u8>> {
        let n_in = count_byte(self.inputs.len(), "inputs")?;
        let n_out = count_byte(self.outputs.len(), "outputs")?;
        let n_ec = count_byte(self.ec_outputs.len(), "EC outputs")?;

        let mut out = Vec::new();
        encode_varint(&mut out, TRANSACTION_VERSION);
        out.extend_from_slice(&milli_timestamp_bytes(self.timestamp_millis));
        out.extend_from_slice(&[n_in, n_out, n_ec]);
        write_slots(&mut out, &self.inputs);
        write_slots(&mut out, &self.outputs);
        write_slots(&mut out, &self.ec_outputs);
        Ok(out)
    }

    /// Unsigned form followed by whatever RCD/signature pairs are attached
    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        let mut out = self.unsigned_bytes()?;
        for signed in &self.signatures {
            out.extend_from_slice(&signed.rcd.to_bytes());
            out.extend_from_slice(&signed.signature);
        }
        Ok(out)
    }

    pub fn unmarshal_binary(data: &[u8]) -> Result<Transaction> {
        let mut reader = ByteReader::new(data);
        let version = reader.read_varint()?;
        if version != TRANSACTION_VERSION {
            return Err(FactomError::UnsupportedVersion(version));
        }

        let mut ts = [0u8; 8];
        ts[8 - TIMESTAMP_LENGTH..].copy_from_slice(reader.read_bytes(TIMESTAMP_LENGTH)?);
        let n_in = reader.read_u8()?;
        let n_out = reader.read_u8()?;
        let n_ec = reader.read_u8()?;

        let mut tx = Transaction::new(u64::from_be_bytes(ts));
        tx.inputs = read_slots(&mut reader, n_in, AddressKind::FactoidPublic)?;
        tx.outputs = read_slots(&mut reader, n_out, AddressKind::FactoidPublic)?;
        tx.ec_outputs = read_slots(&mut reader, n_ec, AddressKind::EcPublic)?;

        if !reader.is_empty() {
            for _ in 0..n_in {
                let rcd = Rcd1::read_from(&mut reader)?;
                let signature = reader.read_array()?;
                tx.signatures.push(RcdSignature { rcd, signature });
            }
        }
        if !reader.is_empty() {
            return Err(FactomError::Serialization(format!(
                "{} trailing bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// sha256 of the unsigned form
    pub fn txid(&self) -> Result<[u8; HASH_LENGTH]> {
        Ok(sha256_digest(&self.unsigned_bytes()?))
    }

    /// Size once every input is signed, whether or not it is yet
    pub fn signed_size(&self) -> Result<usize> {
        Ok(self.unsigned_bytes()?.len() + self.inputs.len() * SIGNED_INPUT_LEN)
    }

    /// Fee in factoshis at `rate` factoshis per entry credit
    pub fn fee(&self, rate: u64, schedule: &FeeSchedule) -> Result<u64> {
        schedule.transaction_fee(
            self.signed_size()?,
            self.inputs.len(),
            self.outputs.len(),
            self.ec_outputs.len(),
            rate,
        )
    }

    /// Raise or lower the input paying from `address` so that inputs cover
    /// outputs, EC outputs and the fee exactly. Returns the fee.
    pub fn add_fee(&mut self, address: &Address, rate: u64, schedule: &FeeSchedule) -> Result<u64> {
        self.add_fee_within(address, rate, schedule, MAX_FEE_PASSES)
    }

    fn add_fee_within(
        &mut self,
        address: &Address,
        rate: u64,
        schedule: &FeeSchedule,
        passes: usize,
    ) -> Result<u64> {
        let mut next = self.clone();
        let index = next
            .inputs
            .iter()
            .position(|slot| slot.address == *address)
            .ok_or_else(|| FactomError::NotFound(format!("{address} is not an input")))?;

        let spent = next.total_outputs()?.checked_add(next.total_ec_outputs()?);
        let spent = spent.ok_or_else(|| FactomError::Transaction("Output total overflows".into()))?;
        let others = next.total_inputs()? - next.inputs[index].amount;

        for _ in 0..passes {
            let fee = next.fee(rate, schedule)?;
            let required = spent.checked_add(fee).ok_or_else(|| {
                FactomError::Transaction("Outputs plus fee overflow".to_string())
            })?;
            if others > required {
                return Err(FactomError::Transaction(format!(
                    "Other inputs already provide {others}, more than the {required} required"
                )));
            }
            let amount = required - others;
            if next.inputs[index].amount == amount {
                next.invalidate();
                *self = next;
                return Ok(fee);
            }
            next.inputs[index].amount = amount;
        }
        Err(unsettled_fee(passes))
    }

    /// Take the fee out of the output paying to `address` so that inputs
    /// equal outputs, EC outputs and the fee exactly. Returns the fee.
    pub fn sub_fee(&mut self, address: &Address, rate: u64, schedule: &FeeSchedule) -> Result<u64> {
        self.sub_fee_within(address, rate, schedule, MAX_FEE_PASSES)
    }

    fn sub_fee_within(
        &mut self,
        address: &Address,
        rate: u64,
        schedule: &FeeSchedule,
        passes: usize,
    ) -> Result<u64> {
        let mut next = self.clone();
        let index = next
            .outputs
            .iter()
            .position(|slot| slot.address == *address)
            .ok_or_else(|| FactomError::NotFound(format!("{address} is not an output")))?;

        let available = next.total_inputs()?;
        let others = (next.total_outputs()? - next.outputs[index].amount)
            .checked_add(next.total_ec_outputs()?)
            .ok_or_else(|| FactomError::Transaction("Output total overflows".to_string()))?;

        for _ in 0..passes {
            let fee = next.fee(rate, schedule)?;
            let required = others.checked_add(fee).ok_or_else(|| {
                FactomError::Transaction("Outputs plus fee overflow".to_string())
            })?;
            if available < required {
                return Err(FactomError::InsufficientFunds {
                    required,
                    available,
                });
            }
            let amount = available - required;
            if next.outputs[index].amount == amount {
                next.invalidate();
                *self = next;
                return Ok(fee);
            }
            next.outputs[index].amount = amount;
        }
        Err(unsettled_fee(passes))
    }

    /// Sign every input with the key `find_key` returns for its address.
    ///
    /// Nothing is attached unless every input can be signed.
    pub fn sign<F>(&mut self, mut find_key: F) -> Result<()>
    where
        F: FnMut(&Address) -> Result<Option<FactoidKey>>,
    {
        if self.inputs.is_empty() {
            return Err(FactomError::NotSignable("transaction has no inputs".to_string()));
        }
        if self.outputs.is_empty() && self.ec_outputs.is_empty() {
            return Err(FactomError::NotSignable("transaction has no outputs".to_string()));
        }

        let message = self.unsigned_bytes()?;
        let mut signatures = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let key = find_key(&input.address)?.ok_or_else(|| {
                FactomError::NotSignable(format!("no secret key for {}", input.address))
            })?;
            let rcd = key.rcd();
            if !rcd.matches(&input.address) {
                return Err(FactomError::NotSignable(format!(
                    "key does not redeem {}",
                    input.address
                )));
            }
            signatures.push(RcdSignature {
                rcd,
                signature: key.sign(&message)?,
            });
        }

        self.signatures = signatures;
        debug!("Signed {} inputs", self.signatures.len());
        Ok(())
    }

    /// Check every RCD against its input address and every signature
    /// against the unsigned form
    pub fn verify_signatures(&self) -> Result<()> {
        if !self.is_signed() {
            return Err(FactomError::NotSignable(format!(
                "{} signatures for {} inputs",
                self.signatures.len(),
                self.inputs.len()
            )));
        }
        let message = self.unsigned_bytes()?;
        for (i, (input, signed)) in self.inputs.iter().zip(&self.signatures).enumerate() {
            if !signed.rcd.matches(&input.address) {
                return Err(FactomError::InvalidKey(format!(
                    "RCD {i} does not match input {}",
                    input.address
                )));
            }
            if !ed25519_verify(signed.rcd.public_key(), &message, &signed.signature) {
                return Err(FactomError::InvalidKey(format!(
                    "signature {i} does not verify"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.txid() {
            Ok(txid) => writeln!(f, "TxID: {}", hex::encode(txid))?,
            Err(e) => writeln!(f, "TxID: unavailable ({e})")?,
        }
        writeln!(f, "Timestamp: {}", self.timestamp_millis)?;
        for slot in &self.inputs {
            writeln!(f, "Input: {} {}", slot.address, factoshis_to_fct(slot.amount))?;
        }
        for slot in &self.outputs {
            writeln!(f, "Output: {} {}", slot.address, factoshis_to_fct(slot.amount))?;
        }
        for slot in &self.ec_outputs {
            writeln!(f, "ECOutput: {} {}", slot.address, factoshis_to_fct(slot.amount))?;
        }
        writeln!(f, "Signatures: {}/{}", self.signatures.len(), self.inputs.len())
    }
}
