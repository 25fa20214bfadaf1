//! Entry-credit pricing
//!
//! Two separate prices live here:
//! - Publishing: an entry costs one entry credit per started KiB of payload
//!   (the 35-byte header is free), a new chain costs ten more.
//! - Value transfer: a Factoid transaction is priced in entry credits from its
//!   signed size and its input/output counts, then converted to factoshis at
//!   the ledger's current exchange rate.

use crate::core::entry::{ENTRY_HEADER_SIZE, MAX_ENTRY_SIZE};
use crate::error::{FactomError, Result};
use log::debug;
use serde::{Deserialize, Serialize};

pub const BYTES_PER_CREDIT: usize = 1024;
/// Extra entry credits charged for creating a chain
pub const CHAIN_CREATION_SURCHARGE: u8 = 10;

/// Entry credits owed for an entry whose canonical encoding is `marshaled_len` bytes
pub fn entry_cost(marshaled_len: usize) -> Result<u8> {
    let payload = marshaled_len.saturating_sub(ENTRY_HEADER_SIZE);
    if payload > MAX_ENTRY_SIZE {
        return Err(FactomError::EntryTooLarge {
            size: payload,
            max: MAX_ENTRY_SIZE,
        });
    }
    let cost = payload.div_ceil(BYTES_PER_CREDIT).max(1);
    // bounded by MAX_ENTRY_SIZE / BYTES_PER_CREDIT
    Ok(cost as u8)
}

pub fn chain_cost(marshaled_len: usize) -> Result<u8> {
    Ok(entry_cost(marshaled_len)? + CHAIN_CREATION_SURCHARGE)
}

/// Entry-credit weights for a Factoid transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Charged per started KiB of the signed transaction
    pub per_kib: u64,
    /// Charged per input (each carries a signature)
    pub per_input: u64,
    /// Charged per Factoid or entry-credit output
    pub per_output: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            per_kib: 1,
            per_input: 10,
            per_output: 1,
        }
    }
}

impl FeeSchedule {
    pub fn entry_credits(
        &self,
        signed_size: usize,
        inputs: usize,
        outputs: usize,
        ec_outputs: usize,
    ) -> u64 {
        let kib = signed_size.div_ceil(BYTES_PER_CREDIT) as u64;
        kib * self.per_kib
            + inputs as u64 * self.per_input
            + (outputs + ec_outputs) as u64 * self.per_output
    }

    /// Fee in factoshis at `rate` factoshis per entry credit
    pub fn transaction_fee(
        &self,
        signed_size: usize,
        inputs: usize,
        outputs: usize,
        ec_outputs: usize,
        rate: u64,
    ) -> Result<u64> {
        let credits = self.entry_credits(signed_size, inputs, outputs, ec_outputs);
        let fee = credits.checked_mul(rate).ok_or_else(|| {
            FactomError::Transaction(format!("Fee overflows: {credits} credits at rate {rate}"))
        })?;
        debug!("Fee for {signed_size} bytes, {inputs} inputs: {credits} EC = {fee} factoshis");
        Ok(fee)
    }
}
