//! Factoid monetary units
//!
//! Every amount in a transaction is an integer count of factoshis, the
//! smallest unit. One FCT is 100,000,000 factoshis, so FCT text always has at
//! most 8 decimal places.
//!
//! Entry credits are whole units and never fractional; the exchange rate
//! quoted by the ledger is in factoshis per entry credit.

use crate::error::{FactomError, Result};

/// Number of factoshis in one FCT
pub const FACTOSHIS_PER_FCT: u64 = 100_000_000;

/// Decimal places carried by FCT text
pub const FCT_DECIMALS: usize = 8;

/// Utility functions for monetary conversions
pub mod conversions {
    use super::*;

    /// Render factoshis as FCT text without trailing zeros
    ///
    /// # Examples
    /// ```
    /// use factom_client::core::monetary::conversions::factoshis_to_fct;
    /// assert_eq!(factoshis_to_fct(100_000_000), "1");
    /// assert_eq!(factoshis_to_fct(150_000_000), "1.5");
    /// assert_eq!(factoshis_to_fct(1), "0.00000001");
    /// ```
    pub fn factoshis_to_fct(factoshis: u64) -> String {
        let whole = factoshis / FACTOSHIS_PER_FCT;
        let fraction = factoshis % FACTOSHIS_PER_FCT;
        if fraction == 0 {
            return whole.to_string();
        }
        let digits = format!("{fraction:0width$}", width = FCT_DECIMALS);
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }

    /// Parse FCT text into factoshis without going through floating point
    ///
    /// # Examples
    /// ```
    /// use factom_client::core::monetary::conversions::fct_to_factoshis;
    /// assert_eq!(fct_to_factoshis("1").unwrap(), 100_000_000);
    /// assert_eq!(fct_to_factoshis("0.99").unwrap(), 99_000_000);
    /// assert!(fct_to_factoshis("0.000000001").is_err());
    /// ```
    pub fn fct_to_factoshis(text: &str) -> Result<u64> {
        let invalid = || FactomError::Transaction(format!("Invalid FCT amount: {text:?}"));
        let text = text.trim();
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > FCT_DECIMALS
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = FCT_DECIMALS);
            padded.parse().map_err(|_| invalid())?
        };

        whole
            .checked_mul(FACTOSHIS_PER_FCT)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(invalid)
    }

    /// Format factoshis with all 8 decimals and the unit
    pub fn format_factoshis(factoshis: u64) -> String {
        format!(
            "{}.{:0width$} FCT",
            factoshis / FACTOSHIS_PER_FCT,
            factoshis % FACTOSHIS_PER_FCT,
            width = FCT_DECIMALS
        )
    }
}
