// bincode 2.0 encoding for records kept in the key store
use crate::error::{FactomError, Result};
use bincode::config::{self, Configuration};
use serde::{Deserialize, Serialize};

const RECORD_CONFIG: Configuration = config::standard();

pub fn serialize<T: Serialize + bincode::Encode>(record: &T) -> Result<Vec<u8>> {
    bincode::encode_to_vec(record, RECORD_CONFIG)
        .map_err(|e| FactomError::Serialization(format!("Failed to encode record: {e}")))
}

/// Decode a stored record. The record must use every byte.
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    let (record, read) = bincode::decode_from_slice(bytes, RECORD_CONFIG)
        .map_err(|e| FactomError::Serialization(format!("Failed to decode record: {e}")))?;
    if read != bytes.len() {
        return Err(FactomError::Serialization(format!(
            "Record has {} trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(record)
}
