use crate::core::chain::derive_chain_id;
use crate::error::{FactomError, Result};
use crate::utils::hex_serde;
use crate::utils::{sha256_digest, sha512_digest, write_length_prefixed, ByteReader, HASH_LENGTH};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ENTRY_VERSION: u8 = 0;
/// version(1) + chain id(32) + ext id section length(2)
pub const ENTRY_HEADER_SIZE: usize = 1 + HASH_LENGTH + 2;
/// Largest payload (everything after the header) the ledger accepts
pub const MAX_ENTRY_SIZE: usize = 10240;

/// 32-byte chain identifier, hex in every text form
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChainId([u8; HASH_LENGTH]);

impl ChainId {
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> ChainId {
        ChainId(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<ChainId> {
        let array: [u8; HASH_LENGTH] = bytes.try_into().map_err(|_| {
            FactomError::Serialization(format!(
                "Chain ID must be {HASH_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(ChainId(array))
    }

    pub fn from_hex(text: &str) -> Result<ChainId> {
        ChainId::from_slice(&hex::decode(text)?)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.to_hex())
    }
}

impl FromStr for ChainId {
    type Err = FactomError;

    fn from_str(s: &str) -> Result<Self> {
        ChainId::from_hex(s)
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ChainId::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// One record on a chain: ordered external IDs plus opaque content.
///
/// The fields stay public so an entry can be filled in piece by piece before
/// it is committed; its identity is always recomputed from the canonical
/// bytes, never cached.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Entry {
    pub chain_id: ChainId,
    pub ext_ids: Vec<Vec<u8>>,
    pub content: Vec<u8>,
}

impl Entry {
    pub fn new(chain_id: ChainId, content: impl Into<Vec<u8>>, ext_ids: Vec<Vec<u8>>) -> Entry {
        Entry {
            chain_id,
            ext_ids,
            content: content.into(),
        }
    }

    /// Hex chain ID, UTF-8 content and ext IDs
    pub fn from_strings(chain_id: &str, content: &str, ext_ids: &[&str]) -> Result<Entry> {
        Ok(Entry::new(
            ChainId::from_hex(chain_id)?,
            content.as_bytes(),
            ext_ids.iter().map(|e| e.as_bytes().to_vec()).collect(),
        ))
    }

    pub fn from_bytes(chain_id: &[u8], content: &[u8], ext_ids: &[&[u8]]) -> Result<Entry> {
        Ok(Entry::new(
            ChainId::from_slice(chain_id)?,
            content,
            ext_ids.iter().map(|e| e.to_vec()).collect(),
        ))
    }

    /// Canonical encoding:
    /// `0x00 ‖ chain id ‖ u16 ext id section length ‖ (u16 len ‖ ext id)* ‖ content`
    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        let mut ext_section = Vec::new();
        for ext_id in &self.ext_ids {
            write_length_prefixed(&mut ext_section, ext_id)?;
        }

        let mut out =
            Vec::with_capacity(ENTRY_HEADER_SIZE + ext_section.len() + self.content.len());
        out.push(ENTRY_VERSION);
        out.extend_from_slice(self.chain_id.as_bytes());
        write_length_prefixed(&mut out, &ext_section)?;
        out.extend_from_slice(&self.content);
        Ok(out)
    }

    pub fn unmarshal_binary(data: &[u8]) -> Result<Entry> {
        let mut reader = ByteReader::new(data);
        let version = reader.read_u8()?;
        if version != ENTRY_VERSION {
            return Err(FactomError::UnsupportedVersion(version.into()));
        }
        let chain_id = ChainId::new(reader.read_array()?);

        let mut ext_reader = ByteReader::new(reader.read_length_prefixed()?);
        let mut ext_ids = Vec::new();
        while !ext_reader.is_empty() {
            ext_ids.push(ext_reader.read_length_prefixed()?.to_vec());
        }

        Ok(Entry {
            chain_id,
            ext_ids,
            content: reader.rest().to_vec(),
        })
    }

    /// sha256(sha512(data) ‖ data) over the canonical bytes
    pub fn hash(&self) -> Result<[u8; HASH_LENGTH]> {
        Ok(entry_hash(&self.marshal_binary()?))
    }
}

pub fn entry_hash(marshaled: &[u8]) -> [u8; HASH_LENGTH] {
    let mut preimage = Vec::with_capacity(64 + marshaled.len());
    preimage.extend_from_slice(&sha512_digest(marshaled));
    preimage.extend_from_slice(marshaled);
    sha256_digest(&preimage)
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hash() {
            Ok(hash) => writeln!(f, "EntryHash: {}", hex::encode(hash))?,
            Err(e) => writeln!(f, "EntryHash: unavailable ({e})")?,
        }
        writeln!(f, "ChainID: {}", self.chain_id)?;
        for ext_id in &self.ext_ids {
            writeln!(f, "ExtID: {}", String::from_utf8_lossy(ext_id))?;
        }
        writeln!(f, "Content:")?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.content))
    }
}

#[derive(Serialize)]
struct EntryJsonOut<'a> {
    chainid: &'a ChainId,
    #[serde(with = "hex_serde::bytes_list")]
    extids: &'a [Vec<u8>],
    #[serde(with = "hex_serde::bytes")]
    content: &'a [u8],
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        EntryJsonOut {
            chainid: &self.chain_id,
            extids: &self.ext_ids,
            content: &self.content,
        }
        .serialize(serializer)
    }
}

/// The two shapes an entry may arrive in
#[derive(Deserialize)]
#[serde(untagged)]
enum EntryJsonIn {
    /// Chain not yet created: its ID is derived from `ChainName`
    Named {
        #[serde(rename = "ChainName", alias = "chainname", with = "hex_serde::bytes_list")]
        chain_name: Vec<Vec<u8>>,
        #[serde(rename = "ExtIDs", alias = "extids", default, with = "hex_serde::bytes_list")]
        ext_ids: Vec<Vec<u8>>,
        #[serde(rename = "Content", alias = "content", default, with = "hex_serde::bytes")]
        content: Vec<u8>,
    },
    Explicit {
        #[serde(rename = "ChainID", alias = "chainid")]
        chain_id: ChainId,
        #[serde(rename = "ExtIDs", alias = "extids", default, with = "hex_serde::bytes_list")]
        ext_ids: Vec<Vec<u8>>,
        #[serde(rename = "Content", alias = "content", default, with = "hex_serde::bytes")]
        content: Vec<u8>,
    },
}

impl From<EntryJsonIn> for Entry {
    fn from(input: EntryJsonIn) -> Entry {
        match input {
            EntryJsonIn::Named {
                chain_name,
                ext_ids,
                content,
            } => Entry {
                chain_id: derive_chain_id(chain_name.as_slice()),
                ext_ids,
                content,
            },
            EntryJsonIn::Explicit {
                chain_id,
                ext_ids,
                content,
            } => Entry {
                chain_id,
                ext_ids,
                content,
            },
        }
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        EntryJsonIn::deserialize(deserializer).map(Entry::from)
    }
}
