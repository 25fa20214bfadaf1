use crate::core::entry::{ChainId, Entry};
use crate::utils::{sha256_digest, HASH_LENGTH};
use log::debug;

/// sha256 over the concatenated sha256 of every ext ID, in order.
/// Content never takes part, so entries sharing ext IDs share a chain.
pub fn derive_chain_id<T: AsRef<[u8]>>(ext_ids: &[T]) -> ChainId {
    let mut digests = Vec::with_capacity(ext_ids.len() * HASH_LENGTH);
    for ext_id in ext_ids {
        digests.extend_from_slice(&sha256_digest(ext_id.as_ref()));
    }
    ChainId::new(sha256_digest(&digests))
}

/// A new chain and the entry that opens it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    pub chain_id: ChainId,
    pub first_entry: Entry,
}

impl Chain {
    /// Binds a copy of `entry` to the chain ID derived from its ext IDs
    pub fn new(entry: &Entry) -> Chain {
        let chain_id = derive_chain_id(entry.ext_ids.as_slice());
        let mut first_entry = entry.clone();
        first_entry.chain_id = chain_id;
        debug!("Derived chain {chain_id} from {} ext IDs", entry.ext_ids.len());
        Chain {
            chain_id,
            first_entry,
        }
    }

    pub fn from_strings(content: &str, ext_ids: &[&str]) -> Chain {
        Chain::new(&Entry::new(
            ChainId::default(),
            content.as_bytes(),
            ext_ids.iter().map(|e| e.as_bytes().to_vec()).collect(),
        ))
    }

    pub fn from_bytes(content: &[u8], ext_ids: &[&[u8]]) -> Chain {
        Chain::new(&Entry::new(
            ChainId::default(),
            content,
            ext_ids.iter().map(|e| e.to_vec()).collect(),
        ))
    }
}
