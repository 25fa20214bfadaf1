//! Staking registrations
//!
//! An identity stakes a Factoid or entry-credit address by publishing an
//! entry to the standing-party registration chain. The entry names the
//! identity chain and carries a signature over that chain's ID made with
//! the staked key, so anyone reading the chain can check who controls the
//! address.
//!
//! FCT staking entry external ids:
//! `"StakeFCTAddress" ‖ identity ‖ signature ‖ FA address ‖ public key`
//!
//! EC staking entry external ids:
//! `"StakeECAddress" ‖ identity ‖ signature ‖ EC address`

use crate::address::{verify, Address, AddressKind, EcKey, FactoidKey, Rcd1};
use crate::core::{ChainId, Entry};
use crate::error::{FactomError, Result};
use crate::network::{Ledger, ZERO_HASH};
use crate::utils::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use log::{debug, info};
use std::collections::HashSet;

pub const STANDING_PARTY_REGISTRATION_CHAIN_ID: &str =
    "305dc72e85d46573d3e1c604c30f5f1a086b2ad46b10c330029c66787a82a163";

const STAKE_FCT_TAG: &[u8] = b"StakeFCTAddress";
const STAKE_EC_TAG: &[u8] = b"StakeECAddress";

pub fn registration_chain_id() -> Result<ChainId> {
    ChainId::from_hex(STANDING_PARTY_REGISTRATION_CHAIN_ID)
}

/// Stake a fresh Factoid address for `identity`
pub fn new_fct_staking_entry(identity: &ChainId) -> Result<(Entry, FactoidKey)> {
    let key = FactoidKey::generate()?;
    let entry = fct_staking_entry(identity, &key)?;
    Ok((entry, key))
}

pub fn fct_staking_entry(identity: &ChainId, key: &FactoidKey) -> Result<Entry> {
    let identity_hex = identity.to_hex();
    let signature = key.sign(identity_hex.as_bytes())?;
    let entry = Entry::new(
        registration_chain_id()?,
        Vec::<u8>::new(),
        vec![
            STAKE_FCT_TAG.to_vec(),
            identity_hex.into_bytes(),
            signature.to_vec(),
            key.address().to_string().into_bytes(),
            key.public_key().to_vec(),
        ],
    );
    info!("Built FCT staking entry for {} with {}", identity, key.address());
    Ok(entry)
}

/// Stake a fresh entry-credit address for `identity`
pub fn new_ec_staking_entry(identity: &ChainId) -> Result<(Entry, EcKey)> {
    let key = EcKey::generate()?;
    let entry = ec_staking_entry(identity, &key)?;
    Ok((entry, key))
}

pub fn ec_staking_entry(identity: &ChainId, key: &EcKey) -> Result<Entry> {
    let identity_hex = identity.to_hex();
    let signature = key.sign(identity_hex.as_bytes())?;
    let entry = Entry::new(
        registration_chain_id()?,
        Vec::<u8>::new(),
        vec![
            STAKE_EC_TAG.to_vec(),
            identity_hex.into_bytes(),
            signature.to_vec(),
            key.address().to_string().into_bytes(),
        ],
    );
    info!("Built EC staking entry for {} with {}", identity, key.address());
    Ok(entry)
}

fn public_address(bytes: &[u8], expected: AddressKind) -> Option<Address> {
    let text = std::str::from_utf8(bytes).ok()?;
    let address = Address::decode(text).ok()?;
    (address.kind() == expected).then_some(address)
}

fn identity_matches(entry: &Entry, tag: &[u8], identity: &ChainId, len: usize) -> bool {
    entry.ext_ids.len() == len
        && entry.ext_ids[0] == tag
        && entry.ext_ids[1] == identity.to_hex().as_bytes()
}

/// The FA address must be the RCD of the listed public key, and that key
/// must have signed the identity chain ID
pub fn is_valid_fct_staking_entry(identity: &ChainId, entry: &Entry) -> bool {
    if !identity_matches(entry, STAKE_FCT_TAG, identity, 5) {
        return false;
    }
    let Ok(public_key) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(entry.ext_ids[4].as_slice()) else {
        return false;
    };
    let Some(address) = public_address(&entry.ext_ids[3], AddressKind::FactoidPublic) else {
        return false;
    };
    if !Rcd1::new(public_key).matches(&address) {
        return false;
    }
    let Ok(signature) = <[u8; SIGNATURE_LENGTH]>::try_from(entry.ext_ids[2].as_slice()) else {
        return false;
    };
    verify(&public_key, &entry.ext_ids[1], &signature)
}

pub fn is_valid_ec_staking_entry(identity: &ChainId, entry: &Entry) -> bool {
    if !identity_matches(entry, STAKE_EC_TAG, identity, 4) {
        return false;
    }
    let Some(address) = public_address(&entry.ext_ids[3], AddressKind::EcPublic) else {
        return false;
    };
    let Ok(signature) = <[u8; SIGNATURE_LENGTH]>::try_from(entry.ext_ids[2].as_slice()) else {
        return false;
    };
    verify(address.payload(), &entry.ext_ids[1], &signature)
}

/// EC addresses `identity` had staked in entry blocks up to `height`,
/// oldest first.
///
/// Walks the registration chain back from its head. Blocks recorded above
/// `height` are skipped but still followed. Each step back must land on a
/// lower directory block height, so a chain that links back on itself is
/// reported rather than followed.
pub fn staked_ec_addresses_at_height<L: Ledger + ?Sized>(
    ledger: &L,
    identity: &ChainId,
    height: i64,
) -> Result<Vec<Address>> {
    let head = ledger.chain_head(&registration_chain_id()?)?;
    if head.is_pending() {
        return Err(FactomError::NotFound(
            "Registration chain not yet included in a directory block".to_string(),
        ));
    }

    let mut addresses = Vec::new();
    let mut visited = HashSet::new();
    let mut above: Option<i64> = None;
    let mut key_mr = head.chain_head;
    while !key_mr.is_empty() && key_mr != ZERO_HASH {
        if !visited.insert(key_mr.clone()) {
            return Err(FactomError::InconsistentLedger(format!(
                "Entry block {key_mr} links back to itself"
            )));
        }
        let block = ledger.entry_block(&key_mr)?;
        if let Some(later) = above {
            if block.header.db_height >= later {
                return Err(FactomError::InconsistentLedger(format!(
                    "Entry block {key_mr} at height {} precedes a block at height {later}",
                    block.header.db_height
                )));
            }
        }
        above = Some(block.header.db_height);
        if block.header.db_height <= height {
            let mut in_block: Vec<Address> = ledger
                .entry_block_entries(&key_mr)?
                .iter()
                .filter(|entry| is_valid_ec_staking_entry(identity, entry))
                .filter_map(|entry| public_address(&entry.ext_ids[3], AddressKind::EcPublic))
                .collect();
            debug!(
                "Entry block {key_mr} at height {}: {} staked addresses",
                block.header.db_height,
                in_block.len()
            );
            in_block.append(&mut addresses);
            addresses = in_block;
        }
        key_mr = block.header.prev_key_mr;
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testnet::test_utils::{test_entry, MockLedger, EC_SECRET_1, EC_SECRET_2, FCT_SECRET_1};

    fn identity() -> ChainId {
        ChainId::new([0x88; 32])
    }

    #[test]
    fn test_fct_staking_entry_validates() {
        let key = FactoidKey::from_secret_text(FCT_SECRET_1).unwrap();
        let entry = fct_staking_entry(&identity(), &key).unwrap();
        assert_eq!(entry.chain_id, registration_chain_id().unwrap());
        assert_eq!(entry.ext_ids.len(), 5);
        assert!(is_valid_fct_staking_entry(&identity(), &entry));

        // wrong identity
        assert!(!is_valid_fct_staking_entry(&ChainId::new([1; 32]), &entry));
        // wrong tag
        let mut tampered = entry.clone();
        tampered.ext_ids[0] = b"StakeECAddress".to_vec();
        assert!(!is_valid_fct_staking_entry(&identity(), &tampered));
        // public key that does not redeem the address
        let mut tampered = entry.clone();
        tampered.ext_ids[4] = [7u8; 32].to_vec();
        assert!(!is_valid_fct_staking_entry(&identity(), &tampered));
        // bad signature
        let mut tampered = entry;
        tampered.ext_ids[2][0] ^= 0x01;
        assert!(!is_valid_fct_staking_entry(&identity(), &tampered));
    }

    #[test]
    fn test_ec_staking_entry_validates() {
        let (entry, key) = new_ec_staking_entry(&identity()).unwrap();
        assert!(is_valid_ec_staking_entry(&identity(), &entry));
        assert_eq!(entry.ext_ids[3], key.address().to_string().into_bytes());
        // an FCT staking entry is not an EC one
        let (fct, _) = new_fct_staking_entry(&identity()).unwrap();
        assert!(!is_valid_ec_staking_entry(&identity(), &fct));

        let mut tampered = entry;
        tampered.ext_ids[3] = b"not an address".to_vec();
        assert!(!is_valid_ec_staking_entry(&identity(), &tampered));
    }

    #[test]
    fn test_staked_addresses_walk() {
        let registration = registration_chain_id().unwrap();
        let first = EcKey::from_secret_text(EC_SECRET_1).unwrap();
        let second = EcKey::from_secret_text(EC_SECRET_2).unwrap();
        let late = EcKey::generate().unwrap();
        let other = ChainId::new([0x99; 32]);

        let mut ledger = MockLedger::new();
        ledger.push_block(
            &registration,
            10,
            vec![
                ec_staking_entry(&identity(), &first).unwrap(),
                ec_staking_entry(&other, &late).unwrap(),
                test_entry(),
            ],
        );
        ledger.push_block(
            &registration,
            20,
            vec![ec_staking_entry(&identity(), &second).unwrap()],
        );
        ledger.push_block(
            &registration,
            30,
            vec![ec_staking_entry(&identity(), &late).unwrap()],
        );

        let staked = staked_ec_addresses_at_height(&ledger, &identity(), 25).unwrap();
        assert_eq!(staked, vec![first.address(), second.address()]);

        let all = staked_ec_addresses_at_height(&ledger, &identity(), 30).unwrap();
        assert_eq!(all.len(), 3);
        assert!(staked_ec_addresses_at_height(&ledger, &identity(), 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_looping_registration_chain_is_rejected() {
        let registration = registration_chain_id().unwrap();
        let key = EcKey::from_secret_text(EC_SECRET_1).unwrap();

        let mut ledger = MockLedger::new();
        let oldest = ledger.push_block(
            &registration,
            10,
            vec![ec_staking_entry(&identity(), &key).unwrap()],
        );
        let newest = ledger.push_block(&registration, 20, vec![]);
        ledger.relink(&oldest, &newest);
        assert!(matches!(
            staked_ec_addresses_at_height(&ledger, &identity(), 30),
            Err(FactomError::InconsistentLedger(_))
        ));

        // a self link is caught on the second visit
        let mut ledger = MockLedger::new();
        let only = ledger.push_block(&registration, 10, vec![]);
        ledger.relink(&only, &only);
        assert!(matches!(
            staked_ec_addresses_at_height(&ledger, &identity(), 30),
            Err(FactomError::InconsistentLedger(_))
        ));
    }

    #[test]
    fn test_height_must_fall_walking_back() {
        let registration = registration_chain_id().unwrap();
        let mut ledger = MockLedger::new();
        ledger.push_block(&registration, 20, vec![]);
        ledger.push_block(&registration, 20, vec![]);
        assert!(matches!(
            staked_ec_addresses_at_height(&ledger, &identity(), 30),
            Err(FactomError::InconsistentLedger(_))
        ));
    }

    #[test]
    fn test_pending_or_missing_registration_chain() {
        let mut ledger = MockLedger::new();
        assert!(matches!(
            staked_ec_addresses_at_height(&ledger, &identity(), 10),
            Err(FactomError::NotFound(_))
        ));
        ledger.mark_pending(&registration_chain_id().unwrap());
        assert!(matches!(
            staked_ec_addresses_at_height(&ledger, &identity(), 10),
            Err(FactomError::NotFound(_))
        ));
    }
}
