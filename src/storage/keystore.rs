use crate::address::mnemonic::{
    ec_key_from_seed, factoid_key_from_seed, mnemonic_from_entropy, seed_from_mnemonic,
};
use crate::address::{Address, EcKey, FactoidKey, SecretKey, MNEMONIC_ENTROPY_LENGTH};
use crate::error::{FactomError, Result};
use crate::storage::encrypted::{
    derive_key_from_password, generate_salt, Aes256GcmCipher, EncryptionResult,
};
use crate::utils::{deserialize, new_seed, serialize, SEED_LENGTH};
use log::info;
use serde::{Deserialize, Serialize};
use sled::{Batch, Db, Tree};
use std::path::Path;
use zeroize::{ZeroizeOnDrop, Zeroizing};

const FACTOID_TREE: &str = "factoid_keys";
const EC_TREE: &str = "ec_keys";
const META_TREE: &str = "meta";
const SALT_KEY: &[u8] = b"kdf_salt";
const CHECK_KEY: &[u8] = b"password_check";
const WALLET_SEED_KEY: &[u8] = b"wallet_seed";
const FACTOID_INDEX_KEY: &[u8] = b"next_factoid_index";
const EC_INDEX_KEY: &[u8] = b"next_ec_index";
const PASSWORD_CHECK: &[u8] = b"factom key store";

/// One secret seed as written to disk; `nonce` is empty when unencrypted
#[derive(Serialize, Deserialize, bincode::Encode, bincode::Decode, ZeroizeOnDrop)]
struct StoredKey {
    seed: Vec<u8>,
    nonce: Vec<u8>,
}

fn seal_with(cipher: Option<&Aes256GcmCipher>, secret: &[u8]) -> Result<StoredKey> {
    match cipher {
        Some(cipher) => {
            let sealed = cipher.encrypt(secret)?;
            Ok(StoredKey {
                seed: sealed.ciphertext.clone(),
                nonce: sealed.nonce.clone(),
            })
        }
        None => Ok(StoredKey {
            seed: secret.to_vec(),
            nonce: Vec::new(),
        }),
    }
}

fn read_index(bytes: &[u8]) -> Option<u32> {
    bytes.try_into().ok().map(u32::from_be_bytes)
}

/// Secret keys indexed by their public address text.
///
/// Backed by sled, one tree per address family. When opened with a password
/// every seed is sealed with AES-256-GCM under an Argon2id key; the salt and
/// a sealed check value live in the `meta` tree.
///
/// The `meta` tree also holds the wallet seed that generated keys derive
/// from, and one derivation counter per family. A store gets its seed the
/// first time it is opened, in the same batch as its encryption records.
pub struct KeyStore {
    db: Db,
    cipher: Option<Aes256GcmCipher>,
}

impl KeyStore {
    pub fn open(path: &Path, password: Option<&str>) -> Result<KeyStore> {
        let db = sled::open(path).map_err(|e| {
            FactomError::Database(format!("Failed to open key store at {}: {e}", path.display()))
        })?;
        KeyStore::from_db(db, password)
    }

    /// Throwaway store that disappears when dropped
    pub fn temporary(password: Option<&str>) -> Result<KeyStore> {
        let db = sled::Config::new().temporary(true).open()?;
        KeyStore::from_db(db, password)
    }

    fn from_db(db: Db, password: Option<&str>) -> Result<KeyStore> {
        let meta = db.open_tree(META_TREE)?;
        let mut init = Batch::default();
        let cipher = match (meta.get(SALT_KEY)?, password) {
            (None, None) => None,
            (Some(_), None) => {
                return Err(FactomError::Encryption(
                    "Key store is encrypted; a password is required".to_string(),
                ))
            }
            (None, Some(password)) => {
                let has_keys = !db.open_tree(FACTOID_TREE)?.is_empty()
                    || !db.open_tree(EC_TREE)?.is_empty();
                if has_keys {
                    return Err(FactomError::Encryption(
                        "Key store already holds unencrypted keys".to_string(),
                    ));
                }
                let salt = generate_salt();
                let cipher = Aes256GcmCipher::new(&derive_key_from_password(password, &salt)?)?;
                let check = cipher.encrypt(PASSWORD_CHECK)?;
                init.insert(SALT_KEY, salt);
                init.insert(CHECK_KEY, serialize(&check)?);
                // a seed written before encryption was turned on is resealed
                if let Some(bytes) = meta.get(WALLET_SEED_KEY)? {
                    let stored: StoredKey = deserialize(&bytes)?;
                    let resealed = seal_with(Some(&cipher), &stored.seed)?;
                    init.insert(WALLET_SEED_KEY, serialize(&resealed)?);
                }
                Some(cipher)
            }
            (Some(salt), Some(password)) => {
                let cipher = Aes256GcmCipher::new(&derive_key_from_password(password, &salt)?)?;
                let check = meta.get(CHECK_KEY)?.ok_or_else(|| {
                    FactomError::Database("Encrypted key store has no password check".to_string())
                })?;
                let check: EncryptionResult = deserialize(&check)?;
                match cipher.decrypt(&check) {
                    Ok(plain) if plain == PASSWORD_CHECK => {}
                    _ => {
                        return Err(FactomError::Encryption(
                            "Wrong key store password".to_string(),
                        ))
                    }
                }
                Some(cipher)
            }
        };

        if !meta.contains_key(WALLET_SEED_KEY)? {
            let entropy = Zeroizing::new(new_seed()?);
            let stored = seal_with(cipher.as_ref(), &entropy[..MNEMONIC_ENTROPY_LENGTH])?;
            init.insert(WALLET_SEED_KEY, serialize(&stored)?);
            info!("Created wallet seed");
        }
        meta.apply_batch(init)?;
        db.flush()?;

        let store = KeyStore { db, cipher };
        info!(
            "Opened key store with {} factoid and {} EC keys (encrypted: {})",
            store.tree(FACTOID_TREE)?.len(),
            store.tree(EC_TREE)?.len(),
            store.is_encrypted()
        );
        Ok(store)
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    fn tree(&self, name: &str) -> Result<Tree> {
        self.db
            .open_tree(name)
            .map_err(|e| FactomError::Database(format!("Failed to open {name} tree: {e}")))
    }

    fn seal(&self, secret: &SecretKey) -> Result<StoredKey> {
        seal_with(self.cipher.as_ref(), secret.as_bytes())
    }

    fn unseal_bytes(&self, stored: &StoredKey) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(match &self.cipher {
            Some(cipher) => cipher.decrypt(&EncryptionResult {
                ciphertext: stored.seed.clone(),
                nonce: stored.nonce.clone(),
            })?,
            None => stored.seed.clone(),
        }))
    }

    fn unseal(&self, stored: &StoredKey) -> Result<SecretKey> {
        let plain = self.unseal_bytes(stored)?;
        let seed: [u8; SEED_LENGTH] = plain.as_slice().try_into().map_err(|_| {
            FactomError::Database(format!("Stored seed has {} bytes", plain.len()))
        })?;
        Ok(SecretKey::from_seed(seed))
    }

    fn put(&self, tree: &str, public: &Address, secret: &SecretKey) -> Result<()> {
        let record = serialize(&self.seal(secret)?)?;
        self.tree(tree)?.insert(public.to_string().as_bytes(), record)?;
        self.db.flush()?;
        Ok(())
    }

    fn get(&self, tree: &str, public: &Address) -> Result<Option<SecretKey>> {
        match self.tree(tree)?.get(public.to_string().as_bytes())? {
            Some(bytes) => {
                let stored: StoredKey = deserialize(&bytes)?;
                Ok(Some(self.unseal(&stored)?))
            }
            None => Ok(None),
        }
    }

    fn all(&self, tree: &str) -> Result<Vec<SecretKey>> {
        let mut secrets = Vec::new();
        for item in self.tree(tree)?.iter() {
            let (_, bytes) = item?;
            let stored: StoredKey = deserialize(&bytes)?;
            secrets.push(self.unseal(&stored)?);
        }
        Ok(secrets)
    }

    pub fn insert_factoid(&self, key: &FactoidKey) -> Result<()> {
        self.put(FACTOID_TREE, &key.address(), key.secret())
    }

    pub fn insert_ec(&self, key: &EcKey) -> Result<()> {
        self.put(EC_TREE, &key.address(), key.secret())
    }

    pub fn factoid_key(&self, address: &Address) -> Result<Option<FactoidKey>> {
        self.get(FACTOID_TREE, address)?
            .map(FactoidKey::from_secret)
            .transpose()
    }

    pub fn ec_key(&self, address: &Address) -> Result<Option<EcKey>> {
        self.get(EC_TREE, address)?.map(EcKey::from_secret).transpose()
    }

    /// Ordered by address text
    pub fn factoid_keys(&self) -> Result<Vec<FactoidKey>> {
        self.all(FACTOID_TREE)?
            .into_iter()
            .map(FactoidKey::from_secret)
            .collect()
    }

    pub fn ec_keys(&self) -> Result<Vec<EcKey>> {
        self.all(EC_TREE)?.into_iter().map(EcKey::from_secret).collect()
    }

    /// Recovery phrase of the wallet seed
    pub fn wallet_mnemonic(&self) -> Result<Zeroizing<String>> {
        let bytes = self.tree(META_TREE)?.get(WALLET_SEED_KEY)?.ok_or_else(|| {
            FactomError::Database("Key store has no wallet seed".to_string())
        })?;
        let stored: StoredKey = deserialize(&bytes)?;
        mnemonic_from_entropy(&self.unseal_bytes(&stored)?)
    }

    /// Claim the next derivation index under `counter`
    fn next_index(&self, counter: &[u8]) -> Result<u32> {
        let previous = self.tree(META_TREE)?.fetch_and_update(counter, |old| {
            let next = old.and_then(read_index).unwrap_or(0).saturating_add(1);
            Some(next.to_be_bytes().to_vec())
        })?;
        Ok(previous.as_deref().and_then(read_index).unwrap_or(0))
    }

    /// Derive the next Factoid key from the wallet seed and store it
    pub fn next_factoid_key(&self) -> Result<FactoidKey> {
        let seed = seed_from_mnemonic(&self.wallet_mnemonic()?)?;
        let key = factoid_key_from_seed(seed.as_slice(), self.next_index(FACTOID_INDEX_KEY)?)?;
        self.insert_factoid(&key)?;
        Ok(key)
    }

    pub fn next_ec_key(&self) -> Result<EcKey> {
        let seed = seed_from_mnemonic(&self.wallet_mnemonic()?)?;
        let key = ec_key_from_seed(seed.as_slice(), self.next_index(EC_INDEX_KEY)?)?;
        self.insert_ec(&key)?;
        Ok(key)
    }
}
