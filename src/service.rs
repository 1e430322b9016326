//! Creating and retrieving stored key pairs.
//!
//! The plaintext sealed for every record is
//! `ENCRYPTION_TAG + SEPARATOR + hex(private key)`. After decryption the
//! tag prefix is checked before the key is trusted, so a cipher that hands
//! back garbage for a wrong password is still detected.

use crate::config::VaultConfig;
use crate::crypto::encryption::{Cipher, PasswordCipher};
use crate::crypto::secp256k1::{generate_keypair, KeyPair};
use crate::error::{KeyLedgerError, Result};
use crate::storage::record::validate_heading;
use crate::storage::{RecordStore, VaultFile};
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Sentinel prefix of every sealed plaintext.
pub const ENCRYPTION_TAG: &str = "KEYLEDGER";

/// Separates the tag from the private key hex.
pub const SEPARATOR: &str = "|";

/// Orchestrates key generation, encryption and vault storage.
#[derive(Debug, Clone)]
pub struct VaultService<S = VaultFile, C = PasswordCipher> {
    store: S,
    cipher: C,
}

impl VaultService {
    /// Service over the file vault described by `config`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use keyledger::config::VaultConfig;
    /// use keyledger::service::VaultService;
    ///
    /// # fn example() -> keyledger::error::Result<()> {
    /// let service = VaultService::open(&VaultConfig::default());
    /// let created = service.create_and_store("work laptop", "longenough1")?;
    /// let fetched = service.retrieve("work laptop", "longenough1")?;
    /// assert_eq!(created.public_key_hex(), fetched.public_key_hex());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(config: &VaultConfig) -> Self {
        Self::new(VaultFile::from_config(config), PasswordCipher)
    }
}

impl<S: RecordStore, C: Cipher> VaultService<S, C> {
    pub fn new(store: S, cipher: C) -> Self {
        Self { store, cipher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All stored headings, oldest first.
    pub fn headings(&self) -> Result<Vec<String>> {
        self.store.list_headings()
    }

    pub fn contains_heading(&self, heading: &str) -> Result<bool> {
        Ok(self.store.list_headings()?.iter().any(|h| h == heading))
    }

    /// Generate a new key pair and store it encrypted under `heading`.
    ///
    /// Fails with [`KeyLedgerError::DuplicateHeadingError`] if the heading
    /// is already in the vault; nothing is written in that case. The
    /// returned pair is the caller's to display and drop.
    pub fn create_and_store(&self, heading: &str, password: &str) -> Result<KeyPair> {
        validate_heading(heading)?;
        if self.contains_heading(heading)? {
            warn!(heading, "refusing to store duplicate heading");
            return Err(KeyLedgerError::DuplicateHeadingError(heading.to_string()));
        }

        let keypair = generate_keypair()?;
        let tagged = Zeroizing::new(format!(
            "{}{}{}",
            ENCRYPTION_TAG,
            SEPARATOR,
            keypair.private_key_hex().as_str()
        ));
        let ciphertext = self.cipher.encrypt(&tagged, password)?;
        self.store.append(heading, &ciphertext)?;

        info!(heading, public_key = %keypair.public_key_hex(), "stored new key pair");
        Ok(keypair)
    }

    /// Decrypt and return the key pair stored under `heading`.
    pub fn retrieve(&self, heading: &str, password: &str) -> Result<KeyPair> {
        let ciphertext = self.store.find_latest_by_heading(heading)?.ok_or_else(|| {
            warn!(heading, "heading not found");
            KeyLedgerError::HeadingNotFoundError(heading.to_string())
        })?;

        let plaintext = match self.cipher.decrypt(&ciphertext, password) {
            Ok(plaintext) => plaintext,
            Err(KeyLedgerError::IncorrectPasswordError) => {
                warn!(heading, "password rejected by cipher");
                return Err(KeyLedgerError::IncorrectPasswordError);
            }
            Err(e) => return Err(e),
        };
        if !plaintext.starts_with(ENCRYPTION_TAG) {
            warn!(heading, "decrypted payload is missing the tag");
            return Err(KeyLedgerError::IncorrectPasswordError);
        }

        let key_hex = plaintext.split(SEPARATOR).nth(1).ok_or_else(|| {
            KeyLedgerError::InvalidKeyError(format!(
                "Record '{}' has no private key segment",
                heading
            ))
        })?;
        let keypair = KeyPair::from_private_key_hex(key_hex).map_err(|e| match e {
            KeyLedgerError::ParseError(msg) => KeyLedgerError::InvalidKeyError(format!(
                "Record '{}' holds an undecodable key: {}",
                heading, msg
            )),
            other => other,
        })?;

        info!(heading, public_key = %keypair.public_key_hex(), "retrieved key pair");
        Ok(keypair)
    }
}
