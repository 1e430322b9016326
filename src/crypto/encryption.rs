//! Password-based encryption of vault payloads.
//!
//! [`PasswordCipher`] derives a key with Argon2id and seals the payload
//! with AES-256-GCM. The serialized ciphertext is standard base64 of
//! `[salt (32 bytes)][nonce (12 bytes)][ciphertext + tag]`, which never
//! contains a newline or a `:` and can therefore be stored as a single
//! vault line.
//!
//! A wrong password fails GCM authentication, so
//! [`Cipher::decrypt`] returns [`KeyLedgerError::IncorrectPasswordError`]
//! instead of producing garbage plaintext.

use crate::crypto::password::{derive_key, generate_salt, SALT_LENGTH};
use crate::error::{KeyLedgerError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

/// The length of the nonce used for AES-GCM encryption.
const NONCE_LENGTH: usize = 12;

/// A symmetric, password-keyed cipher producing single-line text.
pub trait Cipher {
    /// Encrypt `plaintext` under `password`.
    fn encrypt(&self, plaintext: &str, password: &str) -> Result<String>;

    /// Decrypt `ciphertext` with `password`.
    ///
    /// Implementations either return [`KeyLedgerError::IncorrectPasswordError`]
    /// on a wrong password or return arbitrary plaintext and leave detection
    /// to the caller's tag check.
    fn decrypt(&self, ciphertext: &str, password: &str) -> Result<Zeroizing<String>>;
}

/// Argon2id + AES-256-GCM cipher with base64 output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordCipher;

impl Cipher for PasswordCipher {
    fn encrypt(&self, plaintext: &str, password: &str) -> Result<String> {
        let sealed = encrypt_bytes(plaintext.as_bytes(), password)?;
        Ok(BASE64.encode(sealed))
    }

    fn decrypt(&self, ciphertext: &str, password: &str) -> Result<Zeroizing<String>> {
        let sealed = BASE64.decode(ciphertext).map_err(|e| {
            KeyLedgerError::EncryptionError(format!("Ciphertext is not valid base64: {}", e))
        })?;

        let plaintext = decrypt_bytes(&sealed, password)?;
        String::from_utf8(plaintext)
            .map(Zeroizing::new)
            .map_err(|e| {
                e.into_bytes().zeroize();
                KeyLedgerError::EncryptionError("Decrypted payload is not UTF-8".to_string())
            })
    }
}

/// Encrypt raw bytes under a password.
///
/// The output format is `[salt][nonce][ciphertext + tag]`.
pub fn encrypt_bytes(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let salt = generate_salt();
    let derived_key = derive_key(password, &salt)?;

    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(&derived_key[..])
        .map_err(|e| KeyLedgerError::EncryptionError(format!("Invalid key length: {}", e)))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| KeyLedgerError::EncryptionError(format!("Encryption failed: {}", e)))?;

    let mut output = Vec::with_capacity(SALT_LENGTH + NONCE_LENGTH + ciphertext.len());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Decrypt bytes produced by [`encrypt_bytes`].
pub fn decrypt_bytes(sealed: &[u8], password: &str) -> Result<Vec<u8>> {
    let min_length = SALT_LENGTH + NONCE_LENGTH;
    if sealed.len() < min_length {
        return Err(KeyLedgerError::EncryptionError(format!(
            "Encrypted data too short: expected at least {} bytes, got {}",
            min_length,
            sealed.len()
        )));
    }

    let (salt, rest) = sealed.split_at(SALT_LENGTH);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LENGTH);

    let derived_key = derive_key(password, salt)?;
    let cipher = Aes256Gcm::new_from_slice(&derived_key[..])
        .map_err(|e| KeyLedgerError::EncryptionError(format!("Invalid key length: {}", e)))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| KeyLedgerError::IncorrectPasswordError)
}
