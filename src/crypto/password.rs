//! Password rules and password-based key derivation.
//!
//! Keys are derived with Argon2id using the crate's default cost
//! parameters. The parameters are not stored next to the ciphertext, so
//! changing them makes existing vault records undecryptable.

use crate::error::{KeyLedgerError, Result};
use argon2::Argon2;
use rand::RngCore;
use zeroize::Zeroizing;

/// The length of the salt used for key derivation.
pub const SALT_LENGTH: usize = 32;

/// The length of the derived key.
pub const KEY_LENGTH: usize = 32;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Generate a random salt for key derivation.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Derive a symmetric key from a password and salt using Argon2id.
///
/// # Example
///
/// ```
/// use keyledger::crypto::password::{derive_key, generate_salt, KEY_LENGTH};
///
/// let salt = generate_salt();
/// let key = derive_key("longenough1", &salt).unwrap();
/// assert_eq!(key.len(), KEY_LENGTH);
/// ```
pub fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
    if salt.len() != SALT_LENGTH {
        return Err(KeyLedgerError::KeyDerivationError(format!(
            "Salt must be {} bytes, got {}",
            SALT_LENGTH,
            salt.len()
        )));
    }

    let mut output = Zeroizing::new([0u8; KEY_LENGTH]);
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut output[..])
        .map_err(|e| KeyLedgerError::KeyDerivationError(format!("Argon2 error: {}", e)))?;

    Ok(output)
}

/// Whether a password meets the minimum length rule.
pub fn is_acceptable_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}
