//! secp256k1 key operations.
//!
//! Private keys are 32-byte big-endian scalars; public keys are encoded as
//! 33-byte SEC1 compressed points.

use crate::error::{KeyLedgerError, Result};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// Length in bytes of a raw private key.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Length in bytes of a compressed public key.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// A secp256k1 keypair.
///
/// The secret scalar is wiped from memory when the keypair is dropped.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Build a keypair from a raw 32-byte private key.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        let secret = parse_secret(bytes)?;
        let public = secret.public_key();
        Ok(Self { secret, public })
    }

    /// Build a keypair from a hex-encoded private key.
    pub fn from_private_key_hex(hex_string: &str) -> Result<Self> {
        let bytes = Zeroizing::new(from_hex(hex_string)?);
        Self::from_private_key(&bytes)
    }

    /// Get the private key as bytes.
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_LENGTH]> {
        let mut out = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
        out.copy_from_slice(&self.secret.to_bytes());
        out
    }

    /// Get the private key as a 64-character lowercase hex string.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(to_hex(self.private_key_bytes().as_ref()))
    }

    /// Get the compressed public key as bytes.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let encoded = self.public.to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Get the compressed public key as a 66-character hex string.
    pub fn public_key_hex(&self) -> String {
        to_hex(self.public_key_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

fn parse_secret(bytes: &[u8]) -> Result<SecretKey> {
    if bytes.len() != PRIVATE_KEY_LENGTH {
        return Err(KeyLedgerError::InvalidKeyError(format!(
            "Expected {} bytes for secp256k1 private key, got {}",
            PRIVATE_KEY_LENGTH,
            bytes.len()
        )));
    }

    SecretKey::from_slice(bytes).map_err(|_| {
        KeyLedgerError::InvalidKeyError(
            "Private key must be nonzero and less than the curve order".to_string(),
        )
    })
}

/// Check that `bytes` is a usable private key: exactly 32 bytes encoding a
/// scalar in `[1, n)` where `n` is the secp256k1 group order.
pub fn is_valid_private_key(bytes: &[u8]) -> bool {
    parse_secret(bytes).is_ok()
}

/// Draw a private key from the OS random number generator.
///
/// Candidates outside `[1, n)` are rejected and redrawn until one is valid.
///
/// # Example
///
/// ```
/// use keyledger::crypto::secp256k1::{generate_private_key, is_valid_private_key};
///
/// let key = generate_private_key();
/// assert!(is_valid_private_key(key.as_ref()));
/// ```
pub fn generate_private_key() -> Zeroizing<[u8; PRIVATE_KEY_LENGTH]> {
    let mut candidate = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
    loop {
        OsRng.fill_bytes(&mut candidate[..]);
        if is_valid_private_key(&candidate[..]) {
            return candidate;
        }
    }
}

/// Derive the compressed public key for a private key.
///
/// # Example
///
/// ```
/// use keyledger::crypto::secp256k1::{derive_public_key, generate_private_key};
///
/// let key = generate_private_key();
/// let public = derive_public_key(key.as_ref()).unwrap();
/// assert_eq!(public.len(), 33);
/// ```
pub fn derive_public_key(private_key: &[u8]) -> Result<[u8; PUBLIC_KEY_LENGTH]> {
    Ok(KeyPair::from_private_key(private_key)?.public_key_bytes())
}

/// Generate a new keypair.
pub fn generate_keypair() -> Result<KeyPair> {
    let private_key = generate_private_key();
    KeyPair::from_private_key(&private_key[..])
}

/// Encode bytes as lowercase hex.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

/// Decode a hex string.
pub fn from_hex(hex_string: &str) -> Result<Vec<u8>> {
    hex::decode(hex_string)
        .map_err(|e| KeyLedgerError::ParseError(format!("Invalid hex string: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_ORDER_HEX: &str =
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    #[test]
    fn test_generated_private_key_is_valid() {
        for _ in 0..32 {
            let key = generate_private_key();
            assert!(is_valid_private_key(&key[..]));
            assert_ne!(*key, [0u8; PRIVATE_KEY_LENGTH]);
        }
    }

    #[test]
    fn test_generate_keypair_produces_different_keys() {
        let keypair1 = generate_keypair().unwrap();
        let keypair2 = generate_keypair().unwrap();

        assert_ne!(keypair1.public_key_bytes(), keypair2.public_key_bytes());
        assert_ne!(*keypair1.private_key_bytes(), *keypair2.private_key_bytes());
    }

    #[test]
    fn test_derive_public_key_is_deterministic() {
        let key = generate_private_key();
        let first = derive_public_key(&key[..]).unwrap();
        let second = derive_public_key(&key[..]).unwrap();

        assert_eq!(first, second);
        assert!(first[0] == 0x02 || first[0] == 0x03);
    }

    #[test]
    fn test_known_vector_private_key_one() {
        // 1 * G
        let mut key = [0u8; PRIVATE_KEY_LENGTH];
        key[31] = 1;

        let public = derive_public_key(&key).unwrap();
        assert_eq!(
            to_hex(public),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_zero_is_rejected() {
        let result = derive_public_key(&[0u8; PRIVATE_KEY_LENGTH]);
        assert!(matches!(result, Err(KeyLedgerError::InvalidKeyError(_))));
    }

    #[test]
    fn test_group_order_is_rejected() {
        let order = from_hex(GROUP_ORDER_HEX).unwrap();
        assert!(!is_valid_private_key(&order));

        let mut below = order.clone();
        below[31] -= 1;
        assert!(is_valid_private_key(&below));
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let result = KeyPair::from_private_key(&[1u8; 31]);
        match result {
            Err(KeyLedgerError::InvalidKeyError(msg)) => {
                assert!(msg.contains("Expected 32 bytes"));
            }
            _ => panic!("Expected InvalidKeyError"),
        }
    }

    #[test]
    fn test_hex_lengths() {
        let keypair = generate_keypair().unwrap();
        assert_eq!(keypair.private_key_hex().len(), 64);
        assert_eq!(keypair.public_key_hex().len(), 66);
    }

    #[test]
    fn test_import_from_hex() {
        let original = generate_keypair().unwrap();
        let imported = KeyPair::from_private_key_hex(&original.private_key_hex()).unwrap();

        assert_eq!(original.public_key_bytes(), imported.public_key_bytes());
        assert_eq!(*original.private_key_bytes(), *imported.private_key_bytes());
    }

    #[test]
    fn test_import_from_hex_invalid() {
        let result = KeyPair::from_private_key_hex("not-valid-hex");
        assert!(matches!(result, Err(KeyLedgerError::ParseError(_))));
    }

    #[test]
    fn test_hex_roundtrip() {
        let bytes = [0x00, 0x7f, 0x80, 0xff];
        assert_eq!(to_hex(bytes), "007f80ff");
        assert_eq!(from_hex(&to_hex(bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_debug_hides_private_key() {
        let keypair = generate_keypair().unwrap();
        let debug = format!("{:?}", keypair);

        assert!(debug.contains(&keypair.public_key_hex()));
        assert!(!debug.contains(keypair.private_key_hex().as_str()));
    }
}
