//! Cryptographic operations module.
//!
//! - secp256k1 key generation, validation and hex encoding
//! - Argon2id password-based key derivation
//! - AES-256-GCM encryption of vault payloads
//!
//! # Example
//!
//! ```rust
//! use keyledger::crypto::encryption::{Cipher, PasswordCipher};
//! use keyledger::crypto::secp256k1::generate_keypair;
//!
//! # fn example() -> keyledger::error::Result<()> {
//! let keypair = generate_keypair()?;
//!
//! let cipher = PasswordCipher;
//! let sealed = cipher.encrypt(&keypair.private_key_hex(), "secure-password")?;
//! let opened = cipher.decrypt(&sealed, "secure-password")?;
//! assert_eq!(opened.as_str(), keypair.private_key_hex().as_str());
//! # Ok(())
//! # }
//! ```

pub mod encryption;
pub mod password;
pub mod secp256k1;
