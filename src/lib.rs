//! keyledger: a password-protected vault for secp256k1 key pairs.
//!
//! Key pairs are generated locally, their private keys are encrypted under
//! a user password, and the ciphertext is appended to a flat text file
//! under a unique heading. The file is append-only: records are never
//! rewritten or removed.
//!
//! # Architecture
//!
//! - [`crypto`] generates and validates keys and seals payloads.
//! - [`storage`] owns the on-disk record format behind the
//!   [`storage::RecordStore`] trait.
//! - [`service`] enforces heading uniqueness and wrong-password detection.
//! - [`session`] drives the interactive menu over a [`session::Prompter`].
//!
//! # Example
//!
//! ```rust,no_run
//! use keyledger::config::VaultConfig;
//! use keyledger::service::VaultService;
//! use keyledger::error::Result;
//!
//! fn example() -> Result<()> {
//!     let service = VaultService::open(&VaultConfig::default());
//!     let keypair = service.create_and_store("work laptop", "longenough1")?;
//!     println!("Stored public key {}", keypair.public_key_hex());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod service;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use error::{KeyLedgerError, Result};
