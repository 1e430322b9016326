//! Error types for the keyledger library.
//!
//! Every fallible operation returns [`Result`]. The variants keep the
//! recoverable vault conditions (duplicate heading, missing heading, wrong
//! password) apart from corruption and I/O failures so callers can decide
//! whether to re-prompt or abort.

use thiserror::Error;

/// The main error type for keyledger operations.
#[derive(Error, Debug)]
pub enum KeyLedgerError {
    /// A record with this heading is already stored.
    #[error("Heading '{0}' already exists")]
    DuplicateHeadingError(String),

    /// No record is stored under this heading.
    #[error("Heading '{0}' does not exist")]
    HeadingNotFoundError(String),

    /// The password does not decrypt the record.
    #[error("Password is incorrect")]
    IncorrectPasswordError,

    /// Key material is not a valid secp256k1 private key.
    #[error("Invalid key: {0}")]
    InvalidKeyError(String),

    /// The heading cannot be stored in the vault file format.
    #[error("Invalid heading: {0}")]
    InvalidHeadingError(String),

    /// The vault file does not follow the heading/ciphertext line layout.
    #[error("Malformed vault file: {0}")]
    MalformedVaultError(String),

    /// Encryption or decryption failed
    #[error("Encryption/decryption error: {0}")]
    EncryptionError(String),

    /// Key derivation failed
    #[error("Key derivation error: {0}")]
    KeyDerivationError(String),

    /// Invalid input data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Storage I/O error
    #[error("Storage I/O error: {0}")]
    StorageError(#[from] std::io::Error),
}

/// A specialized Result type for keyledger operations.
pub type Result<T> = std::result::Result<T, KeyLedgerError>;
