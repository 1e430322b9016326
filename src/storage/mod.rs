//! Vault storage module.
//!
//! [`RecordStore`] is the append/scan contract the service depends on;
//! [`vault_file::VaultFile`] implements it over a flat text file.

use crate::error::Result;

pub mod record;
pub mod vault_file;

pub use record::VaultRecord;
pub use vault_file::VaultFile;

/// Append-only, heading-indexed storage of opaque ciphertext strings.
///
/// Stores do not enforce heading uniqueness; callers check
/// [`RecordStore::list_headings`] before appending.
pub trait RecordStore {
    /// Append a record after all existing ones.
    fn append(&self, heading: &str, ciphertext: &str) -> Result<()>;

    /// Every stored heading, oldest first. Empty if nothing was written yet.
    fn list_headings(&self) -> Result<Vec<String>>;

    /// Ciphertext of the first record stored under `heading`, if any.
    fn find_latest_by_heading(&self, heading: &str) -> Result<Option<String>>;
}
