//! Vault location configuration.

use std::path::PathBuf;

/// Default directory holding the vault file.
pub const DEFAULT_VAULT_DIR: &str = "keys";

/// Default vault file name.
pub const DEFAULT_VAULT_FILE: &str = "encrypted_keys.txt";

/// Where the vault file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub directory: PathBuf,
    pub file_name: String,
}

impl VaultConfig {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    /// Full path of the vault file.
    pub fn vault_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new(DEFAULT_VAULT_DIR, DEFAULT_VAULT_FILE)
    }
}
