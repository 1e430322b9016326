//! Flat-file vault.
//!
//! The file is only ever opened in append mode for writes, and read in full
//! for every scan; no handle outlives a single call. There is no locking,
//! so only one writer may use a vault at a time.

use crate::config::VaultConfig;
use crate::error::{KeyLedgerError, Result};
use crate::storage::record::{parse_heading_line, parse_records, VaultRecord, HEADING_MARKER};
use crate::storage::RecordStore;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A vault stored as a text file of heading/ciphertext line pairs.
#[derive(Debug, Clone)]
pub struct VaultFile {
    directory: PathBuf,
    path: PathBuf,
}

impl VaultFile {
    /// Vault at `directory/file_name`. Nothing is created until the first
    /// append.
    pub fn new(directory: impl Into<PathBuf>, file_name: &str) -> Self {
        let directory = directory.into();
        let path = directory.join(file_name);
        Self { directory, path }
    }

    /// Vault at the location described by `config`.
    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(&config.directory, &config.file_name)
    }

    /// Full path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. A missing file or directory reads as empty.
    fn read_contents(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "vault file absent");
                Ok(String::new())
            }
            Err(e) => Err(KeyLedgerError::StorageError(e)),
        }
    }

    /// Parse every record in file order.
    ///
    /// Unlike the line scans used for lookups, this rejects any deviation
    /// from the two-line layout.
    pub fn records(&self) -> Result<Vec<VaultRecord>> {
        parse_records(&self.read_contents()?)
    }
}

/// Whether a non-empty file lacks a trailing newline. Only reads.
fn ends_mid_line(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl RecordStore for VaultFile {
    fn append(&self, heading: &str, ciphertext: &str) -> Result<()> {
        let record = VaultRecord::new(heading, ciphertext)?;

        fs::create_dir_all(&self.directory)?;
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;
        if ends_mid_line(&mut file)? {
            warn!(path = %self.path.display(), "vault file does not end with a newline");
            return Err(KeyLedgerError::MalformedVaultError(
                "Last line of the vault file is unterminated".to_string(),
            ));
        }
        file.write_all(record.to_block().as_bytes())?;
        file.flush()?;

        debug!(path = %self.path.display(), heading, "appended vault record");
        Ok(())
    }

    fn list_headings(&self) -> Result<Vec<String>> {
        let contents = self.read_contents()?;
        let headings: Vec<String> = contents
            .lines()
            .filter_map(parse_heading_line)
            .map(str::to_string)
            .collect();

        debug!(path = %self.path.display(), count = headings.len(), "listed headings");
        Ok(headings)
    }

    fn find_latest_by_heading(&self, heading: &str) -> Result<Option<String>> {
        let contents = self.read_contents()?;
        let target = format!("{}{}", heading, HEADING_MARKER);
        let mut lines = contents.lines();

        if lines.by_ref().all(|line| line != target) {
            return Ok(None);
        }

        match lines.next() {
            Some(ciphertext)
                if !ciphertext.is_empty() && parse_heading_line(ciphertext).is_none() =>
            {
                Ok(Some(ciphertext.to_string()))
            }
            _ => Err(KeyLedgerError::MalformedVaultError(format!(
                "Heading '{}' has no ciphertext line",
                heading
            ))),
        }
    }
}
