//! Vault record layout.
//!
//! A record occupies two lines: the heading followed by [`HEADING_MARKER`],
//! then the ciphertext. Records are concatenated with no blank line
//! between them:
//!
//! ```text
//! work laptop:
//! <base64 ciphertext>
//! backup:
//! <base64 ciphertext>
//! ```

use crate::error::{KeyLedgerError, Result};

/// Terminates every heading line.
pub const HEADING_MARKER: char = ':';

/// One heading/ciphertext pair as stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecord {
    pub heading: String,
    pub ciphertext: String,
}

impl VaultRecord {
    /// Create a record after checking both fields fit the line format.
    pub fn new(heading: impl Into<String>, ciphertext: impl Into<String>) -> Result<Self> {
        let record = Self {
            heading: heading.into(),
            ciphertext: ciphertext.into(),
        };
        validate_heading(&record.heading)?;
        validate_ciphertext(&record.ciphertext)?;
        Ok(record)
    }

    /// Serialize as `"<heading>:\n<ciphertext>\n"`.
    pub fn to_block(&self) -> String {
        format!("{}{}\n{}\n", self.heading, HEADING_MARKER, self.ciphertext)
    }
}

/// Check a heading can be written without breaking the file structure.
pub fn validate_heading(heading: &str) -> Result<()> {
    if heading.is_empty() {
        return Err(KeyLedgerError::InvalidHeadingError(
            "Heading must not be empty".to_string(),
        ));
    }
    if heading.contains(HEADING_MARKER) {
        return Err(KeyLedgerError::InvalidHeadingError(format!(
            "Heading must not contain '{}'",
            HEADING_MARKER
        )));
    }
    if heading.contains(['\n', '\r']) {
        return Err(KeyLedgerError::InvalidHeadingError(
            "Heading must not contain a line break".to_string(),
        ));
    }
    Ok(())
}

fn validate_ciphertext(ciphertext: &str) -> Result<()> {
    if ciphertext.is_empty() || ciphertext.contains(['\n', '\r']) {
        return Err(KeyLedgerError::EncryptionError(
            "Ciphertext must be a single non-empty line".to_string(),
        ));
    }
    if ciphertext.ends_with(HEADING_MARKER) {
        return Err(KeyLedgerError::EncryptionError(format!(
            "Ciphertext must not end with '{}'",
            HEADING_MARKER
        )));
    }
    Ok(())
}

/// Return the heading if `line` is a heading line.
pub fn parse_heading_line(line: &str) -> Option<&str> {
    line.strip_suffix(HEADING_MARKER)
}

/// Parse full vault contents into records, in file order.
pub fn parse_records(contents: &str) -> Result<Vec<VaultRecord>> {
    let mut records = Vec::new();
    let mut lines = contents.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let heading = parse_heading_line(line).ok_or_else(|| {
            KeyLedgerError::MalformedVaultError(format!(
                "Line {} is not a heading line",
                index + 1
            ))
        })?;

        let ciphertext = match lines.next() {
            Some((_, next)) if parse_heading_line(next).is_none() && !next.is_empty() => next,
            _ => {
                return Err(KeyLedgerError::MalformedVaultError(format!(
                    "Heading '{}' on line {} has no ciphertext line",
                    heading,
                    index + 1
                )))
            }
        };

        records.push(VaultRecord {
            heading: heading.to_string(),
            ciphertext: ciphertext.to_string(),
        });
    }

    Ok(records)
}
