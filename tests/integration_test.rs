//! Integration tests for keyledger.
//!
//! These tests run the service against a real vault file in a temporary
//! directory.

use keyledger::config::VaultConfig;
use keyledger::crypto::encryption::PasswordCipher;
use keyledger::crypto::secp256k1::{derive_public_key, is_valid_private_key, KeyPair};
use keyledger::error::{KeyLedgerError, Result};
use keyledger::service::VaultService;
use keyledger::storage::VaultFile;
use std::fs;
use tempfile::TempDir;

fn open_in(temp_dir: &TempDir) -> VaultService {
    VaultService::open(&VaultConfig::new(temp_dir.path().join("keys"), "keys.txt"))
}

#[test]
fn test_create_and_retrieve_workflow() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let service = open_in(&temp_dir);

    let created = service.create_and_store("work laptop", "longenough1")?;
    let private_hex = created.private_key_hex().to_string();
    assert_eq!(private_hex.len(), 64);
    assert_eq!(created.public_key_hex().len(), 66);

    let fetched = service.retrieve("work laptop", "longenough1")?;
    assert_eq!(fetched.private_key_hex().as_str(), private_hex);
    assert_eq!(fetched.public_key_hex(), created.public_key_hex());

    assert!(is_valid_private_key(&fetched.private_key_bytes()[..]));
    assert_eq!(
        derive_public_key(&fetched.private_key_bytes()[..])?,
        created.public_key_bytes()
    );

    Ok(())
}

#[test]
fn test_vault_file_contents_hold_no_plaintext() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let service = open_in(&temp_dir);

    let created = service.create_and_store("alpha", "longenough1")?;

    let contents = fs::read_to_string(service.store().path())?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "alpha:");
    assert!(!contents.contains(created.private_key_hex().as_str()));
    assert!(!contents.contains("longenough1"));
    assert!(contents.ends_with('\n'));

    Ok(())
}

#[test]
fn test_wrong_password_workflow() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let service = open_in(&temp_dir);

    service.create_and_store("alpha", "longenough1")?;

    let result = service.retrieve("alpha", "longenough2");
    assert!(matches!(result, Err(KeyLedgerError::IncorrectPasswordError)));

    Ok(())
}

#[test]
fn test_duplicate_heading_workflow() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let service = open_in(&temp_dir);

    let first = service.create_and_store("alpha", "longenough1")?;
    let result = service.create_and_store("alpha", "longenough1");
    assert!(matches!(result, Err(KeyLedgerError::DuplicateHeadingError(_))));

    let records = service.store().records()?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].heading, "alpha");

    // The surviving record is the first one.
    let fetched = service.retrieve("alpha", "longenough1")?;
    assert_eq!(fetched.public_key_hex(), first.public_key_hex());

    Ok(())
}

#[test]
fn test_many_records_workflow() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let service = open_in(&temp_dir);

    let mut created: Vec<(String, String, KeyPair)> = Vec::new();
    for i in 0..4 {
        let heading = format!("key {}", i);
        let password = format!("password-{}", i);
        let keypair = service.create_and_store(&heading, &password)?;
        created.push((heading, password, keypair));
    }

    assert_eq!(service.store().records()?.len(), 4);

    let headings = service.headings()?;
    assert_eq!(headings, service.headings()?);
    assert_eq!(
        headings,
        created.iter().map(|(h, _, _)| h.clone()).collect::<Vec<_>>()
    );

    for (heading, password, keypair) in &created {
        let fetched = service.retrieve(heading, password)?;
        assert_eq!(*fetched.private_key_bytes(), *keypair.private_key_bytes());
    }

    Ok(())
}

#[test]
fn test_persistence_across_instances() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();

    let public_key = {
        let service = open_in(&temp_dir);
        service.create_and_store("persistent", "longenough1")?.public_key_hex()
    };

    let service = open_in(&temp_dir);
    assert_eq!(service.headings()?, vec!["persistent"]);
    assert_eq!(
        service.retrieve("persistent", "longenough1")?.public_key_hex(),
        public_key
    );

    Ok(())
}

#[test]
fn test_missing_vault_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_in(&temp_dir);

    let result = service.retrieve("anything", "whatever");
    assert!(matches!(result, Err(KeyLedgerError::HeadingNotFoundError(_))));
    assert!(service.headings().unwrap().is_empty());
    assert!(!temp_dir.path().join("keys").exists());
}

#[test]
fn test_truncated_vault_workflow() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let directory = temp_dir.path().join("keys");
    fs::create_dir_all(&directory)?;
    fs::write(directory.join("keys.txt"), "orphan:\n")?;

    let service = VaultService::new(VaultFile::new(&directory, "keys.txt"), PasswordCipher);
    let result = service.retrieve("orphan", "longenough1");
    assert!(matches!(result, Err(KeyLedgerError::MalformedVaultError(_))));

    Ok(())
}

#[test]
fn test_tampered_ciphertext_workflow() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let service = open_in(&temp_dir);
    service.create_and_store("alpha", "longenough1")?;

    let path = service.store().path().to_path_buf();
    let contents = fs::read_to_string(&path)?;
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
    // Flip one base64 character in the ciphertext body.
    let replacement = if lines[1].as_bytes()[60] == b'A' { "B" } else { "A" };
    lines[1].replace_range(60..61, replacement);
    fs::write(&path, format!("{}\n", lines.join("\n")))?;

    let result = service.retrieve("alpha", "longenough1");
    assert!(matches!(result, Err(KeyLedgerError::IncorrectPasswordError)));

    Ok(())
}

#[test]
fn test_create_refuses_unterminated_vault() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let directory = temp_dir.path().join("keys");
    fs::create_dir_all(&directory)?;
    fs::write(directory.join("keys.txt"), "alpha:\nQUJDREVG")?;

    let service = open_in(&temp_dir);
    let result = service.create_and_store("beta", "longenough1");
    assert!(matches!(result, Err(KeyLedgerError::MalformedVaultError(_))));
    assert_eq!(service.headings()?, vec!["alpha"]);
    assert_eq!(fs::read_to_string(directory.join("keys.txt"))?, "alpha:\nQUJDREVG");

    Ok(())
}
