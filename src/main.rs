//! keyledger CLI application.
//!
//! Without a subcommand the binary runs the interactive menu; the
//! subcommands perform a single operation and exit.

use clap::{Parser, Subcommand};
use keyledger::config::{VaultConfig, DEFAULT_VAULT_DIR, DEFAULT_VAULT_FILE};
use keyledger::crypto::password::is_acceptable_password;
use keyledger::error::{KeyLedgerError, Result};
use keyledger::service::VaultService;
use keyledger::session::{
    is_well_formed_heading, Session, TerminalPrompter, HEADING_RULE, PASSWORD_RULE,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "keyledger", version)]
#[command(about = "Password-protected vault for secp256k1 key pairs", long_about = None)]
struct Cli {
    /// Directory holding the vault file
    #[arg(long, env = "KEYLEDGER_DIR", default_value = DEFAULT_VAULT_DIR, global = true)]
    dir: PathBuf,

    /// Vault file name
    #[arg(long, env = "KEYLEDGER_FILE", default_value = DEFAULT_VAULT_FILE, global = true)]
    file: String,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "KEYLEDGER_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive menu (default)
    Interactive,

    /// Generate a key pair and store it under a new heading
    New {
        /// Heading to store the key under
        #[arg(long)]
        heading: String,
    },

    /// Decrypt and print the key pair stored under a heading
    Fetch {
        /// Heading of the key to retrieve
        #[arg(long)]
        heading: String,
    },

    /// List stored headings, oldest first
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = VaultConfig::new(cli.dir, cli.file);
    tracing::debug!(path = %config.vault_path().display(), "using vault");
    let service = VaultService::open(&config);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            println!("Enter 'h' for help.");
            Session::new(&service, TerminalPrompter::new()).run()
        }
        Commands::New { heading } => handle_new(&service, &heading),
        Commands::Fetch { heading } => handle_fetch(&service, &heading),
        Commands::List => handle_list(&service),
    }
}

fn check_heading(heading: &str) -> Result<()> {
    if is_well_formed_heading(heading) {
        Ok(())
    } else {
        Err(KeyLedgerError::InvalidHeadingError(HEADING_RULE.to_string()))
    }
}

fn read_password(prompt: &str) -> Result<Zeroizing<String>> {
    let password = Zeroizing::new(rpassword::prompt_password(prompt)?);
    if !is_acceptable_password(&password) {
        return Err(KeyLedgerError::ParseError(PASSWORD_RULE.to_string()));
    }
    Ok(password)
}

fn handle_new(service: &VaultService, heading: &str) -> Result<()> {
    check_heading(heading)?;
    if service.contains_heading(heading)? {
        return Err(KeyLedgerError::DuplicateHeadingError(heading.to_string()));
    }

    let password = read_password("Enter password: ")?;
    let confirmation = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);
    if *confirmation != *password {
        return Err(KeyLedgerError::ParseError("Passwords do not match".to_string()));
    }

    let keypair = service.create_and_store(heading, &password)?;

    println!("Stored key pair under heading: {}", heading);
    println!("Public key: {}", keypair.public_key_hex());
    println!("Private key: {}", keypair.private_key_hex().as_str());

    Ok(())
}

fn handle_fetch(service: &VaultService, heading: &str) -> Result<()> {
    check_heading(heading)?;
    let password = read_password("Enter password: ")?;

    let keypair = service.retrieve(heading, &password)?;

    println!("Public key: {}", keypair.public_key_hex());
    println!("Private key: {}", keypair.private_key_hex().as_str());

    Ok(())
}

fn handle_list(service: &VaultService) -> Result<()> {
    let headings = service.headings()?;

    if headings.is_empty() {
        println!("No keys found in vault.");
    } else {
        for heading in headings {
            println!("{}", heading);
        }
    }

    Ok(())
}
