//! Interactive key manager session.
//!
//! The session is an explicit state machine driven through a [`Prompter`].
//! Invalid input moves back to the same prompt instead of recursing, so a
//! user can retry indefinitely without growing the stack.

use crate::crypto::encryption::Cipher;
use crate::crypto::password::is_acceptable_password;
use crate::error::{KeyLedgerError, Result};
use crate::service::VaultService;
use crate::storage::RecordStore;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::sync::LazyLock;
use tracing::debug;
use zeroize::Zeroizing;

#[allow(clippy::expect_used)]
static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]+(?: [a-zA-Z0-9]+)*$").expect("heading pattern compiles")
});

pub const HEADING_RULE: &str = "Heading must be at least 1 character long. And must only contain alphanumeric characters and single spaces. It cannot start or end with a space.";
pub const PASSWORD_RULE: &str = "Password must be at least 8 characters long.";
pub const OPTION_RULE: &str = "Option must be one of the following: n, f, q, h.";

pub const HELP_MESSAGE: &str = "List of options:
n for 'new keys': generating a new key pair and saving the encrypted keys under a heading.
f for 'fetch keys': fetching the encrypted keys under a heading and decrypting them.
q for 'quit': quitting the program.
h for 'help': showing the help menu.";

/// Whether `heading` is alphanumeric words separated by single spaces.
pub fn is_well_formed_heading(heading: &str) -> bool {
    HEADING_PATTERN.is_match(heading)
}

/// A menu choice at the option prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    New,
    Fetch,
    Quit,
    Help,
}

impl MenuOption {
    /// Parse a single option character, ignoring case and surrounding space.
    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.trim().chars();
        let choice = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match choice.to_ascii_lowercase() {
            'n' => Some(Self::New),
            'f' => Some(Self::Fetch),
            'q' => Some(Self::Quit),
            'h' => Some(Self::Help),
            _ => None,
        }
    }
}

/// Line-oriented request/response boundary of a session.
///
/// `None` from either `ask` method means the input was closed.
pub trait Prompter {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Ask for input that must not be echoed.
    fn ask_secret(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>>;

    fn say(&mut self, line: &str) -> Result<()>;
}

enum State {
    AwaitingOption,
    PromptHeading,
    PromptPassword {
        heading: String,
    },
    PromptConfirmPassword {
        heading: String,
        password: Zeroizing<String>,
    },
    PromptFetchHeading,
    PromptFetchPassword {
        heading: String,
    },
    Terminal,
}

/// One interactive run against a vault.
pub struct Session<'a, P, S, C> {
    service: &'a VaultService<S, C>,
    prompter: P,
}

impl<'a, P, S, C> Session<'a, P, S, C>
where
    P: Prompter,
    S: RecordStore,
    C: Cipher,
{
    pub fn new(service: &'a VaultService<S, C>, prompter: P) -> Self {
        Self { service, prompter }
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Run until the user quits or input closes.
    ///
    /// Vault errors are reported through the prompter and the session
    /// carries on; only prompter failures end it with an error.
    pub fn run(&mut self) -> Result<()> {
        let mut state = State::AwaitingOption;
        while !matches!(state, State::Terminal) {
            state = self.step(state)?;
        }
        debug!("session ended");
        Ok(())
    }

    fn step(&mut self, state: State) -> Result<State> {
        match state {
            State::AwaitingOption => self.await_option(),
            State::PromptHeading => self.prompt_new_heading(),
            State::PromptPassword { heading } => self.prompt_new_password(heading),
            State::PromptConfirmPassword { heading, password } => {
                self.confirm_and_create(heading, password)
            }
            State::PromptFetchHeading => self.prompt_fetch_heading(),
            State::PromptFetchPassword { heading } => self.fetch(heading),
            State::Terminal => Ok(State::Terminal),
        }
    }

    fn await_option(&mut self) -> Result<State> {
        let Some(input) = self.prompter.ask("Enter an option")? else {
            return Ok(State::Terminal);
        };

        Ok(match MenuOption::parse(&input) {
            Some(MenuOption::New) => State::PromptHeading,
            Some(MenuOption::Fetch) => State::PromptFetchHeading,
            Some(MenuOption::Quit) => State::Terminal,
            Some(MenuOption::Help) => {
                self.prompter.say(HELP_MESSAGE)?;
                State::AwaitingOption
            }
            None => {
                self.prompter.say(OPTION_RULE)?;
                State::AwaitingOption
            }
        })
    }

    fn prompt_new_heading(&mut self) -> Result<State> {
        let Some(heading) = self.prompter.ask("Enter a heading to save the keys under")? else {
            return Ok(State::Terminal);
        };

        if !is_well_formed_heading(&heading) {
            self.prompter.say(HEADING_RULE)?;
            return Ok(State::PromptHeading);
        }

        match self.service.contains_heading(&heading) {
            Ok(false) => Ok(State::PromptPassword { heading }),
            Ok(true) => {
                self.report_duplicate(&heading)?;
                Ok(State::PromptHeading)
            }
            Err(e) => self.report_failure(&e),
        }
    }

    fn prompt_new_password(&mut self, heading: String) -> Result<State> {
        let Some(password) = self.prompter.ask_secret("Enter password")? else {
            return Ok(State::Terminal);
        };

        if !is_acceptable_password(&password) {
            self.prompter.say(PASSWORD_RULE)?;
            return Ok(State::PromptPassword { heading });
        }
        Ok(State::PromptConfirmPassword { heading, password })
    }

    fn confirm_and_create(
        &mut self,
        heading: String,
        password: Zeroizing<String>,
    ) -> Result<State> {
        let Some(confirmation) = self.prompter.ask_secret("Confirm password")? else {
            return Ok(State::Terminal);
        };

        if *confirmation != *password {
            self.prompter.say("Passwords do not match.")?;
            return Ok(State::PromptPassword { heading });
        }

        match self.service.create_and_store(&heading, &password) {
            Ok(keypair) => {
                self.prompter.say(&format!(
                    "You've created a key pair with the public key: {}",
                    keypair.public_key_hex()
                ))?;
                self.prompter.say(&format!(
                    "The private key is encrypted and saved under the heading: {}",
                    heading
                ))?;
                self.prompter.say(&format!(
                    "The private key is: {}",
                    keypair.private_key_hex().as_str()
                ))?;
                Ok(State::AwaitingOption)
            }
            Err(KeyLedgerError::DuplicateHeadingError(_)) => {
                self.report_duplicate(&heading)?;
                Ok(State::PromptHeading)
            }
            Err(e) => self.report_failure(&e),
        }
    }

    fn prompt_fetch_heading(&mut self) -> Result<State> {
        let Some(heading) = self
            .prompter
            .ask("Enter the heading of the key that you want to retrieve")?
        else {
            return Ok(State::Terminal);
        };

        if !is_well_formed_heading(&heading) {
            self.prompter.say(HEADING_RULE)?;
            return Ok(State::PromptFetchHeading);
        }
        Ok(State::PromptFetchPassword { heading })
    }

    fn fetch(&mut self, heading: String) -> Result<State> {
        let Some(password) = self.prompter.ask_secret("Enter password")? else {
            return Ok(State::Terminal);
        };

        if !is_acceptable_password(&password) {
            self.prompter.say(PASSWORD_RULE)?;
            return Ok(State::PromptFetchPassword { heading });
        }

        match self.service.retrieve(&heading, &password) {
            Ok(keypair) => {
                self.prompter
                    .say(&format!("The public key is: {}", keypair.public_key_hex()))?;
                self.prompter.say(&format!(
                    "The private key is: {}",
                    keypair.private_key_hex().as_str()
                ))?;
            }
            Err(KeyLedgerError::HeadingNotFoundError(_)) => {
                self.prompter.say("Heading does not exist.")?;
            }
            Err(KeyLedgerError::IncorrectPasswordError) => {
                self.prompter.say("Password is incorrect.")?;
            }
            Err(e) => return self.report_failure(&e),
        }
        Ok(State::AwaitingOption)
    }

    fn report_duplicate(&mut self, heading: &str) -> Result<()> {
        self.prompter.say(&format!(
            "Heading {} already exists. Must enter a new heading.",
            heading
        ))
    }

    fn report_failure(&mut self, error: &KeyLedgerError) -> Result<State> {
        self.prompter.say(&format!("Error: {}", error))?;
        Ok(State::AwaitingOption)
    }
}

/// [`Prompter`] over the process terminal.
///
/// Plain answers are read from stdin; secrets are read without echo.
pub struct TerminalPrompter {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.stdout, "{}: ", prompt)?;
        self.stdout.flush()?;

        let mut line = String::new();
        if self.stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>> {
        match rpassword::prompt_password(format!("{}: ", prompt)) {
            Ok(secret) => Ok(Some(Zeroizing::new(secret))),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(KeyLedgerError::StorageError(e)),
        }
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.stdout, "{}", line)?;
        Ok(())
    }
}
