//! API key acquisition and validity tracking.
//!
//! Where the key comes from is a [`CredentialProvider`]; everything else
//! only sees a [`CredentialState`] and asks whether it is still valid.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::client::StoryboardModel;
use crate::error::{GenAiError, GenAiResult};

/// Environment variables consulted by [`HostProvided`], in order.
pub const KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// A source of API keys.
pub trait CredentialProvider {
    fn name(&self) -> &'static str;

    /// Obtain a key, prompting if the provider is interactive.
    fn acquire(&self) -> GenAiResult<String>;
}

/// Key supplied by the host environment (`GEMINI_API_KEY`, `API_KEY`).
#[derive(Debug, Clone)]
pub struct HostProvided {
    vars: Vec<String>,
}

impl HostProvided {
    pub fn new() -> Self {
        Self {
            vars: KEY_ENV_VARS.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Read from a custom list of variables.
    pub fn with_vars<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a `.env` file from the working directory (or parents) into the
    /// process environment, if present.
    pub fn load_dotenv() {
        match dotenvy::dotenv() {
            Ok(path) => info!(path = %path.display(), "Loaded environment file"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable environment file"),
        }
    }
}

impl Default for HostProvided {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for HostProvided {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn acquire(&self) -> GenAiResult<String> {
        self.vars
            .iter()
            .find_map(|var| {
                std::env::var(var)
                    .ok()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .ok_or_else(|| {
                GenAiError::missing_credential(format!(
                    "set one of {} or pass --api-key",
                    self.vars.join(", ")
                ))
            })
    }
}

/// Key entered by the user: given up front, or typed on the terminal.
#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    preset: Option<String>,
}

impl ManualEntry {
    /// Key passed explicitly (e.g. `--api-key`).
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            preset: Some(key.into()),
        }
    }

    /// Prompt on the terminal when acquired.
    pub fn interactive() -> Self {
        Self { preset: None }
    }

    /// Read one key from `input`, writing the prompt to `prompt_out`.
    pub fn read_key(input: &mut dyn BufRead, prompt_out: &mut dyn Write) -> GenAiResult<String> {
        let _ = write!(prompt_out, "Enter your Gemini API key: ");
        let _ = prompt_out.flush();

        let mut line = String::new();
        input
            .read_line(&mut line)
            .map_err(|e| GenAiError::missing_credential(format!("failed to read key: {e}")))?;
        non_empty(line.trim())
    }
}

impl CredentialProvider for ManualEntry {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn acquire(&self) -> GenAiResult<String> {
        match &self.preset {
            Some(key) => non_empty(key.trim()),
            None => {
                let stdin = std::io::stdin();
                Self::read_key(&mut stdin.lock(), &mut std::io::stderr())
            }
        }
    }
}

fn non_empty(key: &str) -> GenAiResult<String> {
    if key.is_empty() {
        Err(GenAiError::missing_credential("the API key is empty"))
    } else {
        Ok(key.to_string())
    }
}

/// The active key and whether it is still believed to work.
#[derive(Debug)]
pub struct CredentialState {
    key: String,
    source: &'static str,
    valid: AtomicBool,
}

impl CredentialState {
    /// A freshly acquired key counts as valid until the backend says otherwise.
    pub fn new(key: impl Into<String>, source: &'static str) -> Self {
        Self {
            key: key.into(),
            source,
            valid: AtomicBool::new(true),
        }
    }

    pub fn acquire(provider: &dyn CredentialProvider) -> GenAiResult<Self> {
        let key = provider.acquire()?;
        info!(source = provider.name(), "API key acquired");
        Ok(Self::new(key, provider.name()))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    pub fn invalidate(&self) {
        if self.valid.swap(false, Ordering::SeqCst) {
            warn!(source = self.source, "API key marked invalid");
        }
    }

    /// Ping the backend and record the outcome.
    pub async fn validate<M: StoryboardModel + ?Sized>(&self, model: &M) -> GenAiResult<()> {
        match model.ping(&self.key).await {
            Ok(()) => {
                self.valid.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => {
                self.invalidate();
                Err(e)
            }
        }
    }
}
