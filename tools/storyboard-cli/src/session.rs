//! State shared by the commands that talk to the backend.

use std::io::IsTerminal;

use storyboard_common::activity::{ActivityLog, LogEntry, Severity};
use storyboard_common::config::AppConfig;
use storyboard_genai::{CredentialState, GeminiClient, HostProvided, ManualEntry};

pub struct Session {
    pub config: AppConfig,
    pub log: ActivityLog,
    printed: u64,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        let log = ActivityLog::new(config.logging.activity_capacity);
        Self {
            config,
            log,
            printed: 0,
        }
    }

    pub fn client(&self) -> anyhow::Result<GeminiClient> {
        Ok(GeminiClient::new(self.config.api.clone())?)
    }

    /// Key from `--api-key`, else the environment, else a terminal prompt.
    pub fn credentials(&mut self, api_key: Option<String>) -> anyhow::Result<CredentialState> {
        let state = match api_key {
            Some(key) => CredentialState::acquire(&ManualEntry::with_key(key)),
            None => match CredentialState::acquire(&HostProvided::new()) {
                Ok(state) => Ok(state),
                Err(e) if std::io::stdin().is_terminal() => {
                    self.log.warning(format!("No API key in the environment: {e}"));
                    CredentialState::acquire(&ManualEntry::interactive())
                }
                Err(e) => Err(e),
            },
        };
        let state = state.map_err(|e| {
            self.log.error(e.to_string());
            e
        });
        self.print_log();
        Ok(state?)
    }

    /// Ask for a replacement key after the current one was rejected.
    pub fn reacquire(&mut self) -> Option<CredentialState> {
        if !std::io::stdin().is_terminal() {
            self.log
                .info("Pass a working key with --api-key or update GEMINI_API_KEY");
            self.print_log();
            return None;
        }
        match CredentialState::acquire(&ManualEntry::interactive()) {
            Ok(state) => Some(state),
            Err(e) => {
                self.log.error(e.to_string());
                self.print_log();
                None
            }
        }
    }

    /// Print entries appended since the last call.
    pub fn print_log(&mut self) {
        let total = self.log.evicted() + self.log.len() as u64;
        let fresh = (total - self.printed).min(self.log.len() as u64) as usize;
        let skip = self.log.len() - fresh;
        for entry in self.log.since(skip) {
            println!("{}", format_entry(entry));
        }
        self.printed = total;
    }
}

fn format_entry(entry: &LogEntry) -> String {
    let marker = match entry.severity {
        Severity::Info => "    ",
        Severity::Success => "[OK]",
        Severity::Warning => "[!!]",
        Severity::Error => "[XX]",
    };
    format!("{marker} {entry}")
}
