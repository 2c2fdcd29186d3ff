use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use dialoguer::Password;

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::ports::{CredentialBroker, TokenKind};

/// Overrides the directory holding `credentials.json`.
const CONFIG_DIR_ENV: &str = "GH_SYNC_CONFIG_DIR";

/// Checks if both stdin and stdout are connected to a terminal.
pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> SyncError {
    SyncError::Credentials(format!("could not {action} {}: {err}", path.display()))
}

/// Plain JSON map of token keys to values, readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$GH_SYNC_CONFIG_DIR/credentials.json`, else the platform config
    /// directory (`~/.config/gh-sync/credentials.json` on Linux).
    pub fn default_location() -> SyncResult<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| {
                    SyncError::Credentials(
                        "could not determine configuration directory".to_string(),
                    )
                })?
                .join("gh-sync"),
        };
        Ok(Self::new(dir.join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> SyncResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| io_error("read", &self.path, &e))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            SyncError::Credentials(format!(
                "invalid credential file {}: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> SyncResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, &e))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json).map_err(|e| io_error("write", &self.path, &e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| io_error("restrict permissions on", &self.path, &e))?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> SyncResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> SyncResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, key: &str) -> SyncResult<bool> {
        let mut entries = self.load()?;
        let removed = entries.remove(key).is_some();
        if removed {
            self.save(&entries)?;
        }
        Ok(removed)
    }
}

/// Resolves tokens from the environment, then the credential file, then an
/// interactive prompt whose answer is saved for next time.
#[derive(Debug, Clone)]
pub struct LocalCredentialBroker {
    store: FileCredentialStore,
    interactive: bool,
}

impl LocalCredentialBroker {
    pub fn new(store: FileCredentialStore) -> Self {
        Self {
            store,
            interactive: is_interactive_terminal(),
        }
    }

    /// Force prompting on or off regardless of the terminal.
    #[must_use]
    pub const fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    fn from_env(kind: TokenKind) -> Option<String> {
        std::env::var(kind.env_var())
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn prompt(kind: TokenKind) -> SyncResult<String> {
        let token = Password::new()
            .with_prompt(kind.prompt())
            .interact()
            .map_err(|e| SyncError::Credentials(format!("prompt for {kind} failed: {e}")))?;
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(SyncError::Credentials(format!("no {kind} was entered")));
        }
        Ok(token)
    }
}

impl CredentialBroker for LocalCredentialBroker {
    fn get_token(&self, kind: TokenKind) -> SyncResult<String> {
        if let Some(token) = Self::from_env(kind) {
            tracing::debug!(%kind, source = kind.env_var(), "Using token from environment");
            return Ok(token);
        }
        if let Some(token) = self.store.get(kind.key())? {
            tracing::debug!(%kind, path = %self.store.path().display(), "Using stored token");
            return Ok(token);
        }
        if !self.interactive {
            return Err(SyncError::Credentials(format!(
                "no {kind} found; set {} or run interactively to be prompted",
                kind.env_var()
            )));
        }
        let token = Self::prompt(kind)?;
        self.store.set(kind.key(), &token)?;
        Ok(token)
    }

    fn invalidate(&self, kind: TokenKind) -> SyncResult<()> {
        if self.store.remove(kind.key())? {
            tracing::warn!(%kind, "Removed stored token after it was rejected");
        } else if Self::from_env(kind).is_some() {
            tracing::warn!(
                %kind,
                variable = kind.env_var(),
                "Token from the environment was rejected"
            );
        }
        Ok(())
    }
}
