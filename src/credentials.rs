//! API key storage.

use crate::config::config_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable checked for the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Trait for reading and writing the API key - enables mocking for tests.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored key, if any.
    fn get_credential(&self) -> Result<Option<String>>;

    /// Stores a key, replacing any previous one.
    fn set_credential(&self, value: &str) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    api_key: Option<String>,
}

/// Key stored in a TOML file in the config directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store at `<config_dir>/listing-analyzer/credentials.toml`.
    pub fn new() -> Result<Self> {
        let path = config_path("credentials.toml").context("No config directory on this platform")?;
        Ok(Self { path })
    }

    /// Store at an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_credential(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            debug!("No credential file at {}", self.path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credential file: {}", self.path.display()))?;
        let file: CredentialFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse credential file: {}", self.path.display()))?;

        Ok(file.api_key.filter(|k| !k.trim().is_empty()))
    }

    fn set_credential(&self, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            anyhow::bail!("API key must not be empty");
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string(&CredentialFile { api_key: Some(value.to_string()) })
            .context("Failed to encode credential file")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write credential file: {}", self.path.display()))?;

        restrict_permissions(&self.path)?;
        debug!("Stored API key in {}", self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Read-only key from an environment variable.
pub struct EnvCredentialStore {
    var: String,
}

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self::with_var(API_KEY_ENV)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get_credential(&self) -> Result<Option<String>> {
        Ok(std::env::var(&self.var).ok().filter(|k| !k.trim().is_empty()))
    }

    fn set_credential(&self, _value: &str) -> Result<()> {
        anyhow::bail!("{} is read-only; unset it or use `key set`", self.var)
    }
}

/// Environment first, then file. Writes go to the file.
pub struct LayeredCredentials {
    env: EnvCredentialStore,
    file: FileCredentialStore,
}

impl LayeredCredentials {
    pub fn new(env: EnvCredentialStore, file: FileCredentialStore) -> Self {
        Self { env, file }
    }

    /// Default layering: `OPENAI_API_KEY`, then the config directory file.
    pub fn from_default_locations() -> Result<Self> {
        Ok(Self::new(EnvCredentialStore::new(), FileCredentialStore::new()?))
    }

    /// Describes where the active key comes from.
    pub fn source(&self) -> Result<Option<String>> {
        if self.env.get_credential()?.is_some() {
            return Ok(Some(format!("environment ({})", self.env.var)));
        }
        if self.file.get_credential()?.is_some() {
            return Ok(Some(self.file.path().display().to_string()));
        }
        Ok(None)
    }
}

impl CredentialStore for LayeredCredentials {
    fn get_credential(&self) -> Result<Option<String>> {
        match self.env.get_credential()? {
            Some(key) => Ok(Some(key)),
            None => self.file.get_credential(),
        }
    }

    fn set_credential(&self, value: &str) -> Result<()> {
        self.file.set_credential(value)
    }
}

/// Masks a key for display, keeping the first and last four characters.
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
