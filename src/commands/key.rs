//! API key management command.

use crate::credentials::{mask, CredentialStore, LayeredCredentials};
use anyhow::Result;

/// Stores and inspects the API key.
pub struct KeyCommand {
    credentials: LayeredCredentials,
}

impl KeyCommand {
    pub fn new(credentials: LayeredCredentials) -> Self {
        Self { credentials }
    }

    /// Saves a new key.
    pub fn set(&self, value: &str) -> Result<String> {
        self.credentials.set_credential(value)?;
        Ok(format!("API key saved ({}).", mask(value.trim())))
    }

    /// Reports whether a key is configured and where it comes from.
    pub fn status(&self) -> Result<String> {
        match (self.credentials.get_credential()?, self.credentials.source()?) {
            (Some(key), Some(source)) => Ok(format!("API key {} from {}", mask(&key), source)),
            _ => Ok("No API key configured. Run `listing-analyzer key set <KEY>` or set OPENAI_API_KEY."
                .to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{EnvCredentialStore, FileCredentialStore};
    use tempfile::TempDir;

    fn command(dir: &TempDir) -> KeyCommand {
        KeyCommand::new(LayeredCredentials::new(
            EnvCredentialStore::with_var("LISTING_ANALYZER_TEST_KEY_COMMAND"),
            FileCredentialStore::with_path(dir.path().join("credentials.toml")),
        ))
    }

    #[test]
    fn test_status_without_key() {
        let dir = TempDir::new().unwrap();
        let output = command(&dir).status().unwrap();
        assert!(output.contains("No API key configured"));
    }

    #[test]
    fn test_set_then_status() {
        let dir = TempDir::new().unwrap();
        let cmd = command(&dir);

        let output = cmd.set("sk-proj-abcdefgh1234").unwrap();
        assert_eq!(output, "API key saved (sk-p...1234).");

        let status = cmd.status().unwrap();
        assert!(status.contains("sk-p...1234"));
        assert!(status.contains("credentials.toml"));
        assert!(!status.contains("abcdefgh"));
    }

    #[test]
    fn test_set_empty_fails() {
        let dir = TempDir::new().unwrap();
        assert!(command(&dir).set("").is_err());
    }
}
