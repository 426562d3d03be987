//! Credentials for cloud backends.
//!
//! Tokens come from the environment or from an account file saved with
//! `grover auth save`. The account file lives at `~/.grover/account.json`
//! and is written with mode `0600` on Unix.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HalError, HalResult};

/// Which IBM service an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// IBM Quantum Platform, bearer API token.
    #[default]
    IbmQuantum,
    /// IBM Cloud, IAM API key plus service CRN.
    IbmCloud,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::IbmQuantum => f.write_str("ibm_quantum"),
            Channel::IbmCloud => f.write_str("ibm_cloud"),
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ibm_quantum" => Ok(Channel::IbmQuantum),
            "ibm_cloud" => Ok(Channel::IbmCloud),
            other => Err(HalError::Configuration(format!(
                "unknown channel '{other}' (expected ibm_quantum or ibm_cloud)"
            ))),
        }
    }
}

/// A saved account.
#[derive(Clone, Serialize, Deserialize)]
pub struct SavedAccount {
    pub channel: Channel,
    pub token: String,
    /// Service CRN for `ibm_cloud` accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SavedAccount {
    pub fn new(channel: Channel, token: impl Into<String>) -> Self {
        Self {
            channel,
            token: token.into(),
            instance: None,
            url: None,
        }
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The token with all but its last four characters masked.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        let visible = chars.len().saturating_sub(4);
        let tail: String = chars[visible..].iter().collect();
        format!("{}{tail}", "*".repeat(visible.min(12)))
    }
}

impl std::fmt::Debug for SavedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedAccount")
            .field("channel", &self.channel)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("url", &self.url)
            .finish()
    }
}

/// On-disk account file.
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Store backed by `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.grover/account.json`.
    pub fn default_location() -> HalResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| HalError::Auth("Cannot determine home directory".into()))?;
        Ok(Self::at(home.join(".grover").join("account.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the account. An existing file is only replaced when
    /// `overwrite` is set.
    pub fn save(&self, account: &SavedAccount, overwrite: bool) -> HalResult<()> {
        if self.exists() && !overwrite {
            return Err(HalError::AccountExists(self.path.clone()));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| HalError::Auth(format!("Failed to create account directory: {e}")))?;
        }

        let json = serde_json::to_string_pretty(account)?;
        std::fs::write(&self.path, json)
            .map_err(|e| HalError::Auth(format!("Failed to write account file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| HalError::Auth(format!("Failed to set permissions: {e}")))?;
        }

        debug!("Saved {} account to {}", account.channel, self.path.display());
        Ok(())
    }

    /// Read the account, `None` if no file exists.
    pub fn load(&self) -> HalResult<Option<SavedAccount>> {
        if !self.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| HalError::Auth(format!("Failed to read account file: {e}")))?;
        let account = serde_json::from_str(&content)
            .map_err(|e| HalError::Auth(format!("Malformed account file {}: {e}", self.path.display())))?;
        Ok(Some(account))
    }

    /// Remove the account file. Returns whether one existed.
    pub fn delete(&self) -> HalResult<bool> {
        if !self.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)
            .map_err(|e| HalError::Auth(format!("Failed to delete account file: {e}")))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::at(dir.path().join("nested").join("account.json"));
        assert!(store.load().unwrap().is_none());

        let account = SavedAccount::new(Channel::IbmQuantum, "abc123");
        store.save(&account, false).unwrap();
        assert!(store.exists());

        let again = SavedAccount::new(Channel::IbmCloud, "def456").with_instance("crn:v1:x");
        assert!(matches!(
            store.save(&again, false),
            Err(HalError::AccountExists(_))
        ));
        store.save(&again, true).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.channel, Channel::IbmCloud);
        assert_eq!(loaded.token, "def456");
        assert_eq!(loaded.instance.as_deref(), Some("crn:v1:x"));

        assert!(store.delete().unwrap());
        assert!(!store.delete().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_account_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::at(dir.path().join("account.json"));
        store
            .save(&SavedAccount::new(Channel::IbmQuantum, "t"), false)
            .unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_masked_token_and_debug() {
        let account = SavedAccount::new(Channel::IbmQuantum, "supersecrettoken");
        assert_eq!(account.masked_token(), "************oken");
        assert!(!format!("{account:?}").contains("supersecret"));
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("ibm_cloud".parse::<Channel>().unwrap(), Channel::IbmCloud);
        assert_eq!(Channel::IbmQuantum.to_string(), "ibm_quantum");
        assert!("ibm-oslo".parse::<Channel>().is_err());
    }
}
