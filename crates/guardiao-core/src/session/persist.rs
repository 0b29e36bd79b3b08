//! On-disk session persistence.
//!
//! The signed-in session lives in `<home>/session.json` with restricted
//! permissions (0600). Tokens are never logged or displayed in full.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Session;

/// Session record written after a successful sign-in or sign-up.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub signed_in_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn session(&self) -> Session {
        Session {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("id_token", &mask_token(&self.id_token))
            .field("expires_at", &self.expires_at)
            .field("signed_in_at", &self.signed_in_at)
            .finish_non_exhaustive()
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}

/// Handle to the session file.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session.
    /// Returns `None` if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .map(Some)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))
    }

    /// Loads the stored session, treating an unreadable file as signed out.
    pub fn load_or_discard(&self) -> Option<StoredSession> {
        match self.load() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "session file unreadable, starting signed out");
                None
            }
        }
    }

    /// Saves the session with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, stored: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(stored).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Removes the stored session. Returns whether one existed.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}
