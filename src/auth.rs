//! Token Store
//!
//! Persisted operator credentials: the personal access token plus the owner
//! and name of the journal repository. The single human operator logs in
//! once; every submission afterwards reads the stored credentials.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Stored operator credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Personal access token for the git-hosting API
    pub token: String,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl Credentials {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// The `owner/repo` pair for display and logging
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Errors from the credential store
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in. Run `growlog login` first")]
    NotLoggedIn,

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read credentials file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse credentials file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Default on-disk location of the credentials file
pub fn credentials_path() -> Result<PathBuf, AuthError> {
    if let Ok(path) = std::env::var("GROWLOG_CREDENTIALS") {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|p| p.join("growlog").join("credentials.toml"))
        .ok_or(AuthError::NoConfigDir)
}

/// Load credentials from disk.
///
/// `GROWLOG_TOKEN` overrides the stored token, which keeps the file out of
/// the loop entirely when the operator prefers environment-based auth.
pub fn load() -> Result<Credentials, AuthError> {
    let path = credentials_path()?;

    let mut creds: Credentials = if path.exists() {
        let content = std::fs::read_to_string(&path).map_err(|e| AuthError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| AuthError::Parse {
            path: path.clone(),
            error: e.to_string(),
        })?
    } else {
        // No file: environment-only login still works if everything is set
        match (
            std::env::var("GROWLOG_TOKEN"),
            std::env::var("GROWLOG_OWNER"),
            std::env::var("GROWLOG_REPO"),
        ) {
            (Ok(token), Ok(owner), Ok(repo)) => Credentials::new(token, owner, repo),
            _ => return Err(AuthError::NotLoggedIn),
        }
    };

    if let Ok(token) = std::env::var("GROWLOG_TOKEN") {
        creds.token = token;
    }

    Ok(creds)
}

/// Persist credentials to disk
pub fn save(creds: &Credentials) -> Result<(), AuthError> {
    let path = credentials_path()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AuthError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
    }

    let content = toml::to_string_pretty(creds).expect("credentials always serialize");
    std::fs::write(&path, content).map_err(|e| AuthError::Io {
        path: path.clone(),
        error: e.to_string(),
    })?;

    tracing::info!("Saved credentials for {} to {:?}", creds.repo_slug(), path);
    Ok(())
}

/// Remove stored credentials. Succeeds when nothing was stored.
pub fn clear() -> Result<(), AuthError> {
    let path = credentials_path()?;
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| AuthError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}
