//! TOML-file-backed role store.
//!
//! The "current actor role" is written once at login by the surrounding
//! application and read once per scan session. The file lives under the
//! platform config directory (`<config_dir>/scanflow/role.toml`).

use async_trait::async_trait;
use scanflow_core::actor::{ActorRole, RoleStore};
use scanflow_core::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct RoleFile {
    role: ActorRole,
}

/// Role store persisting to a single TOML file.
pub struct TomlRoleStore {
    path: PathBuf,
}

impl TomlRoleStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default platform location,
    /// `<config_dir>/scanflow/role.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ScanError::internal("cannot find config directory"))?;
        Ok(Self::new(config_dir.join("scanflow").join("role.toml")))
    }

    /// Persists the role. Called by the login flow, never by the scan
    /// workflow itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written.
    pub fn save_role(&self, role: ActorRole) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ScanError::internal(format!(
                    "failed to create config directory {:?}: {}",
                    parent, e
                ))
            })?;
        }
        let content = toml::to_string_pretty(&RoleFile { role })
            .map_err(|e| ScanError::internal(format!("failed to serialize role: {}", e)))?;
        fs::write(&self.path, content).map_err(|e| {
            ScanError::internal(format!("failed to write role file {:?}: {}", self.path, e))
        })?;
        tracing::debug!(?role, path = ?self.path, "actor role persisted");
        Ok(())
    }
}

#[async_trait]
impl RoleStore for TomlRoleStore {
    /// Reads the persisted role.
    ///
    /// A missing, empty or unparsable file yields
    /// [`ScanError::RoleUnavailable`] — the caller treats all three the
    /// same way (the user has not completed login on this device).
    async fn current_role(&self) -> Result<ActorRole> {
        if !self.path.exists() {
            return Err(ScanError::RoleUnavailable);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            ScanError::internal(format!("failed to read role file {:?}: {}", self.path, e))
        })?;
        if content.trim().is_empty() {
            return Err(ScanError::RoleUnavailable);
        }
        match toml::from_str::<RoleFile>(&content) {
            Ok(file) => Ok(file.role),
            Err(err) => {
                tracing::warn!(path = ?self.path, error = %err, "unreadable role file");
                Err(ScanError::RoleUnavailable)
            }
        }
    }
}
