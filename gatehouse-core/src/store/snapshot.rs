use std::path::PathBuf;
use tracing::{info, warn};

use super::tables::Tables;
use crate::error::{RbacError, RbacResult};

/// YAML file holding the full store state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn error(&self, message: impl ToString) -> RbacError {
        RbacError::Persistence {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Loads the snapshot, or `None` if there is no file yet.
    pub async fn load(&self) -> RbacResult<Option<Tables>> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.error(e))?;
        if !exists {
            warn!(
                "Store snapshot not found at {}, starting empty",
                self.path.display()
            );
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.error(e))?;
        let tables: Tables = serde_norway::from_str(&content).map_err(|e| self.error(e))?;

        info!(
            "Loaded store snapshot from {} ({} users, {} roles, {} permissions)",
            self.path.display(),
            tables.users.len(),
            tables.roles.len(),
            tables.permissions.len()
        );
        Ok(Some(tables))
    }

    /// Writes to a sibling temp file first and renames it over the snapshot,
    /// so a failed write never leaves a truncated file behind.
    pub async fn save(&self, tables: &Tables) -> RbacResult<()> {
        let yaml = serde_norway::to_string(tables).map_err(|e| self.error(e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.error(e))?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, yaml)
            .await
            .map_err(|e| self.error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.error(e))?;
        Ok(())
    }
}
