use async_trait::async_trait;
use domain::{AuthSession, DomainError, SessionStore};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Keeps the session flags in a small JSON file so a restart does not sign
/// the operator out.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<AuthSession>, DomainError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Unexpected(format!(
                    "Failed to read session file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        match serde_json::from_slice::<AuthSession>(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file means signed out
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DomainError::Unexpected(e.to_string()))?;
            }
        }
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| DomainError::Unexpected(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| DomainError::Unexpected(format!("Failed to write session file: {}", e)))
    }
}
