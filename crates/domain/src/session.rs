use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Two-level session: a signed-in user, optionally with admin rights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub is_authenticated: bool,
    pub is_admin: bool,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user() -> Self {
        Self {
            is_authenticated: true,
            is_admin: false,
        }
    }

    pub fn admin() -> Self {
        Self {
            is_authenticated: true,
            is_admin: true,
        }
    }

    /// Read path: filter panel, summary, data table.
    pub fn require_user(&self) -> Result<(), DomainError> {
        if self.is_authenticated {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    /// Write path: upload and week deletion.
    pub fn require_admin(&self) -> Result<(), DomainError> {
        self.require_user()?;
        if self.is_admin {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

/// Persistence for the session flags so they survive restarts.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<AuthSession>, DomainError>;
    async fn save(&self, session: &AuthSession) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_rejected_everywhere() {
        let session = AuthSession::anonymous();
        assert_eq!(session.require_user(), Err(DomainError::Unauthorized));
        assert_eq!(session.require_admin(), Err(DomainError::Unauthorized));
    }

    #[test]
    fn test_user_is_not_admin() {
        let session = AuthSession::user();
        assert!(session.require_user().is_ok());
        assert_eq!(session.require_admin(), Err(DomainError::Forbidden));
    }

    #[test]
    fn test_admin_passes_both_gates() {
        let session = AuthSession::admin();
        assert!(session.require_user().is_ok());
        assert!(session.require_admin().is_ok());
    }
}
