use domain::{AuthSession, DomainError, SessionStore};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::lock;

/// Checks the two shared secrets. An empty secret disables that login.
#[derive(Debug, Clone)]
pub struct AuthService {
    app_password: String,
    admin_password: String,
}

impl AuthService {
    pub fn new(app_password: impl Into<String>, admin_password: impl Into<String>) -> Self {
        Self {
            app_password: app_password.into(),
            admin_password: admin_password.into(),
        }
    }

    pub fn login(&self, password: &str) -> Result<AuthSession, DomainError> {
        if secret_matches(&self.app_password, password) {
            Ok(AuthSession::user())
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }

    pub fn login_as_admin(&self, password: &str) -> Result<AuthSession, DomainError> {
        if secret_matches(&self.admin_password, password) {
            Ok(AuthSession::admin())
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }

    pub fn authenticate(&self, password: &str, admin: bool) -> Result<AuthSession, DomainError> {
        if admin {
            self.login_as_admin(password)
        } else {
            self.login(password)
        }
    }
}

fn secret_matches(secret: &str, candidate: &str) -> bool {
    !secret.is_empty() && secret == candidate
}

/// The operator's session, persisted across restarts.
pub struct AuthState {
    service: AuthService,
    store: Arc<dyn SessionStore>,
    session: Mutex<AuthSession>,
}

impl AuthState {
    /// Start from whatever session the store holds, signed out if none.
    pub async fn restore(
        service: AuthService,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, DomainError> {
        let session = store.load().await?.unwrap_or_default();
        Ok(Self {
            service,
            store,
            session: Mutex::new(session),
        })
    }

    pub fn session(&self) -> AuthSession {
        *lock(&self.session)
    }

    pub async fn login(&self, password: &str) -> Result<AuthSession, DomainError> {
        let session = self.service.login(password)?;
        self.set(session).await?;
        info!("User signed in");
        Ok(session)
    }

    pub async fn login_as_admin(&self, password: &str) -> Result<AuthSession, DomainError> {
        let session = self.service.login_as_admin(password)?;
        self.set(session).await?;
        info!("Administrator signed in");
        Ok(session)
    }

    pub async fn logout(&self) -> Result<(), DomainError> {
        self.set(AuthSession::anonymous()).await?;
        info!("Signed out");
        Ok(())
    }

    pub fn require_user(&self) -> Result<(), DomainError> {
        self.session().require_user()
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        self.session().require_admin()
    }

    async fn set(&self, session: AuthSession) -> Result<(), DomainError> {
        self.store.save(&session).await?;
        *lock(&self.session) = session;
        Ok(())
    }
}
