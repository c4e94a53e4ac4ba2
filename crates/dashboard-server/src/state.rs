use application::{
    AuthService, DeletionService, FacetService, RecordService, SummaryService, UploadService,
};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use domain::{AuthSession, ImportHistoryRepository, RecordRepository, SpreadsheetCodec};
use infrastructure::config::DashboardConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Clone, Copy)]
struct IssuedSession {
    session: AuthSession,
    expires_at: Instant,
}

/// Everything a request handler needs. Filter state travels with each
/// request, so nothing here is per-dashboard.
pub struct AppState {
    pub records: RecordService,
    pub summary: SummaryService,
    pub facets: FacetService,
    pub uploads: UploadService,
    pub deletions: DeletionService,
    pub auth: AuthService,
    pub dashboard: DashboardConfig,
    sessions: RwLock<HashMap<String, IssuedSession>>,
    session_ttl: Duration,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn RecordRepository>,
        history: Arc<dyn ImportHistoryRepository>,
        codec: Arc<dyn SpreadsheetCodec>,
        auth: AuthService,
        dashboard: DashboardConfig,
    ) -> Self {
        let tracking = dashboard.status_tracking;
        Self {
            records: RecordService::new(repo.clone(), codec.clone(), tracking),
            summary: SummaryService::new(repo.clone(), tracking),
            facets: FacetService::new(repo.clone(), dashboard.server_aggregation),
            uploads: UploadService::new(repo.clone(), history.clone(), codec),
            deletions: DeletionService::new(repo, history),
            auth,
            dashboard,
            sessions: RwLock::new(HashMap::new()),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Register a session and hand back its bearer token. Expired tokens
    /// are dropped on the way.
    pub async fn issue_token(&self, session: AuthSession) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Instant::now();
        let issued = IssuedSession {
            session,
            expires_at: now + self.session_ttl,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, issued| issued.expires_at > now);
        let expired = before - sessions.len();
        sessions.insert(token.clone(), issued);

        debug!(admin = session.is_admin, expired, "Issued session token");
        token
    }

    /// Session for the request's bearer token; anonymous if there is none
    /// or it has expired.
    pub async fn session(&self, headers: &HeaderMap) -> AuthSession {
        let Some(token) = bearer_token(headers) else {
            return AuthSession::anonymous();
        };
        match self.sessions.read().await.get(token) {
            Some(issued) if issued.expires_at > Instant::now() => issued.session,
            _ => AuthSession::anonymous(),
        }
    }

    /// Tokens issued and not yet pruned.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn revoke(&self, headers: &HeaderMap) -> bool {
        match bearer_token(headers) {
            Some(token) => self.sessions.write().await.remove(token).is_some(),
            None => false,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
