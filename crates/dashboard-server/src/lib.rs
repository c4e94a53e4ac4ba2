pub mod api;
pub mod state;

use application::AuthService;
use infrastructure::{
    AppConfig, InMemoryRecordStore, SeaOrmImportHistoryRepository, SeaOrmRecordRepository,
    XlsxCodec,
};
use sea_orm::DatabaseConnection;
use state::AppState;
use std::sync::Arc;

fn auth_service(config: &AppConfig) -> AuthService {
    AuthService::new(
        config.auth.app_password.clone(),
        config.auth.admin_password.clone(),
    )
}

/// State backed by the SQL store.
pub fn setup_app_state(db: DatabaseConnection, config: &AppConfig) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(SeaOrmRecordRepository::new(db.clone())),
        Arc::new(SeaOrmImportHistoryRepository::new(db)),
        Arc::new(XlsxCodec::new()),
        auth_service(config),
        config.dashboard.clone(),
    )
    .with_session_ttl(config.auth.session_ttl()))
}

/// State backed by a process-local store; data is lost on exit.
pub fn in_memory_app_state(config: &AppConfig) -> Arc<AppState> {
    let store = Arc::new(
        InMemoryRecordStore::new().with_aggregation(config.dashboard.server_aggregation),
    );
    Arc::new(AppState::new(
        store.clone(),
        store,
        Arc::new(XlsxCodec::new()),
        auth_service(config),
        config.dashboard.clone(),
    )
    .with_session_ttl(config.auth.session_ttl()))
}
