use config::{Config, ConfigError, Environment, File};
use domain::StatusTracking;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Falls back to `DATABASE_URL` when unset
    pub url: Option<String>,
}

/// Shared secrets for the two privilege levels. An empty secret disables
/// that login.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub app_password: String,
    #[serde(default)]
    pub admin_password: String,
    /// Lifetime of an issued bearer token
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u64,
}

fn default_session_ttl_minutes() -> u64 {
    12 * 60
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes * 60)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app_password: String::new(),
            admin_password: String::new(),
            session_ttl_minutes: default_session_ttl_minutes(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashboardConfig {
    /// Pause after a successful status change before re-reading page and counts
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
    /// Use the store's distinct-value aggregation when it has one
    #[serde(default = "default_server_aggregation")]
    pub server_aggregation: bool,
    #[serde(default)]
    pub status_tracking: StatusTracking,
}

fn default_refresh_delay_ms() -> u64 {
    500
}
fn default_server_aggregation() -> bool {
    true
}

impl DashboardConfig {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_delay_ms: default_refresh_delay_ms(),
            server_aggregation: default_server_aggregation(),
            status_tracking: StatusTracking::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: String,
}

fn default_session_path() -> String {
    "data/session.json".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default settings
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            // Shared defaults, e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. BINTRACK__AUTH__ADMIN_PASSWORD=...)
            .add_source(Environment::with_prefix("BINTRACK").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Configured URL, else `DATABASE_URL`.
    pub fn database_url(&self) -> Option<String> {
        self.database
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| std::env::var("DATABASE_URL").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_defaults() {
        let dashboard = DashboardConfig::default();
        assert_eq!(dashboard.refresh_delay(), Duration::from_millis(500));
        assert!(dashboard.server_aggregation);
        assert!(dashboard.status_tracking.pending);
        assert!(dashboard.status_tracking.compensation);
    }

    #[test]
    fn test_load_from_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
            [server]
            port = 8081

            [auth]
            app_password = "staff"
            admin_password = "boss"

            [dashboard]
            refresh_delay_ms = 250
            status_tracking = { pending = true, compensation = false }
            "#,
        )
        .unwrap();

        let config = AppConfig::load(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.admin_password, "boss");
        assert_eq!(config.auth.session_ttl(), Duration::from_secs(12 * 60 * 60));
        assert_eq!(config.dashboard.refresh_delay_ms, 250);
        assert!(!config.dashboard.status_tracking.compensation);
        assert_eq!(config.session.path, "data/session.json");
    }
}
