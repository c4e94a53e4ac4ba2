//! Infrastructure layer - External integrations

pub mod config;
pub mod database;
pub mod repositories;
pub mod spreadsheet;

pub use config::AppConfig;
pub use database::{InMemoryRecordStore, SeaOrmImportHistoryRepository, SeaOrmRecordRepository};
pub use repositories::FileSessionStore;
pub use spreadsheet::XlsxCodec;
