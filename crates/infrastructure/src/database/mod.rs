mod import_history_repository;
mod memory_store;
mod record_repository;

pub mod entities;

pub use import_history_repository::SeaOrmImportHistoryRepository;
pub use memory_store::InMemoryRecordStore;
pub use record_repository::SeaOrmRecordRepository;
