mod entity;
mod import_history;
mod repository;
mod status;
mod table_type;
mod week_label;

pub use entity::{BinRecord, NewBinRecord};
pub use import_history::{ImportHistory, NewImportHistory};
pub use repository::{ImportHistoryRepository, RecordRepository};
pub use status::{BinStatus, StatusTracking};
pub use table_type::TableType;
pub use week_label::WeekLabel;
