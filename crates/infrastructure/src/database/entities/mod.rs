pub mod bin_records;
pub mod import_history;
