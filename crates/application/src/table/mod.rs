mod data_table;

pub use data_table::{DataTable, TableSnapshot};
