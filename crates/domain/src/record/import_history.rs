use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TableType, WeekLabel};

/// Audit row appended after every successful bulk ingestion. Never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportHistory {
    pub id: String,
    pub file_name: String,
    pub table_type: TableType,
    pub week_label: WeekLabel,
    pub total_rows: u64,
    pub success_rows: u64,
    pub failed_rows: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewImportHistory {
    pub file_name: String,
    pub table_type: TableType,
    pub week_label: WeekLabel,
    pub total_rows: u64,
    pub success_rows: u64,
    pub failed_rows: u64,
}

impl NewImportHistory {
    /// History entry for a batch that was inserted in full.
    pub fn completed(
        file_name: impl Into<String>,
        table_type: TableType,
        week_label: WeekLabel,
        inserted: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            table_type,
            week_label,
            total_rows: inserted,
            success_rows: inserted,
            failed_rows: 0,
        }
    }

    pub fn into_history(self, id: String, uploaded_at: DateTime<Utc>) -> ImportHistory {
        ImportHistory {
            id,
            file_name: self.file_name,
            table_type: self.table_type,
            week_label: self.week_label,
            total_rows: self.total_rows,
            success_rows: self.success_rows,
            failed_rows: self.failed_rows,
            uploaded_at,
        }
    }
}
