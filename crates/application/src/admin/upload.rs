use domain::{
    DomainError, ImportHistory, ImportHistoryRepository, NewImportHistory, RecordRepository,
    SpreadsheetCodec, TableType, WeekLabel,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::filter::FilterContext;

/// One spreadsheet submitted by an administrator.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub table: TableType,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub week_label: String,
    /// Defaults to the first sheet
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub table: TableType,
    pub week_label: WeekLabel,
    pub inserted: u64,
    /// `false` when the rows were stored but the audit entry was not
    pub history_recorded: bool,
}

pub struct UploadService {
    records: Arc<dyn RecordRepository>,
    history: Arc<dyn ImportHistoryRepository>,
    codec: Arc<dyn SpreadsheetCodec>,
    context: Option<FilterContext>,
}

impl UploadService {
    pub fn new(
        records: Arc<dyn RecordRepository>,
        history: Arc<dyn ImportHistoryRepository>,
        codec: Arc<dyn SpreadsheetCodec>,
    ) -> Self {
        Self {
            records,
            history,
            codec,
            context: None,
        }
    }

    /// Bump this context's data revision after every successful import.
    pub fn with_context(mut self, context: FilterContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Sheet names for the sheet selector.
    pub fn list_sheets(&self, bytes: &[u8]) -> Result<Vec<String>, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::MissingFile);
        }
        self.codec.sheet_names(bytes)
    }

    /// Decode, insert, then record the import.
    ///
    /// Nothing is written when the file or week label is missing or any row
    /// fails to parse. Insert and history append are separate writes; a
    /// failed append is logged and reported in the outcome.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, DomainError> {
        if request.bytes.is_empty() {
            return Err(DomainError::MissingFile);
        }
        let week = WeekLabel::new(request.week_label)?;
        let table = request.table;

        let parsed = self
            .codec
            .decode(&request.bytes, &week, request.sheet.as_deref())?;
        if !parsed.errors.is_empty() {
            warn!(%table, file = %request.file_name, failed = parsed.errors.len(), "Rejecting upload with unparseable rows");
            return Err(DomainError::ParseFailed {
                errors: parsed.errors,
            });
        }

        let inserted = if parsed.records.is_empty() {
            0
        } else {
            self.records.insert_batch(table, parsed.records).await?
        };
        info!(%table, week = %week, file = %request.file_name, inserted, "Imported records");

        let entry = NewImportHistory::completed(request.file_name, table, week.clone(), inserted);
        let history_recorded = match self.history.append(entry).await {
            Ok(_) => true,
            Err(e) => {
                warn!(%table, week = %week, error = %e, "Records imported but history entry failed");
                false
            }
        };

        if let Some(context) = &self.context {
            context.notify_data_changed();
        }

        Ok(UploadOutcome {
            table,
            week_label: week,
            inserted,
            history_recorded,
        })
    }

    /// Past imports for the table, newest first.
    pub async fn import_history(&self, table: TableType) -> Result<Vec<ImportHistory>, DomainError> {
        self.history.list(table).await
    }
}
