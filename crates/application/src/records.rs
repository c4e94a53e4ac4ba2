use chrono::NaiveDate;
use domain::spreadsheet::export_file_name;
use domain::{
    BinRecord, BinStatus, DomainError, FilterState, Page, PageRequest, RecordRepository,
    SpreadsheetCodec, StatusTracking, TableType,
};
use std::sync::Arc;
use tracing::{debug, info};

/// An encoded export ready to be downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

/// Read and status-update use cases over one record store.
pub struct RecordService {
    repo: Arc<dyn RecordRepository>,
    codec: Arc<dyn SpreadsheetCodec>,
    tracking: StatusTracking,
}

impl RecordService {
    pub fn new(
        repo: Arc<dyn RecordRepository>,
        codec: Arc<dyn SpreadsheetCodec>,
        tracking: StatusTracking,
    ) -> Self {
        Self {
            repo,
            codec,
            tracking,
        }
    }

    pub fn tracking(&self) -> StatusTracking {
        self.tracking
    }

    /// Fetch one page. A page past the end is clamped to the last page and
    /// fetched again.
    pub async fn page(
        &self,
        table: TableType,
        filter: &FilterState,
        request: PageRequest,
    ) -> Result<Page<BinRecord>, DomainError> {
        let fetched = self.repo.fetch_page(table, filter, request.range()).await?;
        let clamped = request.clamp_to(fetched.total);
        if clamped == request {
            return Ok(Page::new(request, fetched));
        }

        debug!(%table, requested = request.number(), page = clamped.number(), "Clamping page beyond the last one");
        let fetched = self.repo.fetch_page(table, filter, clamped.range()).await?;
        Ok(Page::new(clamped, fetched))
    }

    /// Encode every row matching `filter`, ignoring pagination.
    pub async fn export(
        &self,
        table: TableType,
        filter: &FilterState,
        today: NaiveDate,
    ) -> Result<ExportFile, DomainError> {
        let records = self.repo.fetch_all(table, filter).await?;
        let bytes = self.codec.encode(&records)?;
        let file_name = export_file_name(table, today);
        info!(%table, rows = records.len(), file = %file_name, "Exported records");
        Ok(ExportFile {
            file_name,
            bytes,
            rows: records.len(),
        })
    }

    /// Move one record to `status`. Any state may go to any state.
    pub async fn update_status(
        &self,
        table: TableType,
        id: &str,
        status: BinStatus,
    ) -> Result<BinRecord, DomainError> {
        if !self.tracking.is_tracked(table) {
            return Err(DomainError::StatusNotTracked(table));
        }
        let record = self.repo.update_status(table, id, status).await?;
        info!(%table, id, status = %status, "Record status updated");
        Ok(record)
    }
}
