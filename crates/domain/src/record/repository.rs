use async_trait::async_trait;

use super::{BinRecord, BinStatus, ImportHistory, NewBinRecord, NewImportHistory, TableType, WeekLabel};
use crate::filter::{FacetScope, FilterState, RecordColumn};
use crate::paging::{PageRange, RecordPage};
use crate::DomainError;

/// Repository interface for BIN records.
///
/// Every call is scoped to one table partition. Implementations must build
/// the same predicate from a [`FilterState`] for every filtered call so that
/// counts, pages and exports agree with each other.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// One page of filtered rows ordered by `created_at` descending, plus the
    /// total number of matching rows before pagination.
    async fn fetch_page(
        &self,
        table: TableType,
        filter: &FilterState,
        range: PageRange,
    ) -> Result<RecordPage<BinRecord>, DomainError>;

    /// Every matching row, same order as `fetch_page`.
    async fn fetch_all(
        &self,
        table: TableType,
        filter: &FilterState,
    ) -> Result<Vec<BinRecord>, DomainError>;

    /// Count-only query; no row data transferred.
    async fn count(&self, table: TableType, filter: &FilterState) -> Result<u64, DomainError>;

    /// Number of distinct non-null values of `column` among matching rows.
    async fn count_distinct(
        &self,
        table: TableType,
        filter: &FilterState,
        column: RecordColumn,
    ) -> Result<u64, DomainError>;

    /// Server-side aggregation of distinct non-null values.
    ///
    /// Stores without an aggregation capability return
    /// [`DomainError::Unsupported`]; callers then fall back to
    /// [`RecordRepository::column_values`].
    async fn distinct_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError>;

    /// All non-null values of `column`, duplicates included.
    async fn column_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError>;

    /// Set the status of exactly one record and return it as stored.
    async fn update_status(
        &self,
        table: TableType,
        id: &str,
        status: BinStatus,
    ) -> Result<BinRecord, DomainError>;

    /// Insert a batch in one write. Returns the number of rows inserted.
    async fn insert_batch(
        &self,
        table: TableType,
        records: Vec<NewBinRecord>,
    ) -> Result<u64, DomainError>;

    /// Physically delete every record of the partition carrying `week`.
    async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError>;
}

/// Repository interface for the append-only import audit trail.
#[async_trait]
pub trait ImportHistoryRepository: Send + Sync {
    async fn append(&self, entry: NewImportHistory) -> Result<ImportHistory, DomainError>;

    /// Newest first.
    async fn list(&self, table: TableType) -> Result<Vec<ImportHistory>, DomainError>;

    async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError>;
}
