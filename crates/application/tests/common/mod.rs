#![allow(dead_code)]

use application::{FilterContext, RecordService};
use async_trait::async_trait;
use domain::{
    BinRecord, BinStatus, DomainError, FacetScope, FilterState, NewBinRecord, PageRange,
    RecordColumn, RecordPage, RecordRepository, StatusTracking, TableType, WeekLabel,
};
use infrastructure::{InMemoryRecordStore, XlsxCodec};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

pub fn week(label: &str) -> WeekLabel {
    WeekLabel::new(label).unwrap()
}

/// Five pending rows over two hubs and two weeks, plus two compensation rows.
pub async fn seeded_store() -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    let w1 = week("Week 1");
    let w2 = week("Week 2");

    let mut bin_001 = NewBinRecord::new("BIN-001", w1.clone())
        .with_hub("HUB A")
        .with_employee("Nguyen Van A")
        .with_customer("Cong ty ABC")
        .with_reference_of_so("SO-100");
    bin_001.employee_id = Some(1001);

    let pending = vec![
        bin_001,
        NewBinRecord::new("BIN-002", w1.clone())
            .with_hub("HUB A")
            .with_employee("Tran Thi B")
            .with_customer("Khach Le"),
        NewBinRecord::new("BIN-003", w2.clone())
            .with_hub("HUB B")
            .with_employee("Le Van C")
            .with_customer("abc Trading"),
        NewBinRecord::new("BIN-004", w2.clone())
            .with_hub("HUB B")
            .with_employee("Pham Thi D")
            .with_reference_of_so("so-abc-9"),
        NewBinRecord::new("BIN-005", w2.clone()),
    ];
    store.insert_batch(TableType::Pending, pending).await.unwrap();

    let compensation = vec![
        NewBinRecord::new("CMP-001", w1.clone())
            .with_hub("HUB A")
            .with_employee("Nguyen Van A"),
        NewBinRecord::new("CMP-002", w1)
            .with_hub("HUB C")
            .with_employee("Hoang Van E"),
    ];
    store
        .insert_batch(TableType::Compensation, compensation)
        .await
        .unwrap();

    store
}

/// `count` pending rows in one hub and week.
pub async fn bulk_store(count: usize) -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    let rows = (0..count)
        .map(|i| NewBinRecord::new(format!("BIN-{i:04}"), week("Week 1")).with_hub("HUB A"))
        .collect();
    store.insert_batch(TableType::Pending, rows).await.unwrap();
    store
}

pub fn record_service(repo: Arc<dyn RecordRepository>) -> Arc<RecordService> {
    Arc::new(RecordService::new(
        repo,
        Arc::new(XlsxCodec::new()),
        StatusTracking::default(),
    ))
}

pub fn context() -> FilterContext {
    FilterContext::new()
}

/// Wraps a store and parks selected calls until released.
///
/// `fetch_page` is held whenever the filter selects `hold_hub`; `update_status`
/// is held while `hold_updates` is set.
pub struct GatedStore {
    pub inner: InMemoryRecordStore,
    pub hold_hub: String,
    pub hold_updates: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub fn new(inner: InMemoryRecordStore, hold_hub: &str) -> Self {
        Self {
            inner,
            hold_hub: hold_hub.to_string(),
            hold_updates: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    async fn park(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[async_trait]
impl RecordRepository for GatedStore {
    async fn fetch_page(
        &self,
        table: TableType,
        filter: &FilterState,
        range: PageRange,
    ) -> Result<RecordPage<BinRecord>, DomainError> {
        if filter.hub() == Some(self.hold_hub.as_str()) {
            self.park().await;
        }
        self.inner.fetch_page(table, filter, range).await
    }

    async fn fetch_all(
        &self,
        table: TableType,
        filter: &FilterState,
    ) -> Result<Vec<BinRecord>, DomainError> {
        self.inner.fetch_all(table, filter).await
    }

    async fn count(&self, table: TableType, filter: &FilterState) -> Result<u64, DomainError> {
        self.inner.count(table, filter).await
    }

    async fn count_distinct(
        &self,
        table: TableType,
        filter: &FilterState,
        column: RecordColumn,
    ) -> Result<u64, DomainError> {
        self.inner.count_distinct(table, filter, column).await
    }

    async fn distinct_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError> {
        self.inner.distinct_values(table, column, scope).await
    }

    async fn column_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError> {
        self.inner.column_values(table, column, scope).await
    }

    async fn update_status(
        &self,
        table: TableType,
        id: &str,
        status: BinStatus,
    ) -> Result<BinRecord, DomainError> {
        if self.hold_updates.load(Ordering::SeqCst) {
            self.park().await;
        }
        self.inner.update_status(table, id, status).await
    }

    async fn insert_batch(
        &self,
        table: TableType,
        records: Vec<NewBinRecord>,
    ) -> Result<u64, DomainError> {
        self.inner.insert_batch(table, records).await
    }

    async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError> {
        RecordRepository::delete_week(&self.inner, table, week).await
    }
}
