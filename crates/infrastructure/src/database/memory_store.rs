use async_trait::async_trait;
use chrono::Utc;
use domain::{
    BinRecord, BinStatus, DomainError, FacetScope, FilterState, ImportHistory,
    ImportHistoryRepository, NewBinRecord, NewImportHistory, PageRange, RecordColumn, RecordPage,
    RecordRepository, TableType, WeekLabel,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreData {
    next_seq: u64,
    // (insertion sequence, record)
    records: Vec<(u64, BinRecord)>,
    history: Vec<(u64, ImportHistory)>,
}

/// Process-local record store. Used for development, demos and tests; it
/// evaluates filters with [`FilterState::matches`].
#[derive(Clone)]
pub struct InMemoryRecordStore {
    data: Arc<RwLock<StoreData>>,
    aggregation: bool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(StoreData::default())),
            aggregation: true,
        }
    }

    /// Toggle the server-side distinct-value capability. Without it
    /// `distinct_values` reports `Unsupported`.
    pub fn with_aggregation(mut self, enabled: bool) -> Self {
        self.aggregation = enabled;
        self
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn sorted_matches(&self, table: TableType, filter: &FilterState) -> Vec<BinRecord> {
        let data = self.data.read().await;
        let mut hits: Vec<&(u64, BinRecord)> = data
            .records
            .iter()
            .filter(|(_, r)| r.table_type == table && filter.matches(r))
            .collect();
        // created_at desc, later inserts first on ties
        hits.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        hits.into_iter().map(|(_, r)| r.clone()).collect()
    }

    async fn values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<&FacetScope>,
    ) -> Vec<String> {
        let data = self.data.read().await;
        data.records
            .iter()
            .map(|(_, r)| r)
            .filter(|r| r.table_type == table)
            .filter(|r| scope.is_none_or(|s| s.matches(r)))
            .filter_map(|r| column.value_of(r).map(str::to_string))
            .collect()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordStore {
    async fn fetch_page(
        &self,
        table: TableType,
        filter: &FilterState,
        range: PageRange,
    ) -> Result<RecordPage<BinRecord>, DomainError> {
        let all = self.sorted_matches(table, filter).await;
        let total = all.len() as u64;
        let rows = all
            .into_iter()
            .skip(range.offset as usize)
            .take(range.limit() as usize)
            .collect();
        Ok(RecordPage { rows, total })
    }

    async fn fetch_all(
        &self,
        table: TableType,
        filter: &FilterState,
    ) -> Result<Vec<BinRecord>, DomainError> {
        Ok(self.sorted_matches(table, filter).await)
    }

    async fn count(&self, table: TableType, filter: &FilterState) -> Result<u64, DomainError> {
        let data = self.data.read().await;
        Ok(data
            .records
            .iter()
            .filter(|(_, r)| r.table_type == table && filter.matches(r))
            .count() as u64)
    }

    async fn count_distinct(
        &self,
        table: TableType,
        filter: &FilterState,
        column: RecordColumn,
    ) -> Result<u64, DomainError> {
        let data = self.data.read().await;
        let distinct: BTreeSet<&str> = data
            .records
            .iter()
            .map(|(_, r)| r)
            .filter(|r| r.table_type == table && filter.matches(r))
            .filter_map(|r| column.value_of(r))
            .collect();
        Ok(distinct.len() as u64)
    }

    async fn distinct_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError> {
        if !self.aggregation {
            return Err(DomainError::Unsupported(format!(
                "distinct values of {}",
                column.as_str()
            )));
        }
        let distinct: BTreeSet<String> = self
            .values(table, column, scope.as_ref())
            .await
            .into_iter()
            .collect();
        Ok(distinct.into_iter().collect())
    }

    async fn column_values(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError> {
        Ok(self.values(table, column, scope.as_ref()).await)
    }

    async fn update_status(
        &self,
        table: TableType,
        id: &str,
        status: BinStatus,
    ) -> Result<BinRecord, DomainError> {
        let mut data = self.data.write().await;
        let record = data
            .records
            .iter_mut()
            .map(|(_, r)| r)
            .find(|r| r.id == id && r.table_type == table)
            .ok_or_else(|| DomainError::RecordNotFound(id.to_string()))?;
        record.status = Some(status);
        Ok(record.clone())
    }

    async fn insert_batch(
        &self,
        table: TableType,
        records: Vec<NewBinRecord>,
    ) -> Result<u64, DomainError> {
        let mut data = self.data.write().await;
        let created_at = Utc::now();
        let count = records.len() as u64;
        for record in records {
            let seq = data.next_seq;
            data.next_seq += 1;
            let record = record.into_record(uuid::Uuid::new_v4().to_string(), table, created_at);
            data.records.push((seq, record));
        }
        Ok(count)
    }

    async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError> {
        let mut data = self.data.write().await;
        let before = data.records.len();
        data.records
            .retain(|(_, r)| !(r.table_type == table && &r.week_label == week));
        Ok((before - data.records.len()) as u64)
    }
}

#[async_trait]
impl ImportHistoryRepository for InMemoryRecordStore {
    async fn append(&self, entry: NewImportHistory) -> Result<ImportHistory, DomainError> {
        let mut data = self.data.write().await;
        let seq = data.next_seq;
        data.next_seq += 1;
        let history = entry.into_history(uuid::Uuid::new_v4().to_string(), Utc::now());
        data.history.push((seq, history.clone()));
        Ok(history)
    }

    async fn list(&self, table: TableType) -> Result<Vec<ImportHistory>, DomainError> {
        let data = self.data.read().await;
        let mut entries: Vec<&(u64, ImportHistory)> = data
            .history
            .iter()
            .filter(|(_, h)| h.table_type == table)
            .collect();
        entries.sort_by(|(sa, a), (sb, b)| b.uploaded_at.cmp(&a.uploaded_at).then(sb.cmp(sa)));
        Ok(entries.into_iter().map(|(_, h)| h.clone()).collect())
    }

    async fn delete_week(&self, table: TableType, week: &WeekLabel) -> Result<u64, DomainError> {
        let mut data = self.data.write().await;
        let before = data.history.len();
        data.history
            .retain(|(_, h)| !(h.table_type == table && &h.week_label == week));
        Ok((before - data.history.len()) as u64)
    }
}
