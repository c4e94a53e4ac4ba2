use domain::{
    BinStatus, DomainError, FacetScope, FilterState, RecordColumn, RecordRepository, StatusCounts,
    TableType,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Derives the option lists of the filter panel from stored records.
pub struct FacetService {
    repo: Arc<dyn RecordRepository>,
    server_aggregation: bool,
}

impl FacetService {
    pub fn new(repo: Arc<dyn RecordRepository>, server_aggregation: bool) -> Self {
        Self {
            repo,
            server_aggregation,
        }
    }

    /// Distinct non-null values of `column`, sorted ascending.
    ///
    /// Uses the store's aggregation when enabled and supported, otherwise
    /// lists the raw column and deduplicates here. Both paths return the
    /// same list.
    pub async fn distinct(
        &self,
        table: TableType,
        column: RecordColumn,
        scope: Option<FacetScope>,
    ) -> Result<Vec<String>, DomainError> {
        if self.server_aggregation {
            match self.repo.distinct_values(table, column, scope.clone()).await {
                Ok(values) => return Ok(sorted_unique(values)),
                Err(DomainError::Unsupported(reason)) => {
                    debug!(%table, column = column.as_str(), %reason, "Falling back to client-side distinct");
                }
                Err(e) => return Err(e),
            }
        }
        let values = self.repo.column_values(table, column, scope).await?;
        Ok(sorted_unique(values))
    }

    pub async fn hubs(&self, table: TableType) -> Result<Vec<String>, DomainError> {
        self.distinct(table, RecordColumn::HubName, None).await
    }

    pub async fn weeks(&self, table: TableType) -> Result<Vec<String>, DomainError> {
        self.distinct(table, RecordColumn::WeekLabel, None).await
    }

    /// Employee names, limited to one hub when given.
    pub async fn employees(
        &self,
        table: TableType,
        hub: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        let scope = hub.map(|hub| FacetScope::new(RecordColumn::HubName, hub));
        self.distinct(table, RecordColumn::EmployeeName, scope).await
    }

    /// Record count per status across the whole partition.
    pub async fn partition_status_counts(
        &self,
        table: TableType,
    ) -> Result<StatusCounts, DomainError> {
        let all = FilterState::default();
        let mut counts = StatusCounts::default();
        for status in BinStatus::ALL {
            counts.set(status, self.repo.count(table, &all.with_status(status)).await?);
        }
        Ok(counts)
    }
}

fn sorted_unique(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
