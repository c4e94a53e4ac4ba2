use domain::{
    BinStatus, DomainError, FilterState, RecordColumn, RecordRepository, StatusCounts,
    StatusTracking, Summary, TableType,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::filter::FilterContext;
use crate::lock;
use crate::sequencing::RequestSequencer;

/// Aggregates over the filtered, unpaginated record set.
pub struct SummaryService {
    repo: Arc<dyn RecordRepository>,
    tracking: StatusTracking,
}

impl SummaryService {
    pub fn new(repo: Arc<dyn RecordRepository>, tracking: StatusTracking) -> Self {
        Self { repo, tracking }
    }

    pub async fn summarize(
        &self,
        table: TableType,
        filter: &FilterState,
    ) -> Result<Summary, DomainError> {
        let total = self.repo.count(table, filter).await?;
        let unique_customers = self
            .repo
            .count_distinct(table, filter, RecordColumn::CustName)
            .await?;
        let unique_hubs = self
            .repo
            .count_distinct(table, filter, RecordColumn::HubName)
            .await?;
        let status = if self.tracking.is_tracked(table) {
            Some(self.status_counts(table, filter).await?)
        } else {
            None
        };

        Ok(Summary {
            total,
            unique_customers,
            unique_hubs,
            status,
        })
    }

    async fn status_counts(
        &self,
        table: TableType,
        filter: &FilterState,
    ) -> Result<StatusCounts, DomainError> {
        let mut counts = StatusCounts::default();
        for status in BinStatus::ALL {
            // A status filter on another state cannot match anything
            if filter.status.is_some_and(|active| active != status) {
                continue;
            }
            counts.set(status, self.repo.count(table, &filter.with_status(status)).await?);
        }
        Ok(counts)
    }
}

/// Summary card strip bound to a [`FilterContext`].
pub struct SummaryCards {
    service: SummaryService,
    context: FilterContext,
    table: Mutex<TableType>,
    summary: Mutex<Option<Summary>>,
    sequencer: RequestSequencer,
}

impl SummaryCards {
    pub fn new(service: SummaryService, context: FilterContext, table: TableType) -> Self {
        Self {
            service,
            context,
            table: Mutex::new(table),
            summary: Mutex::new(None),
            sequencer: RequestSequencer::new(),
        }
    }

    /// Last successfully loaded summary.
    pub fn summary(&self) -> Option<Summary> {
        lock(&self.summary).clone()
    }

    pub fn table_type(&self) -> TableType {
        *lock(&self.table)
    }

    pub async fn set_table_type(&self, table: TableType) -> Result<(), DomainError> {
        *lock(&self.table) = table;
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<(), DomainError> {
        let ticket = self.sequencer.issue();
        let table = self.table_type();
        let filter = self.context.snapshot();

        let summary = self.service.summarize(table, &filter).await?;
        if !self.sequencer.is_current(ticket) {
            debug!(%table, "Discarding superseded summary");
            return Ok(());
        }
        *lock(&self.summary) = Some(summary);
        Ok(())
    }

    /// Re-aggregate whenever the filters or the underlying data change.
    ///
    /// The task holds only a weak reference and ends at the first change
    /// after the cards are dropped.
    pub fn follow(self: Arc<Self>) -> JoinHandle<()> {
        let mut filters = self.context.subscribe();
        let mut revision = self.context.subscribe_revision();
        filters.borrow_and_update();
        revision.borrow_and_update();
        let cards = Arc::downgrade(&self);

        tokio::spawn(async move {
            loop {
                let changed = tokio::select! {
                    changed = filters.changed() => {
                        filters.borrow_and_update();
                        changed
                    }
                    changed = revision.changed() => {
                        revision.borrow_and_update();
                        changed
                    }
                };
                if changed.is_err() {
                    break;
                }
                let Some(cards) = cards.upgrade() else {
                    break;
                };
                if let Err(e) = cards.refresh().await {
                    warn!(error = %e, "Failed to refresh summary");
                }
            }
            debug!("Summary cards stopped following filters");
        })
    }
}
