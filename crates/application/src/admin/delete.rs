use domain::{
    DomainError, FilterState, ImportHistoryRepository, RecordRepository, TableType, WeekLabel,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::filter::FilterContext;

/// A week deletion that has been looked at but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingDeletion {
    table: TableType,
    week: WeekLabel,
    matching: u64,
}

impl PendingDeletion {
    pub fn table(&self) -> TableType {
        self.table
    }

    pub fn week(&self) -> &WeekLabel {
        &self.week
    }

    /// Records that would be removed.
    pub fn matching(&self) -> u64 {
        self.matching
    }

    pub fn confirm(self) -> ConfirmedDeletion {
        ConfirmedDeletion {
            table: self.table,
            week: self.week,
        }
    }
}

/// The only value [`DeletionService::execute`] accepts.
#[derive(Debug)]
pub struct ConfirmedDeletion {
    table: TableType,
    week: WeekLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionOutcome {
    pub table: TableType,
    pub week_label: WeekLabel,
    pub deleted: u64,
    /// `None` when the history rows could not be removed
    pub history_removed: Option<u64>,
}

/// Bulk removal of one week's records from one table.
pub struct DeletionService {
    records: Arc<dyn RecordRepository>,
    history: Arc<dyn ImportHistoryRepository>,
    context: Option<FilterContext>,
}

impl DeletionService {
    pub fn new(
        records: Arc<dyn RecordRepository>,
        history: Arc<dyn ImportHistoryRepository>,
    ) -> Self {
        Self {
            records,
            history,
            context: None,
        }
    }

    pub fn with_context(mut self, context: FilterContext) -> Self {
        self.context = Some(context);
        self
    }

    pub async fn prepare(
        &self,
        table: TableType,
        week_label: &str,
    ) -> Result<PendingDeletion, DomainError> {
        let week = WeekLabel::new(week_label)?;
        let mut filter = FilterState::default();
        filter.set_week_label(week.as_str());
        let matching = self.records.count(table, &filter).await?;
        Ok(PendingDeletion {
            table,
            week,
            matching,
        })
    }

    pub async fn execute(
        &self,
        deletion: ConfirmedDeletion,
    ) -> Result<DeletionOutcome, DomainError> {
        let ConfirmedDeletion { table, week } = deletion;

        let deleted = self.records.delete_week(table, &week).await?;
        info!(%table, week = %week, deleted, "Deleted week");

        let history_removed = match self.history.delete_week(table, &week).await {
            Ok(removed) => Some(removed),
            Err(e) => {
                warn!(%table, week = %week, error = %e, "Records deleted but history cleanup failed");
                None
            }
        };

        if let Some(context) = &self.context {
            context.notify_data_changed();
        }

        Ok(DeletionOutcome {
            table,
            week_label: week,
            deleted,
            history_removed,
        })
    }
}
