use chrono::NaiveDate;
use domain::{BinRecord, BinStatus, DomainError, Page, PageRequest, TableType};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::filter::FilterContext;
use crate::lock;
use crate::records::{ExportFile, RecordService};
use crate::sequencing::RequestSequencer;

/// What the table currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub table: TableType,
    pub page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub rows: Vec<BinRecord>,
    /// Ids with a status change in flight
    pub busy: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    target: BinStatus,
    /// Status shown before the change; `None` if the row was not on the page
    confirmed: Option<Option<BinStatus>>,
}

struct TableState {
    table: TableType,
    request: PageRequest,
    page: Option<Page<BinRecord>>,
    in_flight: HashMap<String, InFlight>,
}

impl TableState {
    fn row_mut(&mut self, id: &str) -> Option<&mut BinRecord> {
        self.page
            .as_mut()
            .and_then(|page| page.rows.iter_mut().find(|r| r.id == id))
    }
}

/// Paginated record table with optimistic status changes.
///
/// A status change is shown immediately, then either replaced by the record
/// the store returns or rolled back to the last confirmed status. Only one
/// change per record may be in flight.
pub struct DataTable {
    records: Arc<RecordService>,
    context: FilterContext,
    refresh_delay: Duration,
    state: Mutex<TableState>,
    sequencer: RequestSequencer,
}

impl DataTable {
    pub fn new(
        records: Arc<RecordService>,
        context: FilterContext,
        table: TableType,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            records,
            context,
            refresh_delay,
            state: Mutex::new(TableState {
                table,
                request: PageRequest::first(),
                page: None,
                in_flight: HashMap::new(),
            }),
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn table_type(&self) -> TableType {
        lock(&self.state).table
    }

    pub fn current_page(&self) -> PageRequest {
        lock(&self.state).request
    }

    pub fn is_busy(&self, id: &str) -> bool {
        lock(&self.state).in_flight.contains_key(id)
    }

    pub fn rows(&self) -> Vec<BinRecord> {
        lock(&self.state)
            .page
            .as_ref()
            .map(|page| page.rows.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let state = lock(&self.state);
        let mut busy: Vec<String> = state.in_flight.keys().cloned().collect();
        busy.sort();
        match &state.page {
            Some(page) => TableSnapshot {
                table: state.table,
                page: page.page,
                total: page.total,
                total_pages: page.total_pages,
                rows: page.rows.clone(),
                busy,
            },
            None => TableSnapshot {
                table: state.table,
                page: state.request.number(),
                total: 0,
                total_pages: 0,
                rows: Vec::new(),
                busy,
            },
        }
    }

    /// Fetch the current page with the current filters.
    pub async fn load(&self) -> Result<(), DomainError> {
        let ticket = self.sequencer.issue();
        let (table, request) = {
            let state = lock(&self.state);
            (state.table, state.request)
        };
        let filter = self.context.snapshot();

        let mut page = self.records.page(table, &filter, request).await?;

        if !self.sequencer.is_current(ticket) {
            debug!(%table, page = request.number(), "Discarding superseded page");
            return Ok(());
        }

        let mut state = lock(&self.state);
        // Rows with a change in flight keep showing the requested status
        for row in page.rows.iter_mut() {
            if let Some(in_flight) = state.in_flight.get_mut(&row.id) {
                in_flight.confirmed.get_or_insert(row.status);
                row.status = Some(in_flight.target);
            }
        }
        state.request = PageRequest::new(page.page);
        state.page = Some(page);
        Ok(())
    }

    pub async fn go_to_page(&self, page: u64) -> Result<(), DomainError> {
        lock(&self.state).request = PageRequest::new(page);
        self.load().await
    }

    pub async fn next_page(&self) -> Result<(), DomainError> {
        let next = self.current_page().next();
        self.go_to_page(next.number()).await
    }

    pub async fn previous_page(&self) -> Result<(), DomainError> {
        let previous = self.current_page().previous();
        self.go_to_page(previous.number()).await
    }

    /// Back to page 1 after the filters changed.
    pub async fn filters_changed(&self) -> Result<(), DomainError> {
        self.go_to_page(1).await
    }

    pub async fn set_table_type(&self, table: TableType) -> Result<(), DomainError> {
        {
            let mut state = lock(&self.state);
            state.table = table;
            state.request = PageRequest::first();
            state.page = None;
        }
        self.load().await
    }

    /// Move one record to `target`.
    ///
    /// On success the row is replaced by the stored record; after the refresh
    /// delay the data revision is bumped and the page reloaded. On failure
    /// the row returns to its last confirmed status, or the page is reloaded
    /// when the row was not showing at the time, and the error is returned.
    pub async fn set_status(&self, id: &str, target: BinStatus) -> Result<BinRecord, DomainError> {
        let table = {
            let mut state = lock(&self.state);
            let table = state.table;
            if !self.records.tracking().is_tracked(table) {
                return Err(DomainError::StatusNotTracked(table));
            }
            if state.in_flight.contains_key(id) {
                return Err(DomainError::RecordBusy(id.to_string()));
            }
            let confirmed = state.row_mut(id).map(|row| {
                let confirmed = row.status;
                row.status = Some(target);
                confirmed
            });
            state
                .in_flight
                .insert(id.to_string(), InFlight { target, confirmed });
            table
        };

        match self.records.update_status(table, id, target).await {
            Ok(record) => {
                {
                    let mut state = lock(&self.state);
                    state.in_flight.remove(id);
                    if let Some(row) = state.row_mut(id) {
                        *row = record.clone();
                    }
                }

                tokio::time::sleep(self.refresh_delay).await;
                self.context.notify_data_changed();
                if let Err(e) = self.load().await {
                    warn!(%table, error = %e, "Failed to reload page after status change");
                }
                Ok(record)
            }
            Err(e) => {
                let reload = {
                    let mut state = lock(&self.state);
                    match state.in_flight.remove(id).and_then(|f| f.confirmed) {
                        Some(confirmed) => {
                            if let Some(row) = state.row_mut(id) {
                                row.status = confirmed;
                            }
                            false
                        }
                        None => true,
                    }
                };
                warn!(%table, id, status = %target, error = %e, "Status change failed, rolled back");

                // Never saw the stored status; read it back instead of guessing
                if reload {
                    if let Err(load_err) = self.load().await {
                        warn!(%table, error = %load_err, "Failed to reload page after failed status change");
                    }
                }
                Err(e)
            }
        }
    }

    /// Export every row matching the current filters.
    pub async fn export(&self, today: NaiveDate) -> Result<ExportFile, DomainError> {
        let table = self.table_type();
        let filter = self.context.snapshot();
        self.records.export(table, &filter, today).await
    }

    /// Return to page 1 and reload whenever the filters change.
    ///
    /// The task holds only a weak reference and ends at the first change
    /// after the table is dropped.
    pub fn follow(self: Arc<Self>) -> JoinHandle<()> {
        let mut filters = self.context.subscribe();
        filters.borrow_and_update();
        let table = Arc::downgrade(&self);

        tokio::spawn(async move {
            while filters.changed().await.is_ok() {
                filters.borrow_and_update();
                let Some(table) = table.upgrade() else {
                    break;
                };
                if let Err(e) = table.filters_changed().await {
                    warn!(error = %e, "Failed to reload table after filter change");
                }
            }
            info!("Table stopped following filters");
        })
    }
}
