use domain::{DomainError, StatusCounts, StatusTracking, TableType};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{FacetService, FilterContext};
use crate::lock;
use crate::sequencing::RequestSequencer;

/// Option lists shown by the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelOptions {
    pub hubs: Vec<String>,
    pub weeks: Vec<String>,
    /// Scoped to the selected hub when one is set
    pub employees: Vec<String>,
    /// Partition-wide counts; `None` when the table does not track status
    pub status_counts: Option<StatusCounts>,
}

/// Filter controls for one dashboard.
///
/// Selections go straight into the shared [`FilterContext`]; the panel keeps
/// only the option lists it derived from the store. A failed refresh leaves
/// the previous lists in place.
pub struct FilterPanel {
    facets: FacetService,
    context: FilterContext,
    tracking: StatusTracking,
    table: Mutex<TableType>,
    options: Mutex<PanelOptions>,
    partition_seq: RequestSequencer,
    employee_seq: RequestSequencer,
}

impl FilterPanel {
    pub fn new(
        facets: FacetService,
        context: FilterContext,
        tracking: StatusTracking,
        table: TableType,
    ) -> Self {
        Self {
            facets,
            context,
            tracking,
            table: Mutex::new(table),
            options: Mutex::new(PanelOptions::default()),
            partition_seq: RequestSequencer::new(),
            employee_seq: RequestSequencer::new(),
        }
    }

    pub fn table_type(&self) -> TableType {
        *lock(&self.table)
    }

    pub fn options(&self) -> PanelOptions {
        lock(&self.options).clone()
    }

    pub fn context(&self) -> &FilterContext {
        &self.context
    }

    /// Reload every option list for the current table.
    pub async fn refresh(&self) -> Result<(), DomainError> {
        self.refresh_partition().await?;
        self.refresh_employees().await
    }

    /// Switch partitions. Filters are kept; option lists are reloaded.
    pub async fn set_table_type(&self, table: TableType) -> Result<(), DomainError> {
        *lock(&self.table) = table;
        self.refresh().await
    }

    pub async fn select_hub(&self, hub_name: impl Into<String>) -> Result<(), DomainError> {
        self.context.set_hub_name(hub_name);
        self.refresh_employees().await
    }

    pub fn select_employee(&self, employee_name: impl Into<String>) {
        self.context.set_employee_name(employee_name);
    }

    pub fn select_week(&self, week_label: impl Into<String>) {
        self.context.set_week_label(week_label);
    }

    pub fn set_search(&self, search_text: impl Into<String>) {
        self.context.set_search_text(search_text);
    }

    pub fn select_status(&self, raw: &str) -> Result<(), DomainError> {
        self.context.select_status(raw)
    }

    /// Clear every filter at once and drop the hub scoping of employees.
    pub async fn reset(&self) -> Result<(), DomainError> {
        self.context.reset();
        self.refresh_employees().await
    }

    async fn refresh_partition(&self) -> Result<(), DomainError> {
        let ticket = self.partition_seq.issue();
        let table = self.table_type();

        let hubs = self.facets.hubs(table).await?;
        let weeks = self.facets.weeks(table).await?;
        let status_counts = if self.tracking.is_tracked(table) {
            Some(self.facets.partition_status_counts(table).await?)
        } else {
            None
        };

        if !self.partition_seq.is_current(ticket) {
            debug!(%table, "Discarding superseded facet response");
            return Ok(());
        }

        let mut options = lock(&self.options);
        options.hubs = hubs;
        options.weeks = weeks;
        options.status_counts = status_counts;
        Ok(())
    }

    /// Reload employees for the selected hub and drop an employee selection
    /// that no longer appears in the list.
    pub async fn refresh_employees(&self) -> Result<(), DomainError> {
        let ticket = self.employee_seq.issue();
        let table = self.table_type();
        let hub = self.context.snapshot().hub_name;
        let scope = if hub.is_empty() { None } else { Some(hub.as_str()) };

        let employees = self.facets.employees(table, scope).await?;

        if !self.employee_seq.is_current(ticket) {
            debug!(%table, "Discarding superseded employee list");
            return Ok(());
        }

        let selected = self.context.snapshot().employee_name;
        if !selected.is_empty() && !employees.contains(&selected) {
            debug!(employee = %selected, hub = %hub, "Clearing employee not present in hub");
            self.context.set_employee_name("");
        }
        lock(&self.options).employees = employees;
        Ok(())
    }

    /// Keep the option lists current: employees follow hub changes made
    /// anywhere, everything reloads after a data revision bump.
    ///
    /// The task holds only a weak reference and ends at the first change
    /// after the panel is dropped.
    pub fn follow(self: Arc<Self>) -> JoinHandle<()> {
        let mut filters = self.context.subscribe();
        let mut revision = self.context.subscribe_revision();
        let mut last_hub = filters.borrow_and_update().hub_name.clone();
        revision.borrow_and_update();
        let panel = Arc::downgrade(&self);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = filters.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let hub = filters.borrow_and_update().hub_name.clone();
                        if hub == last_hub {
                            continue;
                        }
                        last_hub = hub;
                        let Some(panel) = panel.upgrade() else {
                            break;
                        };
                        if let Err(e) = panel.refresh_employees().await {
                            warn!(error = %e, "Failed to refresh employee list");
                        }
                    }
                    changed = revision.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        revision.borrow_and_update();
                        let Some(panel) = panel.upgrade() else {
                            break;
                        };
                        if let Err(e) = panel.refresh().await {
                            warn!(error = %e, "Failed to refresh filter options");
                        }
                    }
                }
            }
            debug!("Filter panel stopped following filters");
        })
    }
}
