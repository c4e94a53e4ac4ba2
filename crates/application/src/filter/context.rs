use domain::{BinStatus, DomainError, FilterState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

struct Channels {
    filters: watch::Sender<FilterState>,
    revision: watch::Sender<u64>,
}

/// Shared handle to the active filters of one dashboard.
///
/// Every read-side view holds a clone. A setter publishes only when the value
/// actually changes, so subscribers never see no-op notifications. The data
/// revision is bumped after successful writes so views showing aggregates
/// re-fetch even though the filters did not move.
#[derive(Clone)]
pub struct FilterContext {
    inner: Arc<Channels>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self::with_state(FilterState::default())
    }

    pub fn with_state(state: FilterState) -> Self {
        let (filters, _) = watch::channel(state);
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Channels { filters, revision }),
        }
    }

    /// Current filters.
    pub fn snapshot(&self) -> FilterState {
        self.inner.filters.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.inner.filters.subscribe()
    }

    pub fn set_hub_name(&self, hub_name: impl Into<String>) {
        let hub_name = hub_name.into();
        self.update(|f| f.set_hub_name(hub_name));
    }

    pub fn set_employee_name(&self, employee_name: impl Into<String>) {
        let employee_name = employee_name.into();
        self.update(|f| f.set_employee_name(employee_name));
    }

    pub fn set_search_text(&self, search_text: impl Into<String>) {
        let search_text = search_text.into();
        self.update(|f| f.set_search_text(search_text));
    }

    pub fn set_week_label(&self, week_label: impl Into<String>) {
        let week_label = week_label.into();
        self.update(|f| f.set_week_label(week_label));
    }

    pub fn set_status(&self, status: Option<BinStatus>) {
        self.update(|f| f.set_status(status));
    }

    /// Parse and apply a raw status selection; empty clears the filter.
    pub fn select_status(&self, raw: &str) -> Result<(), DomainError> {
        let status = FilterState::parse_status(raw)?;
        self.set_status(status);
        Ok(())
    }

    /// Replace every field in one notification.
    pub fn replace(&self, state: FilterState) {
        self.update(|f| *f = state);
    }

    /// Clear every field in one notification.
    pub fn reset(&self) {
        self.update(FilterState::reset);
    }

    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    pub fn subscribe_revision(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Signal that stored data changed underneath the current filters.
    pub fn notify_data_changed(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
        debug!(revision = self.revision(), "Data revision bumped");
    }

    fn update(&self, apply: impl FnOnce(&mut FilterState)) {
        self.inner.filters.send_if_modified(|state| {
            let before = state.clone();
            apply(state);
            *state != before
        });
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new()
    }
}
