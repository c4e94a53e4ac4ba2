//! Application layer - Use cases and dashboard views

pub mod admin;
pub mod auth;
pub mod filter;
pub mod records;
pub mod sequencing;
pub mod summary;
pub mod table;

pub use admin::{DeletionService, UploadRequest, UploadService};
pub use auth::{AuthService, AuthState};
pub use filter::{FacetService, FilterContext, FilterPanel};
pub use records::{ExportFile, RecordService};
pub use sequencing::RequestSequencer;
pub use summary::{SummaryCards, SummaryService};
pub use table::DataTable;

use std::sync::{Mutex, MutexGuard, PoisonError};

// Poisoned view locks are recovered, not propagated
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
