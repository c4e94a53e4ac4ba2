mod delete;
mod upload;

pub use delete::{ConfirmedDeletion, DeletionOutcome, DeletionService, PendingDeletion};
pub use upload::{UploadOutcome, UploadRequest, UploadService};
