use thiserror::Error;

use crate::record::TableType;
use crate::spreadsheet::RowError;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid table type: {0}")]
    InvalidTableType(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Please choose a spreadsheet file to upload")]
    MissingFile,

    #[error("Please provide a week label for this batch")]
    MissingWeekLabel,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{} row(s) failed to parse", errors.len())]
    ParseFailed { errors: Vec<RowError> },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record {0} already has a status update in flight")]
    RecordBusy(String),

    #[error("Status is not tracked for the {0} table")]
    StatusNotTracked(TableType),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Operation not supported by this store: {0}")]
    Unsupported(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Administrator access required")]
    Forbidden,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl DomainError {
    /// Input problems the user can fix before anything reaches the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTableType(_)
                | Self::InvalidStatus(_)
                | Self::MissingFile
                | Self::MissingWeekLabel
                | Self::Validation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
