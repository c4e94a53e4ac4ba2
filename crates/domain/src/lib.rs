//! Domain layer - Pure business logic with no external dependencies
//!
//! This crate contains:
//! - Entities (BinRecord, ImportHistory)
//! - Value Objects (TableType, BinStatus, WeekLabel, FilterState, PageRequest)
//! - Repository, codec and session-store interfaces (traits)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Boundary values (table type, status, week label) validated on construction
//! - Testable in isolation

pub mod error;
pub mod filter;
pub mod paging;
pub mod record;
pub mod session;
pub mod spreadsheet;
pub mod summary;

// Re-export commonly used types
pub use error::DomainError;
pub use filter::{FacetScope, FilterState, RecordColumn};
pub use paging::{Page, PageRange, PageRequest, RecordPage, PAGE_SIZE};
pub use record::{
    BinRecord, BinStatus, ImportHistory, ImportHistoryRepository, NewBinRecord, NewImportHistory,
    RecordRepository, StatusTracking, TableType, WeekLabel,
};
pub use session::{AuthSession, SessionStore};
pub use spreadsheet::{ParsedSheet, RowError, SpreadsheetCodec};
pub use summary::{StatusCounts, Summary};
