use serde::{Deserialize, Serialize};

use crate::record::{BinRecord, NewBinRecord, TableType, WeekLabel};
use crate::DomainError;

/// A row that could not be decoded. `row` is the 1-based sheet row, the
/// header being row 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Outcome of decoding one sheet: good rows plus per-row failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub records: Vec<NewBinRecord>,
    pub errors: Vec<RowError>,
}

/// Spreadsheet encoder/decoder.
///
/// Decoding never aborts on a bad row; the row is reported in
/// [`ParsedSheet::errors`]. Rows without a `bin_code` are skipped and are not
/// errors.
pub trait SpreadsheetCodec: Send + Sync {
    /// Sheet names in workbook order.
    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, DomainError>;

    /// Decode `sheet` (default: first sheet) and tag every row with `week`.
    fn decode(
        &self,
        bytes: &[u8],
        week: &WeekLabel,
        sheet: Option<&str>,
    ) -> Result<ParsedSheet, DomainError>;

    /// Encode records into a workbook, excluding id, status and timestamps.
    fn encode(&self, records: &[BinRecord]) -> Result<Vec<u8>, DomainError>;
}

/// `bin_recovery_<table>_<YYYY-MM-DD>.xlsx`
pub fn export_file_name(table: TableType, date: chrono::NaiveDate) -> String {
    format!("bin_recovery_{}_{}.xlsx", table.as_str(), date.format("%Y-%m-%d"))
}
