use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{BinRecord, BinStatus};

/// Active filter predicate shared by every read-side view of one table.
///
/// An empty string (or `None` for status) means "no filter on this field".
/// Fields are independent: contradictory combinations are legal and simply
/// match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub hub_name: String,
    pub employee_name: String,
    pub search_text: String,
    pub week_label: String,
    pub status: Option<BinStatus>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hub_name(&mut self, hub_name: impl Into<String>) {
        self.hub_name = hub_name.into();
    }

    pub fn set_employee_name(&mut self, employee_name: impl Into<String>) {
        self.employee_name = employee_name.into();
    }

    pub fn set_search_text(&mut self, search_text: impl Into<String>) {
        self.search_text = search_text.into();
    }

    pub fn set_week_label(&mut self, week_label: impl Into<String>) {
        self.week_label = week_label.into();
    }

    pub fn set_status(&mut self, status: Option<BinStatus>) {
        self.status = status;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parse a status filter coming from outside; empty means "any status".
    pub fn parse_status(raw: &str) -> Result<Option<BinStatus>> {
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            raw.parse().map(Some)
        }
    }

    pub fn hub(&self) -> Option<&str> {
        non_empty(&self.hub_name)
    }

    pub fn employee(&self) -> Option<&str> {
        non_empty(&self.employee_name)
    }

    pub fn search(&self) -> Option<&str> {
        non_empty(&self.search_text)
    }

    pub fn week(&self) -> Option<&str> {
        non_empty(&self.week_label)
    }

    /// Same filter narrowed to one status.
    pub fn with_status(&self, status: BinStatus) -> Self {
        Self {
            status: Some(status),
            ..self.clone()
        }
    }

    /// Evaluate the predicate against a record.
    ///
    /// Equality on hub, employee, week and status; case-insensitive substring
    /// on `bin_code`, `cust_name` or `reference_code_of_so`. SQL stores build
    /// the same predicate in their own query language.
    pub fn matches(&self, record: &BinRecord) -> bool {
        if let Some(status) = self.status {
            if record.effective_status() != status {
                return false;
            }
        }
        if let Some(week) = self.week() {
            if record.week_label.as_str() != week {
                return false;
            }
        }
        if let Some(hub) = self.hub() {
            if record.hub_name.as_deref() != Some(hub) {
                return false;
            }
        }
        if let Some(employee) = self.employee() {
            if record.employee_name.as_deref() != Some(employee) {
                return false;
            }
        }
        if let Some(needle) = self.search() {
            let needle = needle.to_lowercase();
            let hit = [
                Some(record.bin_code.as_str()),
                record.cust_name.as_deref(),
                record.reference_code_of_so.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|haystack| haystack.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

/// Columns that can be listed or counted distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordColumn {
    HubName,
    EmployeeName,
    WeekLabel,
    CustName,
}

impl RecordColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HubName => "hub_name",
            Self::EmployeeName => "employee_name",
            Self::WeekLabel => "week_label",
            Self::CustName => "cust_name",
        }
    }

    /// Value of this column on a record; empty strings count as null.
    pub fn value_of<'a>(&self, record: &'a BinRecord) -> Option<&'a str> {
        let value = match self {
            Self::HubName => record.hub_name.as_deref(),
            Self::EmployeeName => record.employee_name.as_deref(),
            Self::WeekLabel => Some(record.week_label.as_str()),
            Self::CustName => record.cust_name.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Optional equality restriction for a distinct-value listing,
/// e.g. employees of one hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetScope {
    pub column: RecordColumn,
    pub value: String,
}

impl FacetScope {
    pub fn new(column: RecordColumn, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &BinRecord) -> bool {
        self.column.value_of(record) == Some(self.value.as_str())
    }
}
