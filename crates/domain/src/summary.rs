use serde::{Deserialize, Serialize};

use crate::record::BinStatus;

/// Per-status record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub picked_up: u64,
    pub returned: u64,
}

impl StatusCounts {
    pub fn get(&self, status: BinStatus) -> u64 {
        match status {
            BinStatus::Pending => self.pending,
            BinStatus::PickedUp => self.picked_up,
            BinStatus::Returned => self.returned,
        }
    }

    pub fn set(&mut self, status: BinStatus, count: u64) {
        match status {
            BinStatus::Pending => self.pending = count,
            BinStatus::PickedUp => self.picked_up = count,
            BinStatus::Returned => self.returned = count,
        }
    }

    pub fn completed(&self) -> u64 {
        self.picked_up + self.returned
    }
}

/// Aggregates over the filtered (not paginated) record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: u64,
    pub unique_customers: u64,
    pub unique_hubs: u64,
    /// `None` when the table does not track status.
    pub status: Option<StatusCounts>,
}

impl Summary {
    /// `round(100 * (picked_up + returned) / total)`, 0 for an empty set.
    pub fn completion_percent(&self) -> Option<u64> {
        self.status.map(|counts| completion_percent(counts.completed(), self.total))
    }
}

pub fn completion_percent(completed: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (completed as f64 * 100.0 / total as f64).round() as u64
}
