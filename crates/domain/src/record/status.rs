use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::TableType;
use crate::error::DomainError;

/// Pickup workflow status of a BIN.
///
/// Any state may move to any other state; operators use backward moves
/// (e.g. `Returned -> Pending`) to correct mistakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinStatus {
    /// Not collected yet
    Pending,
    /// Collected from the customer
    PickedUp,
    /// Returned to the depot
    Returned,
}

impl BinStatus {
    pub const ALL: [BinStatus; 3] = [Self::Pending, Self::PickedUp, Self::Returned];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
            Self::Returned => "returned",
        }
    }

    /// Human-readable label used in exports and API responses.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Not picked up",
            Self::PickedUp => "Picked up",
            Self::Returned => "Returned to depot",
        }
    }

    /// Null status in the store is displayed and compared as `Pending`.
    pub fn or_pending(status: Option<BinStatus>) -> BinStatus {
        status.unwrap_or_default()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::PickedUp | Self::Returned)
    }
}

impl Default for BinStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl FromStr for BinStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "picked_up" => Ok(Self::PickedUp),
            "returned" => Ok(Self::Returned),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for BinStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which partitions run the pickup workflow. Compensation rows share the
/// schema but may not use status at all, so this is configured per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTracking {
    #[serde(default = "default_tracked")]
    pub pending: bool,
    #[serde(default = "default_tracked")]
    pub compensation: bool,
}

fn default_tracked() -> bool {
    true
}

impl StatusTracking {
    pub fn is_tracked(&self, table: TableType) -> bool {
        match table {
            TableType::Pending => self.pending,
            TableType::Compensation => self.compensation,
        }
    }
}

impl Default for StatusTracking {
    fn default() -> Self {
        Self {
            pending: true,
            compensation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str_round_trips() {
        for status in BinStatus::ALL {
            assert_eq!(status.as_str().parse::<BinStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(
            "lost".parse::<BinStatus>(),
            Err(DomainError::InvalidStatus("lost".to_string()))
        );
    }

    #[test]
    fn test_null_is_pending() {
        assert_eq!(BinStatus::or_pending(None), BinStatus::Pending);
        assert_eq!(
            BinStatus::or_pending(Some(BinStatus::Returned)),
            BinStatus::Returned
        );
    }

    #[test]
    fn test_is_completed() {
        assert!(!BinStatus::Pending.is_completed());
        assert!(BinStatus::PickedUp.is_completed());
        assert!(BinStatus::Returned.is_completed());
    }

    #[test]
    fn test_status_tracking_per_table() {
        let tracking = StatusTracking {
            pending: true,
            compensation: false,
        };
        assert!(tracking.is_tracked(TableType::Pending));
        assert!(!tracking.is_tracked(TableType::Compensation));
        assert!(StatusTracking::default().is_tracked(TableType::Compensation));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&BinStatus::PickedUp).unwrap();
        assert_eq!(json, "\"picked_up\"");
    }
}
