use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// Selects one of the two record partitions. Both share the same schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    /// BINs waiting to be collected
    Pending,
    /// Compensation settlements
    Compensation,
}

impl TableType {
    pub const ALL: [TableType; 2] = [Self::Pending, Self::Compensation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Compensation => "compensation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Pending => "Pickup list",
            Self::Compensation => "Compensation settlements",
        }
    }
}

impl FromStr for TableType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "compensation" => Ok(Self::Compensation),
            other => Err(DomainError::InvalidTableType(other.to_string())),
        }
    }
}

impl std::fmt::Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_type_parse() {
        assert_eq!("pending".parse::<TableType>().unwrap(), TableType::Pending);
        assert_eq!(
            "compensation".parse::<TableType>().unwrap(),
            TableType::Compensation
        );
        assert!("bin_pickup_pending".parse::<TableType>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TableType::Compensation.to_string(), "compensation");
    }
}
