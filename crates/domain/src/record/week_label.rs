use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Batch label assigned by an administrator at import time, e.g. "Week 1 - Month 11".
///
/// Rules:
/// - Surrounding whitespace is trimmed
/// - Must be non-empty after trimming
///
/// Labels are free-form: they are not required to be chronological or unique
/// per month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekLabel(String);

impl WeekLabel {
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let trimmed = label.trim();

        if trimmed.is_empty() {
            return Err(DomainError::MissingWeekLabel);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WeekLabel {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<WeekLabel> for String {
    fn from(value: WeekLabel) -> Self {
        value.0
    }
}

impl std::fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
