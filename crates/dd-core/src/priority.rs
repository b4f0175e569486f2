//! Order priority tiers.
//!
//! The derived `Ord` is the queue order: `High < Medium < Low`, so an
//! ascending sort puts urgent orders first.

use std::str::FromStr;

use crate::CoreError;

/// How urgently an order must be delivered.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort rank, 0 for `High`.
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High   => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low    => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH"   => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW"    => Ok(Priority::Low),
            other    => Err(CoreError::Parse(format!("unknown priority '{other}'"))),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
