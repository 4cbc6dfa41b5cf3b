//! Ordinal risk and privilege levels.
//!
//! Both enumerations are totally ordered by declaration: index 0 is the most
//! severe risk / the most privileged preset. New values must be appended at the
//! low end (just before `Unknown`) to keep persisted configuration meaningful.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Risk classification of a single permission.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum RiskLevel {
    Blocked,
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

/// Trust preset assigned to a profile, permission set or user.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum PrivilegeLevel {
    Developer,
    Admin,
    PowerUser,
    StandardUser,
    Unknown,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 6] = [
        RiskLevel::Blocked,
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
        RiskLevel::Unknown,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Rank counted from the least severe end: `Unknown` is 1, `Blocked` is `ALL.len()`.
    pub fn inverted_rank(self) -> usize {
        Self::ALL.len() - self.ordinal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Blocked => "Blocked",
            RiskLevel::Critical => "Critical",
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
            RiskLevel::Unknown => "Unknown",
        }
    }
}

impl PrivilegeLevel {
    pub const ALL: [PrivilegeLevel; 5] = [
        PrivilegeLevel::Developer,
        PrivilegeLevel::Admin,
        PrivilegeLevel::PowerUser,
        PrivilegeLevel::StandardUser,
        PrivilegeLevel::Unknown,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Rank counted from the least privileged end: `Unknown` is 1, `Developer` is `ALL.len()`.
    pub fn inverted_rank(self) -> usize {
        Self::ALL.len() - self.ordinal()
    }

    /// Most severe risk level a permission may carry and still be granted under this preset.
    pub fn max_allowed_risk(self) -> RiskLevel {
        match self {
            PrivilegeLevel::Developer => RiskLevel::Critical,
            PrivilegeLevel::Admin => RiskLevel::High,
            PrivilegeLevel::PowerUser => RiskLevel::Medium,
            PrivilegeLevel::StandardUser => RiskLevel::Low,
            PrivilegeLevel::Unknown => RiskLevel::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrivilegeLevel::Developer => "Developer",
            PrivilegeLevel::Admin => "Admin",
            PrivilegeLevel::PowerUser => "PowerUser",
            PrivilegeLevel::StandardUser => "StandardUser",
            PrivilegeLevel::Unknown => "Unknown",
        }
    }
}

/// Whether a permission classified as `risk` may be granted to an entity holding `preset`.
///
/// `Blocked` is rejected before anything else. Otherwise the preset's explicit
/// maximum risk decides, which agrees with comparing inverted ranks
/// (`preset.inverted_rank() >= risk.inverted_rank()`).
pub fn permission_allowed_under_preset(risk: RiskLevel, preset: PrivilegeLevel) -> bool {
    if risk == RiskLevel::Blocked {
        return false;
    }
    risk.ordinal() >= preset.max_allowed_risk().ordinal()
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown level: {value} (expected {})", .expected.join("|"))]
pub struct UnknownLevel {
    pub value: String,
    pub expected: &'static [&'static str],
}

impl FromStr for RiskLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnknownLevel {
                value: s.to_string(),
                expected: &["Blocked", "Critical", "High", "Medium", "Low", "Unknown"],
            })
    }
}

impl FromStr for PrivilegeLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrivilegeLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnknownLevel {
                value: s.to_string(),
                expected: &["Developer", "Admin", "PowerUser", "StandardUser", "Unknown"],
            })
    }
}
