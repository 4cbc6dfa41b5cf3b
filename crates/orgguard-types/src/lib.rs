//! Stable DTOs and IDs used across the orgguard workspace.
//!
//! This crate is intentionally boring:
//! - ordinal risk and privilege levels
//! - classification and policy kinds
//! - stable rule names and error codes
//! - result types consumed by renderers

#![forbid(unsafe_code)]

pub mod ids;
pub mod kinds;
pub mod levels;
pub mod receipt;

pub use kinds::{ClassificationKind, PolicyKind};
pub use levels::{PrivilegeLevel, RiskLevel, UnknownLevel, permission_allowed_under_preset};
pub use receipt::{
    AuditPolicyResult, AuditRunResult, DependencyViolation, MutedViolation,
    PolicyRuleExecutionResult, RuleComponentMessage, RuleResolveError, RuleSkip,
    SCHEMA_AUDIT_RESULT_V1, Violation, Warning,
};
