use crate::kinds::{ClassificationKind, PolicyKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Stable schema identifier for audit run results.
pub const SCHEMA_AUDIT_RESULT_V1: &str = "orgguard.audit.v1";

/// A violation, warning or error produced by a rule.
///
/// `identifier` is an addressable path (for example `[profile, permission]`). It is the join
/// key against accepted risks, so it must be stable across runs for the same condition.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct RuleComponentMessage {
    pub identifier: Vec<String>,
    pub message: String,
}

impl RuleComponentMessage {
    pub fn new<I, S>(identifier: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// The audited entity a message refers to (first identifier segment).
    pub fn entity(&self) -> Option<&str> {
        self.identifier.first().map(String::as_str)
    }
}

pub type Violation = RuleComponentMessage;
pub type Warning = RuleComponentMessage;

/// A violation suppressed by an accepted risk.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct MutedViolation {
    pub identifier: Vec<String>,
    pub message: String,
    pub reason: String,
}

impl MutedViolation {
    pub fn from_violation(violation: Violation, reason: impl Into<String>) -> Self {
        Self {
            identifier: violation.identifier,
            message: violation.message,
            reason: reason.into(),
        }
    }
}

/// A configured rule that was deliberately not executed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct RuleSkip {
    pub name: String,
    pub reason: String,
}

/// A configured rule name that could not be resolved to an implementation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct RuleResolveError {
    pub name: String,
    pub message: String,
}

/// Outcome of one rule after muting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyRuleExecutionResult {
    pub rule_name: String,
    pub violations: Vec<Violation>,
    pub muted_violations: Vec<MutedViolation>,
    pub warnings: Vec<Warning>,
    pub errors: Vec<RuleComponentMessage>,
    pub is_compliant: bool,
    pub compliant_entities: Vec<String>,
    pub violated_entities: Vec<String>,
}

/// Outcome of one policy (one entity type).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuditPolicyResult {
    pub is_compliant: bool,
    pub enabled: bool,
    /// Keyed by rule display name.
    pub executed_rules: BTreeMap<String, PolicyRuleExecutionResult>,
    pub skipped_rules: Vec<RuleSkip>,
    pub resolve_errors: Vec<RuleResolveError>,
    pub audited_entities: Vec<String>,
}

impl AuditPolicyResult {
    /// Result for a policy that is switched off in configuration.
    pub fn disabled() -> Self {
        Self {
            is_compliant: true,
            enabled: false,
            ..Self::default()
        }
    }

    pub fn violation_count(&self) -> usize {
        self.executed_rules.values().map(|r| r.violations.len()).sum()
    }
}

/// A policy excluded from the run because a classification it depends on is missing.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct DependencyViolation {
    pub policy: PolicyKind,
    pub classification: ClassificationKind,
    pub code: String,
    pub message: String,
}

/// Run-wide result handed to renderers and persistence layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditRunResult {
    pub schema: String,
    pub is_compliant: bool,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub policies: BTreeMap<PolicyKind, AuditPolicyResult>,
    pub structural_errors: Vec<DependencyViolation>,
}
