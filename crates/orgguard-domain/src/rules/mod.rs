//! Rule contract and built-in rules.
//!
//! A rule is a side-effect-free unit of audit logic: it reads the resolved entities of one
//! policy plus the validated configuration and reports violations, warnings and errors.
//! Muting and compliance are decided by the policy engine, never by the rule.

use crate::lookup::OrgLookup;
use crate::policy::{AuditRunConfig, RuleConfig};
use async_trait::async_trait;
use orgguard_types::{PolicyKind, RuleComponentMessage};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use thiserror::Error;
use time::OffsetDateTime;

mod classifications;
mod connected_apps;
mod logins;
mod registry;
mod settings;
mod utils;

pub mod catalog;

pub use classifications::{EnforceHolderClassifications, EnforceUserClassifications};
pub use connected_apps::{AllUsedAppsUnderManagement, NoUserCanSelfAuthorize};
pub use logins::{InactiveUsersOptions, NoInactiveUsers, NoOtherApexApiLogins};
pub use registry::{
    ResolvedRules, RuleFactory, RuleRegistry, RuleResolver, SettingsRuleRegistry,
    setting_name_from_rule,
};
pub use settings::EnforceSettings;


/// Everything a rule may read while it runs.
pub struct RuleContext<'a, E> {
    pub policy: PolicyKind,
    pub entities: &'a BTreeMap<String, E>,
    pub config: &'a AuditRunConfig,
    pub org: &'a dyn OrgLookup,
    /// Reference time of the audit run.
    pub now: OffsetDateTime,
}

/// What a rule reports. Muted violations and compliance are added by the policy engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialRuleResult {
    pub rule_name: String,
    pub violations: Vec<RuleComponentMessage>,
    pub warnings: Vec<RuleComponentMessage>,
    pub errors: Vec<RuleComponentMessage>,
}

impl PartialRuleResult {
    pub fn new(rule_name: &str) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            ..Self::default()
        }
    }

    pub fn violation<I, S>(&mut self, identifier: I, message: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.violations
            .push(RuleComponentMessage::new(identifier, message));
    }

    pub fn warning<I, S>(&mut self, identifier: I, message: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings.push(RuleComponentMessage::new(identifier, message));
    }

    pub fn error<I, S>(&mut self, identifier: I, message: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.push(RuleComponentMessage::new(identifier, message));
    }
}

#[derive(Clone, Debug, Error)]
pub enum RuleError {
    #[error("invalid options for rule {rule}: {message}")]
    InvalidOptions { rule: String, message: String },

    #[error("rule {rule} failed: {message}")]
    Failed { rule: String, message: String },
}

/// Arguments a registry passes to a rule factory.
#[derive(Clone, Debug)]
pub struct RuleInit {
    /// Name under which the rule is configured and reported.
    pub display_name: String,
    pub config: RuleConfig,
}

impl RuleInit {
    /// Deserialize this rule's options, falling back to `T::default()` when none are set.
    pub fn options<T>(&self) -> Result<T, RuleError>
    where
        T: DeserializeOwned + Default,
    {
        match &self.config.options {
            None => Ok(T::default()),
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|e| RuleError::InvalidOptions {
                    rule: self.display_name.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
pub trait PolicyRule<E>: Send + Sync {
    /// Display name, used as the key of the rule's result.
    fn name(&self) -> &str;

    async fn run(&self, ctx: &RuleContext<'_, E>) -> Result<PartialRuleResult, RuleError>;
}
