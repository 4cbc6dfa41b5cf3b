use orgguard_types::{ClassificationKind, PolicyKind, PrivilegeLevel, RiskLevel};
use serde_json::Value;
use std::collections::BTreeMap;

/// Risk assignment of one permission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionClassification {
    pub name: String,
    pub label: Option<String>,
    pub reason: Option<String>,
    pub classification: RiskLevel,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationConfig {
    pub permissions: BTreeMap<String, PermissionClassification>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleConfig {
    pub enabled: bool,
    /// Rule-specific options, validated by the owning rule when it runs.
    pub options: Option<Value>,
}

impl RuleConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            options: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            options: None,
        }
    }

    pub fn with_options(options: Value) -> Self {
        Self {
            enabled: true,
            options: Some(options),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresetAssignment {
    pub preset: PrivilegeLevel,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsersPolicyOptions {
    pub users: BTreeMap<String, PresetAssignment>,
    pub default_preset: Option<PrivilegeLevel>,
    pub analyse_last_n_days_of_login_history: Option<u32>,
}

/// Entity-type specific part of a policy file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyOptions {
    Profiles(BTreeMap<String, PresetAssignment>),
    PermissionSets(BTreeMap<String, PresetAssignment>),
    Users(UsersPolicyOptions),
    ConnectedApps,
    Settings,
}

impl PolicyOptions {
    /// Empty options for the given policy kind.
    pub fn empty(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Profiles => PolicyOptions::Profiles(BTreeMap::new()),
            PolicyKind::PermissionSets => PolicyOptions::PermissionSets(BTreeMap::new()),
            PolicyKind::Users => PolicyOptions::Users(UsersPolicyOptions::default()),
            PolicyKind::ConnectedApps => PolicyOptions::ConnectedApps,
            PolicyKind::Settings => PolicyOptions::Settings,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PolicyConfig {
    pub enabled: bool,
    pub rules: BTreeMap<String, RuleConfig>,
    pub options: PolicyOptions,
}

impl PolicyConfig {
    pub fn new(kind: PolicyKind) -> Self {
        Self {
            enabled: true,
            rules: BTreeMap::new(),
            options: PolicyOptions::empty(kind),
        }
    }

    pub fn with_rule(mut self, name: &str, rule: RuleConfig) -> Self {
        self.rules.insert(name.to_string(), rule);
        self
    }
}

/// Validated configuration for one audit run. Read-only once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuditRunConfig {
    pub classifications: BTreeMap<ClassificationKind, ClassificationConfig>,
    pub policies: BTreeMap<PolicyKind, PolicyConfig>,
}

impl AuditRunConfig {
    pub fn policy(&self, kind: PolicyKind) -> Option<&PolicyConfig> {
        self.policies.get(&kind)
    }

    pub fn has_classification(&self, kind: ClassificationKind) -> bool {
        self.classifications.contains_key(&kind)
    }

    pub fn classification(
        &self,
        kind: ClassificationKind,
        permission: &str,
    ) -> Option<&PermissionClassification> {
        self.classifications
            .get(&kind)
            .and_then(|c| c.permissions.get(permission))
    }

    /// Preset configured for an entity of the given policy.
    ///
    /// Users fall back to the policy's `default_preset`.
    pub fn preset_for(&self, kind: PolicyKind, entity: &str) -> Option<PrivilegeLevel> {
        match &self.policy(kind)?.options {
            PolicyOptions::Profiles(map) | PolicyOptions::PermissionSets(map) => {
                map.get(entity).map(|a| a.preset)
            }
            PolicyOptions::Users(opts) => opts
                .users
                .get(entity)
                .map(|a| a.preset)
                .or(opts.default_preset),
            PolicyOptions::ConnectedApps | PolicyOptions::Settings => None,
        }
    }

    /// Entity names explicitly listed by a policy (empty for policies that audit everything).
    pub fn configured_entities(&self, kind: PolicyKind) -> Vec<String> {
        match self.policy(kind).map(|p| &p.options) {
            Some(PolicyOptions::Profiles(map)) | Some(PolicyOptions::PermissionSets(map)) => {
                map.keys().cloned().collect()
            }
            Some(PolicyOptions::Users(opts)) => opts.users.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
