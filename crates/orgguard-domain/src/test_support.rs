use crate::model::{GrantedPermission, LoginRecord, ResolvedPermissionHolder, ResolvedUser};
use crate::policy::{
    AuditRunConfig, ClassificationConfig, PermissionClassification, PolicyConfig, PolicyOptions,
    PresetAssignment, RuleConfig, UsersPolicyOptions,
};
use crate::rules::{PartialRuleResult, PolicyRule, RuleContext, RuleError, RuleInit};
use async_trait::async_trait;
use orgguard_types::{ClassificationKind, PolicyKind, PrivilegeLevel, RiskLevel, ids};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use time::OffsetDateTime;

pub fn classifications(entries: &[(&str, RiskLevel)]) -> ClassificationConfig {
    let permissions = entries
        .iter()
        .map(|(name, level)| {
            (
                name.to_string(),
                PermissionClassification {
                    name: name.to_string(),
                    label: None,
                    reason: None,
                    classification: *level,
                },
            )
        })
        .collect();
    ClassificationConfig { permissions }
}

pub fn presets(entries: &[(&str, PrivilegeLevel)]) -> BTreeMap<String, PresetAssignment> {
    entries
        .iter()
        .map(|(name, preset)| (name.to_string(), PresetAssignment { preset: *preset }))
        .collect()
}

pub fn holder(name: &str, user_permissions: &[&str]) -> ResolvedPermissionHolder {
    ResolvedPermissionHolder {
        name: name.to_string(),
        user_permissions: user_permissions.iter().map(|p| p.to_string()).collect(),
        custom_permissions: Vec::new(),
    }
}

/// Config with a `userPermissions` classification and a profiles policy running
/// `EnforcePermissionClassifications`.
pub fn profiles_config(
    user_permissions: ClassificationConfig,
    profiles: &[(&str, PrivilegeLevel)],
) -> AuditRunConfig {
    let mut cfg = AuditRunConfig::default();
    cfg.classifications
        .insert(ClassificationKind::UserPermissions, user_permissions);

    let mut policy = PolicyConfig::new(PolicyKind::Profiles)
        .with_rule(ids::RULE_ENFORCE_PERMISSION_CLASSIFICATIONS, RuleConfig::enabled());
    policy.options = PolicyOptions::Profiles(presets(profiles));
    cfg.policies.insert(PolicyKind::Profiles, policy);
    cfg
}

pub fn users_config(
    user_permissions: ClassificationConfig,
    users: &[(&str, PrivilegeLevel)],
    rules: &[(&str, RuleConfig)],
) -> AuditRunConfig {
    let mut cfg = AuditRunConfig::default();
    cfg.classifications
        .insert(ClassificationKind::UserPermissions, user_permissions);

    let mut policy = PolicyConfig::new(PolicyKind::Users);
    for (name, rule) in rules {
        policy.rules.insert(name.to_string(), rule.clone());
    }
    policy.options = PolicyOptions::Users(UsersPolicyOptions {
        users: presets(users),
        ..UsersPolicyOptions::default()
    });
    cfg.policies.insert(PolicyKind::Users, policy);
    cfg
}

pub fn user(username: &str, created_date: OffsetDateTime) -> ResolvedUser {
    ResolvedUser {
        username: username.to_string(),
        profile: None,
        created_date,
        last_login: None,
        user_permissions: Vec::new(),
        custom_permissions: Vec::new(),
        logins: Vec::new(),
    }
}

pub fn grant(name: &str, source: &str) -> GrantedPermission {
    GrantedPermission {
        name: name.to_string(),
        source: source.to_string(),
    }
}

pub fn login(
    login_type: &str,
    application: Option<&str>,
    count: u32,
    at: OffsetDateTime,
) -> LoginRecord {
    LoginRecord {
        login_type: login_type.to_string(),
        application: application.map(str::to_string),
        count,
        last_login: at,
    }
}

/// Future that returns `Pending` a fixed number of times before completing.
pub struct YieldTimes(pub usize);

impl Future for YieldTimes {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 == 0 {
            return Poll::Ready(());
        }
        self.0 -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Test rule that yields `delay` times, then reports one violation per listed entity.
pub struct ScriptedRule {
    pub name: String,
    pub delay: usize,
    pub violate: Vec<Vec<String>>,
}

#[async_trait]
impl<E: Sync> PolicyRule<E> for ScriptedRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _ctx: &RuleContext<'_, E>) -> Result<PartialRuleResult, RuleError> {
        YieldTimes(self.delay).await;
        let mut out = PartialRuleResult::new(&self.name);
        for identifier in &self.violate {
            out.violation(identifier.iter().map(String::as_str), "scripted violation");
        }
        Ok(out)
    }
}

/// Test rule that always fails.
pub struct FailingRule;

#[async_trait]
impl<E: Sync> PolicyRule<E> for FailingRule {
    fn name(&self) -> &str {
        "FailingRule"
    }

    async fn run(&self, _ctx: &RuleContext<'_, E>) -> Result<PartialRuleResult, RuleError> {
        Err(RuleError::Failed {
            rule: "FailingRule".to_string(),
            message: "backend unavailable".to_string(),
        })
    }
}

/// Test rule that panics while running.
pub struct PanickingRule;

#[async_trait]
impl<E: Sync> PolicyRule<E> for PanickingRule {
    fn name(&self) -> &str {
        "PanickingRule"
    }

    async fn run(&self, _ctx: &RuleContext<'_, E>) -> Result<PartialRuleResult, RuleError> {
        panic!("rule exploded");
    }
}

pub fn init(name: &str, config: RuleConfig) -> RuleInit {
    RuleInit {
        display_name: name.to_string(),
        config,
    }
}
