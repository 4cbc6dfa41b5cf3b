use anyhow::bail;
use async_trait::async_trait;
use futures::StreamExt;
use futures::executor::block_on;
use orgguard_app::{
    AuditError, AuditInput, AuditProgress, AuditResolvers, EntityResolver, ProgressSink,
    ResolveProgress, SelectionOptions, StaticResolver, run_audit_at,
};
use orgguard_domain::lookup::StaticOrgLookup;
use orgguard_domain::model::{
    ResolvedConnectedApp, ResolvedPermissionHolder, ResolvedSetting, ResolvedUser,
};
use orgguard_settings::{ValidatedConfig, load_config_toml, parse_accepted_risks};
use orgguard_types::{ClassificationKind, PolicyKind, ids};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2026-06-01 00:00 UTC);

const PROFILES_CONFIG: &str = r#"
[classifications.userPermissions.permissions.ViewAllData]
classification = "High"

[classifications.userPermissions.permissions.ViewSetup]
classification = "Low"

[policies.profiles.rules.EnforcePermissionClassifications]
enabled = true

[policies.profiles.profiles."Standard User"]
preset = "StandardUser"

[policies.profiles.profiles."System Administrator"]
preset = "Admin"
"#;

fn holder(name: &str, perms: &[&str]) -> (String, ResolvedPermissionHolder) {
    (
        name.to_string(),
        ResolvedPermissionHolder {
            name: name.to_string(),
            user_permissions: perms.iter().map(|p| p.to_string()).collect(),
            custom_permissions: Vec::new(),
        },
    )
}

fn profiles() -> StaticResolver<ResolvedPermissionHolder> {
    StaticResolver::from_iter([
        holder("Standard User", &["ViewAllData", "ViewSetup"]),
        holder("System Administrator", &["ViewAllData", "ViewSetup"]),
    ])
}

fn config(toml: &str) -> ValidatedConfig {
    load_config_toml(toml).expect("config is valid")
}

/// Resolver that always fails.
struct Unreachable;

#[async_trait]
impl<E: Send + Sync> EntityResolver<E> for Unreachable {
    async fn resolve(
        &self,
        _selection: &SelectionOptions,
        _progress: &ResolveProgress<'_>,
    ) -> anyhow::Result<BTreeMap<String, E>> {
        bail!("org unreachable")
    }
}

#[test]
fn standard_user_with_high_permission_is_one_violation() {
    let input = AuditInput::new(
        config(PROFILES_CONFIG),
        AuditResolvers::new().with_profiles(profiles()),
    );
    let result = block_on(run_audit_at(input, NOW)).expect("run succeeds");

    assert!(!result.is_compliant);
    let policy = &result.policies[&PolicyKind::Profiles];
    assert!(!policy.is_compliant);
    assert_eq!(
        policy.audited_entities,
        vec!["Standard User", "System Administrator"]
    );

    let rule = &policy.executed_rules[ids::RULE_ENFORCE_PERMISSION_CLASSIFICATIONS];
    assert_eq!(rule.violations.len(), 1);
    assert_eq!(rule.violations[0].identifier, vec!["Standard User", "ViewAllData"]);
    assert_eq!(rule.compliant_entities, vec!["System Administrator"]);
}

#[test]
fn accepted_risk_mutes_the_violation_and_flips_compliance() {
    let accepted = parse_accepted_risks(&BTreeMap::from([(
        "profiles".to_string(),
        json!({ "Standard User": { "ViewAllData": { "reason": "approved for reporting" } } }),
    )]))
    .expect("valid accepted risks");

    let input = AuditInput::new(
        config(PROFILES_CONFIG),
        AuditResolvers::new().with_profiles(profiles()),
    )
    .with_accepted_risks(accepted);
    let result = block_on(run_audit_at(input, NOW)).expect("run succeeds");

    assert!(result.is_compliant);
    let rule = &result.policies[&PolicyKind::Profiles].executed_rules
        [ids::RULE_ENFORCE_PERMISSION_CLASSIFICATIONS];
    assert!(rule.violations.is_empty());
    assert_eq!(rule.muted_violations.len(), 1);
    assert_eq!(rule.muted_violations[0].reason, "approved for reporting");
}

#[test]
fn never_logged_in_user_yields_exactly_one_violation() {
    let toml = r#"
[classifications.userPermissions.permissions.ViewSetup]
classification = "Low"

[policies.users.rules.NoInactiveUsers]
enabled = true

[policies.users.options]
defaultPreset = "StandardUser"
"#;
    let ghost = ResolvedUser {
        username: "ghost@example.com".to_string(),
        profile: Some("Standard User".to_string()),
        created_date: NOW - time::Duration::days(100),
        last_login: None,
        user_permissions: Vec::new(),
        custom_permissions: Vec::new(),
        logins: Vec::new(),
    };
    let users = StaticResolver::from_iter([("ghost@example.com".to_string(), ghost)]);

    let input = AuditInput::new(config(toml), AuditResolvers::new().with_users(users));
    let result = block_on(run_audit_at(input, NOW)).expect("run succeeds");

    let rule = &result.policies[&PolicyKind::Users].executed_rules[ids::RULE_NO_INACTIVE_USERS];
    assert_eq!(rule.violations.len(), 1);
    assert!(rule.violations[0].message.contains("never logged in"));
    assert!(!result.is_compliant);
}

#[test]
fn disabled_policy_is_reported_without_resolving() {
    let toml = r#"
[policies.connectedApps]
enabled = false

[policies.connectedApps.rules.AllUsedAppsUnderManagement]
enabled = true
"#;
    let input = AuditInput::new(
        config(toml),
        AuditResolvers::new().with_connected_apps(Unreachable),
    );
    let result = block_on(run_audit_at(input, NOW)).expect("resolver is never called");

    let policy = &result.policies[&PolicyKind::ConnectedApps];
    assert!(!policy.enabled);
    assert!(policy.is_compliant);
    assert!(policy.executed_rules.is_empty());
    assert!(result.is_compliant);
}

#[test]
fn missing_classification_is_a_structural_error() {
    let toml = r#"
[policies.profiles.rules.EnforcePermissionClassifications]
enabled = true

[policies.connectedApps.rules.AllUsedAppsUnderManagement]
enabled = true
"#;
    let apps = StaticResolver::from_iter([(
        "Dataloader".to_string(),
        ResolvedConnectedApp {
            name: "Dataloader".to_string(),
            installed: true,
            used_by_token: true,
            admin_pre_approved: true,
        },
    )]);
    let input = AuditInput::new(
        config(toml),
        AuditResolvers::new()
            .with_profiles(Unreachable)
            .with_connected_apps(apps),
    );
    let result = block_on(run_audit_at(input, NOW)).expect("run succeeds");

    assert!(!result.is_compliant);
    assert_eq!(result.structural_errors.len(), 1);
    assert_eq!(result.structural_errors[0].policy, PolicyKind::Profiles);
    assert_eq!(
        result.structural_errors[0].classification,
        ClassificationKind::UserPermissions
    );
    assert_eq!(
        result.structural_errors[0].code,
        ids::CODE_PROFILES_REQUIRE_USER_PERMISSIONS
    );
    assert!(!result.policies.contains_key(&PolicyKind::Profiles));
    assert!(result.policies[&PolicyKind::ConnectedApps].is_compliant);
}

#[test]
fn resolver_failure_aborts_the_run() {
    let input = AuditInput::new(
        config(PROFILES_CONFIG),
        AuditResolvers::new().with_profiles(Unreachable),
    );
    let err = block_on(run_audit_at(input, NOW)).expect_err("resolution fails");
    let AuditError::Resolution { policy, .. } = &err;
    assert_eq!(*policy, PolicyKind::Profiles);
    assert_eq!(
        err.to_string(),
        "failed to resolve profiles entities: org unreachable"
    );
}

#[test]
fn missing_resolver_aborts_the_run() {
    let input = AuditInput::new(config(PROFILES_CONFIG), AuditResolvers::new());
    let err = block_on(run_audit_at(input, NOW)).expect_err("no resolver");
    assert!(err.to_string().contains("no entity resolver configured"));
}

#[test]
fn partially_resolved_entities_are_audited_as_returned() {
    let only_admin = StaticResolver::from_iter([holder("System Administrator", &["ViewSetup"])]);
    let input = AuditInput::new(
        config(PROFILES_CONFIG),
        AuditResolvers::new().with_profiles(only_admin),
    );
    let result = block_on(run_audit_at(input, NOW)).expect("run succeeds");

    let policy = &result.policies[&PolicyKind::Profiles];
    assert_eq!(policy.audited_entities, vec!["System Administrator"]);
    assert!(policy.is_compliant);
}

#[test]
fn progress_events_follow_the_run() {
    let (sink, rx) = ProgressSink::channel();
    let input = AuditInput::new(
        config(PROFILES_CONFIG),
        AuditResolvers::new().with_profiles(profiles()),
    )
    .with_progress(sink);
    block_on(run_audit_at(input, NOW)).expect("run succeeds");

    let events: Vec<AuditProgress> = block_on(rx.collect());
    assert_eq!(
        events,
        vec![
            AuditProgress::PolicyStarted {
                policy: PolicyKind::Profiles
            },
            AuditProgress::EntitiesResolved {
                policy: PolicyKind::Profiles,
                resolved: 2,
                total: 2
            },
            AuditProgress::PolicyFinished {
                policy: PolicyKind::Profiles,
                is_compliant: false
            },
        ]
    );
}

#[test]
fn org_override_downgrades_self_authorization() {
    let toml = r#"
[policies.connectedApps.rules.NoUserCanSelfAuthorize]
enabled = true
"#;
    let apps = StaticResolver::from_iter([(
        "Workbench".to_string(),
        ResolvedConnectedApp {
            name: "Workbench".to_string(),
            installed: true,
            used_by_token: false,
            admin_pre_approved: false,
        },
    )]);
    let org = StaticOrgLookup::default().with_setting(ResolvedSetting {
        name: ids::ORG_SETTING_CONNECTED_APP.to_string(),
        values: BTreeMap::from([(
            ids::ORG_FIELD_ADMIN_APPROVED_APPS_ONLY.to_string(),
            json!(true),
        )]),
    });
    let input = AuditInput::new(config(toml), AuditResolvers::new().with_connected_apps(apps))
        .with_org(Arc::new(org));
    let result = block_on(run_audit_at(input, NOW)).expect("run succeeds");

    let rule = &result.policies[&PolicyKind::ConnectedApps].executed_rules
        [ids::RULE_NO_USER_CAN_SELF_AUTHORIZE];
    assert!(rule.violations.is_empty());
    assert_eq!(rule.warnings.len(), 1);
    assert!(result.is_compliant);
}

#[test]
fn unknown_and_disabled_rules_are_reported() {
    let toml = r#"
[policies.settings.rules.EnforcePasswordPoliciesSettings]
options = { minimumPasswordLength = 12 }

[policies.settings.rules.EnforceSessionSettings]
enabled = false

[policies.settings.rules.LockEverything]
enabled = true
"#;
    let settings = StaticResolver::from_iter([(
        "PasswordPolicies".to_string(),
        ResolvedSetting {
            name: "PasswordPolicies".to_string(),
            values: BTreeMap::from([("minimumPasswordLength".to_string(), json!(8))]),
        },
    )]);
    let input = AuditInput::new(config(toml), AuditResolvers::new().with_settings(settings));
    let result = block_on(run_audit_at(input, NOW)).expect("run succeeds");

    let policy = &result.policies[&PolicyKind::Settings];
    assert_eq!(policy.executed_rules.len(), 1);
    assert_eq!(policy.skipped_rules[0].name, "EnforceSessionSettings");
    assert_eq!(policy.resolve_errors[0].name, "LockEverything");

    let rule = &policy.executed_rules["EnforcePasswordPoliciesSettings"];
    assert_eq!(
        rule.violations[0].identifier,
        vec!["PasswordPolicies", "minimumPasswordLength"]
    );
    assert!(!policy.is_compliant);

    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["schema"], "orgguard.audit.v1");
    assert_eq!(json["policies"]["settings"]["is_compliant"], false);
}
