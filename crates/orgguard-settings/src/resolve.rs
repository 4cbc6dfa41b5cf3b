use crate::error::{ConfigError, SchemaIssue};
use crate::model::{
    PermissionClassificationV1, PresetAssignmentV1, RawConfigDocument, RuleConfigV1,
    UsersOptionsV1,
};
use crate::shape::{ConfigShape, FileKind, FileShape};
use orgguard_domain::policy::{
    AuditRunConfig, ClassificationConfig, PermissionClassification, PolicyConfig, PolicyOptions,
    PresetAssignment, RuleConfig, UsersPolicyOptions,
};
use orgguard_types::{DependencyViolation, PolicyKind, PrivilegeLevel, RiskLevel};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Typed configuration plus the policies that were dropped for missing dependencies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatedConfig {
    pub config: AuditRunConfig,
    pub dependency_violations: Vec<DependencyViolation>,
}

pub fn validate_config(
    doc: &RawConfigDocument,
    shape: &ConfigShape,
) -> Result<ValidatedConfig, ConfigError> {
    let mut issues = Vec::new();
    let mut config = AuditRunConfig::default();

    for (file, content) in &doc.classifications {
        let Some(FileShape {
            kind: FileKind::Classification(kind),
            ..
        }) = shape.classification_file(file)
        else {
            issues.push(SchemaIssue::new(file, &[], "unknown classification"));
            continue;
        };
        if let Some(parsed) = classification_file(file, content, &mut issues) {
            config.classifications.insert(*kind, parsed);
        }
    }

    for (file, content) in &doc.policies {
        let Some(FileShape {
            kind: FileKind::Policy(kind),
            ..
        }) = shape.policy_file(file)
        else {
            issues.push(SchemaIssue::new(file, &[], "unknown policy"));
            continue;
        };
        if let Some(parsed) = policy_file(*kind, file, content, &mut issues) {
            config.policies.insert(*kind, parsed);
        }
    }

    if !issues.is_empty() {
        issues.sort();
        return Err(ConfigError::Schema(issues));
    }

    let dependency_violations = drop_unsatisfied_policies(&mut config, shape);
    Ok(ValidatedConfig {
        config,
        dependency_violations,
    })
}

/// Remove enabled policies whose required classifications are missing.
///
/// Disabled policies never run, so their dependencies are not checked.
fn drop_unsatisfied_policies(
    config: &mut AuditRunConfig,
    shape: &ConfigShape,
) -> Vec<DependencyViolation> {
    let mut violations = Vec::new();
    let kinds: Vec<PolicyKind> = config.policies.keys().copied().collect();

    for kind in kinds {
        if !config.policy(kind).is_some_and(|p| p.enabled) {
            continue;
        }
        let missing: Vec<_> = shape
            .dependencies(kind)
            .iter()
            .filter(|d| !config.has_classification(d.classification))
            .collect();
        if missing.is_empty() {
            continue;
        }

        config.policies.remove(&kind);
        for dep in missing {
            violations.push(DependencyViolation {
                policy: kind,
                classification: dep.classification,
                code: dep.error_code.to_string(),
                message: format!(
                    "policy {kind} requires the {} classification",
                    dep.classification
                ),
            });
        }
    }

    violations
}

fn classification_file(
    file: &str,
    content: &Value,
    issues: &mut Vec<SchemaIssue>,
) -> Option<ClassificationConfig> {
    let before = issues.len();
    let object = expect_object(file, &[], content, issues)?;
    let mut out = ClassificationConfig::default();

    for (key, value) in object {
        if key != "permissions" {
            issues.push(SchemaIssue::new(file, &[key.as_str()], "unknown field"));
            continue;
        }
        let Some(permissions) = expect_object(file, &["permissions"], value, issues) else {
            continue;
        };
        for (name, entry) in permissions {
            let Some(raw) = entry_as::<PermissionClassificationV1>(
                file,
                &["permissions", name.as_str()],
                entry,
                issues,
            ) else {
                continue;
            };
            match raw.classification.parse::<RiskLevel>() {
                Ok(classification) => {
                    out.permissions.insert(
                        name.clone(),
                        PermissionClassification {
                            name: name.clone(),
                            label: raw.label,
                            reason: raw.reason,
                            classification,
                        },
                    );
                }
                Err(err) => issues.push(SchemaIssue::new(
                    file,
                    &["permissions", name.as_str(), "classification"],
                    err.to_string(),
                )),
            }
        }
    }

    (issues.len() == before).then_some(out)
}

fn policy_file(
    kind: PolicyKind,
    file: &str,
    content: &Value,
    issues: &mut Vec<SchemaIssue>,
) -> Option<PolicyConfig> {
    let before = issues.len();
    let object = expect_object(file, &[], content, issues)?;
    let mut policy = PolicyConfig::new(kind);
    let mut users = UsersPolicyOptions::default();

    for (key, value) in object {
        match (key.as_str(), kind) {
            ("enabled", _) => match value.as_bool() {
                Some(enabled) => policy.enabled = enabled,
                None => issues.push(SchemaIssue::new(file, &["enabled"], "expected a boolean")),
            },
            ("rules", _) => policy.rules = rules(file, value, issues),
            ("profiles", PolicyKind::Profiles) => {
                policy.options = PolicyOptions::Profiles(presets(file, key, value, issues));
            }
            ("permissionSets", PolicyKind::PermissionSets) => {
                policy.options = PolicyOptions::PermissionSets(presets(file, key, value, issues));
            }
            ("users", PolicyKind::Users) => users.users = presets(file, key, value, issues),
            ("options", PolicyKind::Users) => users_options(file, value, issues, &mut users),
            _ => issues.push(SchemaIssue::new(file, &[key.as_str()], "unknown field")),
        }
    }

    if kind == PolicyKind::Users {
        policy.options = PolicyOptions::Users(users);
    }

    (issues.len() == before).then_some(policy)
}

fn rules(file: &str, value: &Value, issues: &mut Vec<SchemaIssue>) -> BTreeMap<String, RuleConfig> {
    let mut out = BTreeMap::new();
    let Some(object) = expect_object(file, &["rules"], value, issues) else {
        return out;
    };
    for (name, entry) in object {
        let path = ["rules", name.as_str()];
        if let Some(raw) = entry_as::<RuleConfigV1>(file, &path, entry, issues) {
            out.insert(
                name.clone(),
                RuleConfig {
                    enabled: raw.enabled.unwrap_or(true),
                    options: raw.options,
                },
            );
        }
    }
    out
}

fn presets(
    file: &str,
    section: &str,
    value: &Value,
    issues: &mut Vec<SchemaIssue>,
) -> BTreeMap<String, PresetAssignment> {
    let mut out = BTreeMap::new();
    let Some(object) = expect_object(file, &[section], value, issues) else {
        return out;
    };
    for (name, entry) in object {
        let path = [section, name.as_str()];
        let Some(raw) = entry_as::<PresetAssignmentV1>(file, &path, entry, issues) else {
            continue;
        };
        match raw.preset.parse::<PrivilegeLevel>() {
            Ok(preset) => {
                out.insert(name.clone(), PresetAssignment { preset });
            }
            Err(err) => issues.push(SchemaIssue::new(
                file,
                &[section, name.as_str(), "preset"],
                err.to_string(),
            )),
        }
    }
    out
}

fn users_options(
    file: &str,
    value: &Value,
    issues: &mut Vec<SchemaIssue>,
    out: &mut UsersPolicyOptions,
) {
    let Some(raw) = entry_as::<UsersOptionsV1>(file, &["options"], value, issues) else {
        return;
    };
    out.analyse_last_n_days_of_login_history = raw.analyse_last_n_days_of_login_history;
    if let Some(preset) = raw.default_preset {
        match preset.parse::<PrivilegeLevel>() {
            Ok(level) => out.default_preset = Some(level),
            Err(err) => issues.push(SchemaIssue::new(
                file,
                &["options", "defaultPreset"],
                err.to_string(),
            )),
        }
    }
}

fn expect_object<'v>(
    file: &str,
    path: &[&str],
    value: &'v Value,
    issues: &mut Vec<SchemaIssue>,
) -> Option<&'v Map<String, Value>> {
    let object = value.as_object();
    if object.is_none() {
        issues.push(SchemaIssue::new(file, path, "expected a table"));
    }
    object
}

fn entry_as<T: DeserializeOwned>(
    file: &str,
    path: &[&str],
    value: &Value,
    issues: &mut Vec<SchemaIssue>,
) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            issues.push(SchemaIssue::new(file, path, err.to_string()));
            None
        }
    }
}
