use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Untyped configuration document: file name -> file content.
///
/// Files are validated individually against the declared [`ConfigShape`](crate::ConfigShape).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfigDocument {
    #[serde(default)]
    pub classifications: BTreeMap<String, Value>,
    #[serde(default)]
    pub policies: BTreeMap<String, Value>,
}

impl RawConfigDocument {
    pub fn with_classification(mut self, file: &str, content: Value) -> Self {
        self.classifications.insert(file.to_string(), content);
        self
    }

    pub fn with_policy(mut self, file: &str, content: Value) -> Self {
        self.policies.insert(file.to_string(), content);
        self
    }
}

/// Content of a classification file (`userPermissions`, `customPermissions`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassificationFileV1 {
    #[serde(default)]
    pub permissions: BTreeMap<String, PermissionClassificationV1>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionClassificationV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Risk level name: `Blocked`, `Critical`, `High`, `Medium`, `Low` or `Unknown`.
    pub classification: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleConfigV1 {
    /// Defaults to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Rule-specific options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PresetAssignmentV1 {
    /// Privilege level name: `Developer`, `Admin`, `PowerUser`, `StandardUser` or `Unknown`.
    pub preset: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UsersOptionsV1 {
    /// Preset for users without an explicit entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_preset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyse_last_n_days_of_login_history: Option<u32>,
}

/// `profiles` policy file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilesPolicyV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfigV1>,
    #[serde(default)]
    pub profiles: BTreeMap<String, PresetAssignmentV1>,
}

/// `permissionSets` policy file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionSetsPolicyV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfigV1>,
    #[serde(default)]
    pub permission_sets: BTreeMap<String, PresetAssignmentV1>,
}

/// `users` policy file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UsersPolicyV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfigV1>,
    #[serde(default)]
    pub users: BTreeMap<String, PresetAssignmentV1>,
    #[serde(default)]
    pub options: UsersOptionsV1,
}

/// `connectedApps` and `settings` policy files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RulesOnlyPolicyV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfigV1>,
}
