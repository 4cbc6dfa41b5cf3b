use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification files known to the audit configuration.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum ClassificationKind {
    UserPermissions,
    CustomPermissions,
}

/// Policy files, one per audited entity type.
///
/// The derived ordering is the order in which an audit run visits policies.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum PolicyKind {
    Profiles,
    PermissionSets,
    Users,
    ConnectedApps,
    Settings,
}

impl ClassificationKind {
    pub const ALL: [ClassificationKind; 2] = [
        ClassificationKind::UserPermissions,
        ClassificationKind::CustomPermissions,
    ];

    /// File name used in configuration documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationKind::UserPermissions => "userPermissions",
            ClassificationKind::CustomPermissions => "customPermissions",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Profiles,
        PolicyKind::PermissionSets,
        PolicyKind::Users,
        PolicyKind::ConnectedApps,
        PolicyKind::Settings,
    ];

    /// File name used in configuration and accepted-risk documents.
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Profiles => "profiles",
            PolicyKind::PermissionSets => "permissionSets",
            PolicyKind::Users => "users",
            PolicyKind::ConnectedApps => "connectedApps",
            PolicyKind::Settings => "settings",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
