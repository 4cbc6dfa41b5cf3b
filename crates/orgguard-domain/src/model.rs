//! Resolved entities handed to the engine by external resolvers.

use serde_json::Value;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A profile or permission set together with the permissions it grants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedPermissionHolder {
    pub name: String,
    pub user_permissions: Vec<String>,
    pub custom_permissions: Vec<String>,
}

pub type ResolvedProfile = ResolvedPermissionHolder;
pub type ResolvedPermissionSet = ResolvedPermissionHolder;

/// A permission as seen on a user, with the profile or permission set that grants it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantedPermission {
    pub name: String,
    pub source: String,
}

/// Aggregated login history for one login type (and application, if known).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginRecord {
    pub login_type: String,
    pub application: Option<String>,
    pub count: u32,
    pub last_login: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedUser {
    pub username: String,
    pub profile: Option<String>,
    pub created_date: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
    pub user_permissions: Vec<GrantedPermission>,
    pub custom_permissions: Vec<GrantedPermission>,
    pub logins: Vec<LoginRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedConnectedApp {
    pub name: String,
    /// Explicitly installed (registered) in the org.
    pub installed: bool,
    /// Referenced by at least one OAuth token.
    pub used_by_token: bool,
    /// Only admin-approved users may authorize the app.
    pub admin_pre_approved: bool,
}

/// An org setting with its field values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedSetting {
    pub name: String,
    pub values: BTreeMap<String, Value>,
}

impl ResolvedSetting {
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.values.get(field), Some(Value::Bool(true)))
    }
}
