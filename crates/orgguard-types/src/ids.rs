//! Stable identifiers for rules, org settings and error codes.
//!
//! Rule names are PascalCase as they appear in policy files. Codes are short snake_case
//! discriminators and are part of the report contract.

// Rules: profiles / permissionSets / users
pub const RULE_ENFORCE_PERMISSION_CLASSIFICATIONS: &str = "EnforcePermissionClassifications";

// Rules: users
pub const RULE_NO_OTHER_APEX_API_LOGINS: &str = "NoOtherApexApiLogins";
pub const RULE_NO_INACTIVE_USERS: &str = "NoInactiveUsers";

// Rules: connectedApps
pub const RULE_ALL_USED_APPS_UNDER_MANAGEMENT: &str = "AllUsedAppsUnderManagement";
pub const RULE_NO_USER_CAN_SELF_AUTHORIZE: &str = "NoUserCanSelfAuthorize";

// Rules: settings (`Enforce<Name>Settings`)
pub const SETTINGS_RULE_PREFIX: &str = "Enforce";
pub const SETTINGS_RULE_SUFFIX: &str = "Settings";

// Login types
pub const LOGIN_TYPE_OTHER_APEX_API: &str = "Other Apex API";

// Org settings consulted by rules
pub const ORG_SETTING_CONNECTED_APP: &str = "ConnectedApp";
pub const ORG_FIELD_ADMIN_APPROVED_APPS_ONLY: &str = "enableAdminApprovedAppsOnly";

// Dependency codes
pub const CODE_PROFILES_REQUIRE_USER_PERMISSIONS: &str = "profiles_require_user_permissions";
pub const CODE_PERMISSION_SETS_REQUIRE_USER_PERMISSIONS: &str =
    "permission_sets_require_user_permissions";
pub const CODE_USERS_REQUIRE_USER_PERMISSIONS: &str = "users_require_user_permissions";

// Resolution reasons
pub const REASON_RULE_NOT_ENABLED: &str = "rule not enabled";
pub const REASON_RULE_NOT_REGISTERED: &str = "rule not registered";
