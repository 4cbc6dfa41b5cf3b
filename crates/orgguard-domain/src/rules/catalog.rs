//! Default registries with every built-in rule.

use super::{
    AllUsedAppsUnderManagement, EnforceHolderClassifications, EnforceUserClassifications,
    NoInactiveUsers, NoOtherApexApiLogins, NoUserCanSelfAuthorize, RuleRegistry,
    SettingsRuleRegistry,
};
use crate::model::{ResolvedConnectedApp, ResolvedPermissionSet, ResolvedProfile, ResolvedUser};
use orgguard_types::ids;

pub fn profiles_registry() -> RuleRegistry<ResolvedProfile> {
    let mut registry = RuleRegistry::new();
    registry.register(
        ids::RULE_ENFORCE_PERMISSION_CLASSIFICATIONS,
        EnforceHolderClassifications::boxed,
    );
    registry
}

pub fn permission_sets_registry() -> RuleRegistry<ResolvedPermissionSet> {
    let mut registry = RuleRegistry::new();
    registry.register(
        ids::RULE_ENFORCE_PERMISSION_CLASSIFICATIONS,
        EnforceHolderClassifications::boxed,
    );
    registry
}

pub fn users_registry() -> RuleRegistry<ResolvedUser> {
    let mut registry = RuleRegistry::new();
    registry
        .register(
            ids::RULE_ENFORCE_PERMISSION_CLASSIFICATIONS,
            EnforceUserClassifications::boxed,
        )
        .register(ids::RULE_NO_OTHER_APEX_API_LOGINS, NoOtherApexApiLogins::boxed)
        .register(ids::RULE_NO_INACTIVE_USERS, NoInactiveUsers::boxed);
    registry
}

pub fn connected_apps_registry() -> RuleRegistry<ResolvedConnectedApp> {
    let mut registry = RuleRegistry::new();
    registry
        .register(
            ids::RULE_ALL_USED_APPS_UNDER_MANAGEMENT,
            AllUsedAppsUnderManagement::boxed,
        )
        .register(
            ids::RULE_NO_USER_CAN_SELF_AUTHORIZE,
            NoUserCanSelfAuthorize::boxed,
        );
    registry
}

pub fn settings_registry() -> SettingsRuleRegistry {
    SettingsRuleRegistry
}
