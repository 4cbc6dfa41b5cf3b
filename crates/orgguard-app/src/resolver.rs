//! Entity resolver capability injected by the caller.

use crate::progress::ResolveProgress;
use async_trait::async_trait;
use orgguard_domain::model::{
    ResolvedConnectedApp, ResolvedPermissionSet, ResolvedProfile, ResolvedSetting, ResolvedUser,
};
use orgguard_domain::policy::{AuditRunConfig, PolicyOptions};
use orgguard_types::PolicyKind;
use std::collections::BTreeMap;

/// What the audit run asks a resolver to fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Entities explicitly listed by the policy. Resolvers may use this to narrow their query.
    pub named: Vec<String>,
    /// Login history window in days, for user resolution.
    pub login_history_days: Option<u32>,
}

impl SelectionOptions {
    pub fn for_policy(config: &AuditRunConfig, kind: PolicyKind) -> Self {
        let login_history_days = match config.policy(kind).map(|p| &p.options) {
            Some(PolicyOptions::Users(opts)) => opts.analyse_last_n_days_of_login_history,
            _ => None,
        };
        Self {
            named: config.configured_entities(kind),
            login_history_days,
        }
    }
}

/// Fetches the entities of one type, keyed by identifier.
///
/// A resolver may omit entities it cannot fully resolve; the run audits what is returned.
/// Returning an error aborts the audit run.
#[async_trait]
pub trait EntityResolver<E>: Send + Sync {
    async fn resolve(
        &self,
        selection: &SelectionOptions,
        progress: &ResolveProgress<'_>,
    ) -> anyhow::Result<BTreeMap<String, E>>;
}

/// Resolver over entities fetched ahead of time.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver<E> {
    entities: BTreeMap<String, E>,
}

impl<E> StaticResolver<E> {
    pub fn new(entities: BTreeMap<String, E>) -> Self {
        Self { entities }
    }
}

impl<E> FromIterator<(String, E)> for StaticResolver<E> {
    fn from_iter<I: IntoIterator<Item = (String, E)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl<E: Clone + Send + Sync> EntityResolver<E> for StaticResolver<E> {
    async fn resolve(
        &self,
        _selection: &SelectionOptions,
        progress: &ResolveProgress<'_>,
    ) -> anyhow::Result<BTreeMap<String, E>> {
        let total = self.entities.len();
        progress.entities_resolved(total, total);
        Ok(self.entities.clone())
    }
}

/// One optional resolver per entity type.
#[derive(Default)]
pub struct AuditResolvers {
    pub profiles: Option<Box<dyn EntityResolver<ResolvedProfile>>>,
    pub permission_sets: Option<Box<dyn EntityResolver<ResolvedPermissionSet>>>,
    pub users: Option<Box<dyn EntityResolver<ResolvedUser>>>,
    pub connected_apps: Option<Box<dyn EntityResolver<ResolvedConnectedApp>>>,
    pub settings: Option<Box<dyn EntityResolver<ResolvedSetting>>>,
}

impl AuditResolvers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(mut self, r: impl EntityResolver<ResolvedProfile> + 'static) -> Self {
        self.profiles = Some(Box::new(r));
        self
    }

    pub fn with_permission_sets(
        mut self,
        r: impl EntityResolver<ResolvedPermissionSet> + 'static,
    ) -> Self {
        self.permission_sets = Some(Box::new(r));
        self
    }

    pub fn with_users(mut self, r: impl EntityResolver<ResolvedUser> + 'static) -> Self {
        self.users = Some(Box::new(r));
        self
    }

    pub fn with_connected_apps(
        mut self,
        r: impl EntityResolver<ResolvedConnectedApp> + 'static,
    ) -> Self {
        self.connected_apps = Some(Box::new(r));
        self
    }

    pub fn with_settings(mut self, r: impl EntityResolver<ResolvedSetting> + 'static) -> Self {
        self.settings = Some(Box::new(r));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgguard_domain::policy::{PolicyConfig, PresetAssignment, UsersPolicyOptions};
    use orgguard_types::PrivilegeLevel;

    #[test]
    fn users_selection_carries_login_window() {
        let mut config = AuditRunConfig::default();
        let mut policy = PolicyConfig::new(PolicyKind::Users);
        let mut opts = UsersPolicyOptions {
            analyse_last_n_days_of_login_history: Some(30),
            ..UsersPolicyOptions::default()
        };
        opts.users.insert(
            "jane@example.com".to_string(),
            PresetAssignment {
                preset: PrivilegeLevel::Admin,
            },
        );
        policy.options = PolicyOptions::Users(opts);
        config.policies.insert(PolicyKind::Users, policy);

        let selection = SelectionOptions::for_policy(&config, PolicyKind::Users);
        assert_eq!(selection.named, vec!["jane@example.com".to_string()]);
        assert_eq!(selection.login_history_days, Some(30));

        let none = SelectionOptions::for_policy(&config, PolicyKind::Profiles);
        assert_eq!(none, SelectionOptions::default());
    }
}
