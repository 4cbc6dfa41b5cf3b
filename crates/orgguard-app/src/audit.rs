//! The `audit` use case: resolve entities, run every configured policy, aggregate the result.

use crate::progress::{AuditProgress, ProgressSink};
use crate::resolver::{AuditResolvers, EntityResolver, SelectionOptions};
use anyhow::anyhow;
use orgguard_domain::accepted_risks::AcceptedRiskTree;
use orgguard_domain::lookup::{NoOrgLookup, OrgLookup};
use orgguard_domain::model::{
    ResolvedConnectedApp, ResolvedPermissionSet, ResolvedProfile, ResolvedUser,
};
use orgguard_domain::policy::AuditRunConfig;
use orgguard_domain::rules::catalog;
use orgguard_domain::rules::{RuleRegistry, RuleResolver, SettingsRuleRegistry};
use orgguard_domain::{PolicyRun, run_policy};
use orgguard_settings::ValidatedConfig;
use orgguard_types::{
    AuditPolicyResult, AuditRunResult, DependencyViolation, PolicyKind, SCHEMA_AUDIT_RESULT_V1,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AuditError {
    /// Entities of a policy could not be resolved; no partial result is produced.
    #[error("failed to resolve {policy} entities: {source}")]
    Resolution {
        policy: PolicyKind,
        #[source]
        source: anyhow::Error,
    },
}

/// Rule registries, one per entity type.
pub struct AuditRegistries {
    pub profiles: RuleRegistry<ResolvedProfile>,
    pub permission_sets: RuleRegistry<ResolvedPermissionSet>,
    pub users: RuleRegistry<ResolvedUser>,
    pub connected_apps: RuleRegistry<ResolvedConnectedApp>,
    pub settings: SettingsRuleRegistry,
}

impl Default for AuditRegistries {
    /// Registries holding every built-in rule.
    fn default() -> Self {
        Self {
            profiles: catalog::profiles_registry(),
            permission_sets: catalog::permission_sets_registry(),
            users: catalog::users_registry(),
            connected_apps: catalog::connected_apps_registry(),
            settings: catalog::settings_registry(),
        }
    }
}

/// Input for the audit use case.
pub struct AuditInput {
    /// Validated configuration, read-only for the whole run.
    pub config: Arc<AuditRunConfig>,
    /// Policies dropped during validation; reported as structural errors.
    pub dependency_violations: Vec<DependencyViolation>,
    pub accepted_risks: AcceptedRiskTree,
    pub resolvers: AuditResolvers,
    pub registries: AuditRegistries,
    pub org: Arc<dyn OrgLookup>,
    pub progress: ProgressSink,
}

impl AuditInput {
    pub fn new(validated: ValidatedConfig, resolvers: AuditResolvers) -> Self {
        Self {
            config: Arc::new(validated.config),
            dependency_violations: validated.dependency_violations,
            accepted_risks: AcceptedRiskTree::new(),
            resolvers,
            registries: AuditRegistries::default(),
            org: Arc::new(NoOrgLookup),
            progress: ProgressSink::none(),
        }
    }

    pub fn with_accepted_risks(mut self, accepted_risks: AcceptedRiskTree) -> Self {
        self.accepted_risks = accepted_risks;
        self
    }

    pub fn with_org(mut self, org: Arc<dyn OrgLookup>) -> Self {
        self.org = org;
        self
    }

    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_registries(mut self, registries: AuditRegistries) -> Self {
        self.registries = registries;
        self
    }
}

/// Run the audit use case with the current time as the reference time.
pub async fn run_audit(input: AuditInput) -> Result<AuditRunResult, AuditError> {
    run_audit_at(input, OffsetDateTime::now_utc()).await
}

/// Run the audit use case with an explicit reference time for time-based rules.
pub async fn run_audit_at(
    input: AuditInput,
    now: OffsetDateTime,
) -> Result<AuditRunResult, AuditError> {
    let started_at = OffsetDateTime::now_utc();
    info!(
        policies = input.config.policies.len(),
        structural_errors = input.dependency_violations.len(),
        "audit run started"
    );

    let mut structural_errors = input.dependency_violations.clone();
    structural_errors.sort();
    for violation in &structural_errors {
        warn!(
            policy = %violation.policy,
            code = %violation.code,
            "policy excluded: {}",
            violation.message
        );
    }

    let mut policies = BTreeMap::new();
    for kind in PolicyKind::ALL {
        if input.config.policy(kind).is_none() {
            continue;
        }
        let result = match kind {
            PolicyKind::Profiles => {
                let resolver = input.resolvers.profiles.as_deref();
                audit_policy(&input, kind, resolver, &input.registries.profiles, now).await?
            }
            PolicyKind::PermissionSets => {
                let resolver = input.resolvers.permission_sets.as_deref();
                audit_policy(&input, kind, resolver, &input.registries.permission_sets, now)
                    .await?
            }
            PolicyKind::Users => {
                let resolver = input.resolvers.users.as_deref();
                audit_policy(&input, kind, resolver, &input.registries.users, now).await?
            }
            PolicyKind::ConnectedApps => {
                let resolver = input.resolvers.connected_apps.as_deref();
                audit_policy(&input, kind, resolver, &input.registries.connected_apps, now)
                    .await?
            }
            PolicyKind::Settings => {
                let resolver = input.resolvers.settings.as_deref();
                audit_policy(&input, kind, resolver, &input.registries.settings, now).await?
            }
        };
        policies.insert(kind, result);
    }

    // A policy excluded during validation fails the run.
    let is_compliant =
        structural_errors.is_empty() && policies.values().all(|p| p.is_compliant);
    let finished_at = OffsetDateTime::now_utc();
    info!(is_compliant, "audit run finished");

    Ok(AuditRunResult {
        schema: SCHEMA_AUDIT_RESULT_V1.to_string(),
        is_compliant,
        started_at,
        finished_at,
        policies,
        structural_errors,
    })
}

async fn audit_policy<E: Send + Sync>(
    input: &AuditInput,
    kind: PolicyKind,
    resolver: Option<&dyn EntityResolver<E>>,
    rules: &dyn RuleResolver<E>,
    now: OffsetDateTime,
) -> Result<AuditPolicyResult, AuditError> {
    if !input.config.policy(kind).is_some_and(|p| p.enabled) {
        debug!(policy = %kind, "policy disabled");
        return Ok(AuditPolicyResult::disabled());
    }

    info!(policy = %kind, "policy started");
    input
        .progress
        .notify(AuditProgress::PolicyStarted { policy: kind });

    let resolver = resolver.ok_or_else(|| AuditError::Resolution {
        policy: kind,
        source: anyhow!("no entity resolver configured"),
    })?;
    let selection = SelectionOptions::for_policy(&input.config, kind);
    let entities = resolver
        .resolve(&selection, &input.progress.for_policy(kind))
        .await
        .map_err(|source| AuditError::Resolution {
            policy: kind,
            source,
        })?;
    debug!(policy = %kind, entities = entities.len(), "entities resolved");

    let result = run_policy(PolicyRun {
        kind,
        config: &input.config,
        entities: &entities,
        rules,
        accepted_risks: &input.accepted_risks,
        org: input.org.as_ref(),
        now,
    })
    .await;

    info!(
        policy = %kind,
        is_compliant = result.is_compliant,
        violations = result.violation_count(),
        "policy finished"
    );
    input.progress.notify(AuditProgress::PolicyFinished {
        policy: kind,
        is_compliant: result.is_compliant,
    });
    Ok(result)
}
