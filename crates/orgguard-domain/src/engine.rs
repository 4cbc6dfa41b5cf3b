use crate::accepted_risks::AcceptedRiskTree;
use crate::lookup::OrgLookup;
use crate::policy::AuditRunConfig;
use crate::rules::{PartialRuleResult, PolicyRule, RuleContext, RuleResolver};
use futures::FutureExt;
use futures::future::join_all;
use orgguard_types::{
    AuditPolicyResult, MutedViolation, PolicyKind, PolicyRuleExecutionResult,
    RuleComponentMessage,
};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Inputs for evaluating one policy.
pub struct PolicyRun<'a, E> {
    pub kind: PolicyKind,
    pub config: &'a AuditRunConfig,
    pub entities: &'a BTreeMap<String, E>,
    pub rules: &'a dyn RuleResolver<E>,
    pub accepted_risks: &'a AcceptedRiskTree,
    pub org: &'a dyn OrgLookup,
    pub now: OffsetDateTime,
}

/// Resolve and run every rule of a policy, then apply accepted risks.
///
/// Rules run concurrently. The result does not depend on the order in which they complete:
/// rule results are keyed by name and every message list is sorted.
pub async fn run_policy<E: Send + Sync>(run: PolicyRun<'_, E>) -> AuditPolicyResult {
    let Some(policy) = run.config.policy(run.kind).filter(|p| p.enabled) else {
        return AuditPolicyResult::disabled();
    };

    let resolved = run.rules.resolve(&policy.rules);
    for skip in &resolved.skipped {
        debug!(policy = %run.kind, rule = %skip.name, "rule skipped: {}", skip.reason);
    }
    for err in &resolved.resolve_errors {
        warn!(policy = %run.kind, rule = %err.name, "rule not resolved: {}", err.message);
    }

    let ctx = RuleContext {
        policy: run.kind,
        entities: run.entities,
        config: run.config,
        org: run.org,
        now: run.now,
    };
    let partials = join_all(
        resolved
            .enabled
            .iter()
            .map(|rule| execute_rule(rule.as_ref(), &ctx)),
    )
    .await;

    let audited_entities: Vec<String> = run.entities.keys().cloned().collect();
    let executed_rules: BTreeMap<String, PolicyRuleExecutionResult> = partials
        .into_iter()
        .map(|partial| {
            let result = finalize_rule(partial, run.kind, run.accepted_risks, &audited_entities);
            (result.rule_name.clone(), result)
        })
        .collect();

    // Vacuously compliant when no rule ran.
    let is_compliant = executed_rules.values().all(|r| r.is_compliant);

    AuditPolicyResult {
        is_compliant,
        enabled: true,
        executed_rules,
        skipped_rules: resolved.skipped,
        resolve_errors: resolved.resolve_errors,
        audited_entities,
    }
}

/// Run one rule, turning errors and panics into entries of its own `errors` list.
async fn execute_rule<E>(rule: &dyn PolicyRule<E>, ctx: &RuleContext<'_, E>) -> PartialRuleResult {
    let name = rule.name().to_string();
    let failure = match AssertUnwindSafe(rule.run(ctx)).catch_unwind().await {
        Ok(Ok(mut partial)) => {
            partial.rule_name = name;
            return partial;
        }
        Ok(Err(err)) => err.to_string(),
        Err(payload) => format!("rule {name} panicked: {}", panic_message(payload.as_ref())),
    };

    warn!(policy = %ctx.policy, rule = %name, "rule execution failed: {failure}");
    let mut partial = PartialRuleResult::new(&name);
    partial.errors.push(RuleComponentMessage {
        identifier: Vec::new(),
        message: failure,
    });
    partial
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Apply accepted risks to a rule's output and compute its compliance.
pub fn finalize_rule(
    partial: PartialRuleResult,
    kind: PolicyKind,
    accepted_risks: &AcceptedRiskTree,
    audited_entities: &[String],
) -> PolicyRuleExecutionResult {
    let mut violations = Vec::new();
    let mut muted_violations = Vec::new();
    for violation in partial.violations {
        match accepted_risks.is_muted(kind, violation.identifier.as_slice()) {
            Some(reason) => {
                muted_violations.push(MutedViolation::from_violation(violation, reason))
            }
            None => violations.push(violation),
        }
    }

    let mut warnings = partial.warnings;
    let mut errors = partial.errors;
    violations.sort();
    muted_violations.sort();
    warnings.sort();
    errors.sort();

    let violated: BTreeSet<&str> = violations.iter().filter_map(|v| v.entity()).collect();
    let violated_entities: Vec<String> = violated.iter().map(|s| s.to_string()).collect();
    let compliant_entities: Vec<String> = audited_entities
        .iter()
        .filter(|e| !violated.contains(e.as_str()))
        .cloned()
        .collect();

    PolicyRuleExecutionResult {
        rule_name: partial.rule_name,
        is_compliant: violations.is_empty(),
        violations,
        muted_violations,
        warnings,
        errors,
        compliant_entities,
        violated_entities,
    }
}
