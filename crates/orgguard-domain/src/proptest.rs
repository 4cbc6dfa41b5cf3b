//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Result determinism regardless of rule completion order
//! - Policy compliance as the conjunction of rule compliance
//! - Accepted risks never hiding unrelated violations

use crate::accepted_risks::AcceptedRiskTree;
use crate::engine::{PolicyRun, finalize_rule, run_policy};
use crate::lookup::NoOrgLookup;
use crate::model::ResolvedPermissionHolder;
use crate::policy::{AuditRunConfig, PolicyConfig, RuleConfig};
use crate::rules::{PartialRuleResult, PolicyRule, ResolvedRules, RuleResolver};
use crate::test_support::{ScriptedRule, holder};
use futures::executor::block_on;
use orgguard_types::{AuditPolicyResult, PolicyKind};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use time::OffsetDateTime;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Clone, Debug)]
struct RuleSpec {
    name: String,
    delay: usize,
    violate: Vec<Vec<String>>,
}

/// Resolver that hands out pre-built scripted rules, ignoring configuration.
struct ScriptedResolver {
    specs: Vec<RuleSpec>,
}

impl RuleResolver<ResolvedPermissionHolder> for ScriptedResolver {
    fn resolve(
        &self,
        _rules: &BTreeMap<String, RuleConfig>,
    ) -> ResolvedRules<ResolvedPermissionHolder> {
        let mut out: ResolvedRules<ResolvedPermissionHolder> = ResolvedRules::default();
        for spec in &self.specs {
            let rule: Box<dyn PolicyRule<ResolvedPermissionHolder>> = Box::new(ScriptedRule {
                name: spec.name.clone(),
                delay: spec.delay,
                violate: spec.violate.clone(),
            });
            out.enabled.push(rule);
        }
        out
    }
}

fn entities(names: &[String]) -> BTreeMap<String, ResolvedPermissionHolder> {
    names
        .iter()
        .map(|n| (n.clone(), holder(n, &[])))
        .collect()
}

fn enabled_profiles() -> AuditRunConfig {
    let mut config = AuditRunConfig::default();
    config
        .policies
        .insert(PolicyKind::Profiles, PolicyConfig::new(PolicyKind::Profiles));
    config
}

fn evaluate(
    specs: Vec<RuleSpec>,
    entity_names: &[String],
    accepted: &AcceptedRiskTree,
) -> AuditPolicyResult {
    let config = enabled_profiles();
    let entities = entities(entity_names);
    let resolver = ScriptedResolver { specs };
    block_on(run_policy(PolicyRun {
        kind: PolicyKind::Profiles,
        config: &config,
        entities: &entities,
        rules: &resolver,
        accepted_risks: accepted,
        org: &NoOrgLookup,
        now: OffsetDateTime::UNIX_EPOCH,
    }))
}

// ============================================================================
// Strategies
// ============================================================================

fn arb_entity_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[A-Z][a-z]{1,6}", 1..6).prop_map(|s| s.into_iter().collect())
}

/// Rule specs with distinct names whose violations point at the given entities.
fn arb_rule_specs(
    entity_names: Vec<String>,
) -> impl Strategy<Value = (Vec<String>, Vec<RuleSpec>)> {
    let count = entity_names.len();
    let violation = (0..count, prop::option::of("[a-z]{1,5}")).prop_map({
        let names = entity_names.clone();
        move |(i, perm)| {
            let mut id = vec![names[i].clone()];
            id.extend(perm);
            id
        }
    });
    let spec = (0usize..8, prop::collection::vec(violation, 0..4));
    prop::collection::vec(spec, 1..6).prop_map(move |specs| {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(i, (delay, violate))| RuleSpec {
                name: format!("Rule{i}"),
                delay,
                violate,
            })
            .collect();
        (entity_names.clone(), rules)
    })
}

fn arb_case() -> impl Strategy<Value = (Vec<String>, Vec<RuleSpec>)> {
    arb_entity_names().prop_flat_map(arb_rule_specs)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Shuffling rule order and completion delays never changes the policy result.
    #[test]
    fn result_is_independent_of_completion_order(
        (names, specs) in arb_case(),
        seed in any::<u64>(),
    ) {
        let baseline = evaluate(specs.clone(), &names, &AcceptedRiskTree::new());

        let mut rng = StdRng::seed_from_u64(seed);
        let mut shuffled = specs;
        shuffled.shuffle(&mut rng);
        for spec in &mut shuffled {
            spec.delay = rng.random_range(0..8);
            spec.violate.reverse();
        }
        let reordered = evaluate(shuffled, &names, &AcceptedRiskTree::new());

        prop_assert_eq!(baseline, reordered);
    }

    /// A policy is compliant exactly when every executed rule is compliant.
    #[test]
    fn policy_compliance_is_conjunction_of_rules((names, specs) in arb_case()) {
        let result = evaluate(specs.clone(), &names, &AcceptedRiskTree::new());

        prop_assert_eq!(result.executed_rules.len(), specs.len());
        let all = result.executed_rules.values().all(|r| r.is_compliant);
        prop_assert_eq!(result.is_compliant, all);
        for spec in &specs {
            let rule = &result.executed_rules[&spec.name];
            prop_assert_eq!(rule.is_compliant, spec.violate.is_empty());
        }
    }

    /// Muting one entity moves exactly its violations to the muted list.
    #[test]
    fn muting_an_entity_only_affects_that_entity(
        (names, specs) in arb_case(),
        pick in any::<prop::sample::Index>(),
    ) {
        let muted_entity = names[pick.index(names.len())].clone();
        let mut accepted = AcceptedRiskTree::new();
        accepted.mute(PolicyKind::Profiles, &[muted_entity.as_str()], "accepted");

        let result = evaluate(specs.clone(), &names, &accepted);
        for spec in &specs {
            let rule = &result.executed_rules[&spec.name];
            let expected_muted = spec
                .violate
                .iter()
                .filter(|id| id[0] == muted_entity)
                .count();
            prop_assert_eq!(rule.muted_violations.len(), expected_muted);
            prop_assert_eq!(rule.violations.len(), spec.violate.len() - expected_muted);
            prop_assert!(rule.violations.iter().all(|v| v.identifier[0] != muted_entity));
            prop_assert!(!rule.violated_entities.contains(&muted_entity));
            prop_assert_eq!(
                rule.violated_entities.len() + rule.compliant_entities.len(),
                names.len()
            );
        }
    }

    /// Finalization output is sorted regardless of the order violations were reported in.
    #[test]
    fn finalized_lists_are_sorted(
        ids in prop::collection::vec(prop::collection::vec("[a-c]{1,2}", 1..3), 0..10),
    ) {
        let mut partial = PartialRuleResult::new("R");
        for id in &ids {
            partial.violation(id.iter().map(String::as_str), "v");
            partial.warning(id.iter().map(String::as_str), "w");
        }
        let result = finalize_rule(partial, PolicyKind::Users, &AcceptedRiskTree::new(), &[]);
        prop_assert!(result.violations.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(result.warnings.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(result.is_compliant, ids.is_empty());
    }
}

#[test]
fn execution_failures_become_rule_errors() {
    use crate::test_support::{FailingRule, PanickingRule};

    struct Broken;
    impl RuleResolver<ResolvedPermissionHolder> for Broken {
        fn resolve(
            &self,
            _rules: &BTreeMap<String, RuleConfig>,
        ) -> ResolvedRules<ResolvedPermissionHolder> {
            let mut out: ResolvedRules<ResolvedPermissionHolder> = ResolvedRules::default();
            out.enabled.push(Box::new(FailingRule));
            out.enabled.push(Box::new(PanickingRule));
            out
        }
    }

    let config = enabled_profiles();
    let entities = entities(&["P".to_string()]);
    let result = block_on(run_policy(PolicyRun {
        kind: PolicyKind::Profiles,
        config: &config,
        entities: &entities,
        rules: &Broken,
        accepted_risks: &AcceptedRiskTree::new(),
        org: &NoOrgLookup,
        now: OffsetDateTime::UNIX_EPOCH,
    }));

    let failing = &result.executed_rules["FailingRule"];
    assert_eq!(failing.errors.len(), 1);
    assert!(failing.errors[0].message.contains("backend unavailable"));
    assert!(failing.is_compliant);

    let panicking = &result.executed_rules["PanickingRule"];
    assert_eq!(panicking.errors.len(), 1);
    assert!(panicking.errors[0].message.contains("rule exploded"));
    assert!(result.is_compliant);
}
