use super::settings::EnforceSettings;
use super::{PolicyRule, RuleInit};
use crate::model::ResolvedSetting;
use crate::policy::RuleConfig;
use orgguard_types::{RuleResolveError, RuleSkip, ids};
use std::collections::BTreeMap;

/// Builds a rule instance from its configuration.
pub type RuleFactory<E> = fn(RuleInit) -> Box<dyn PolicyRule<E>>;

/// Outcome of resolving a policy's rule configuration.
pub struct ResolvedRules<E> {
    pub enabled: Vec<Box<dyn PolicyRule<E>>>,
    pub skipped: Vec<RuleSkip>,
    pub resolve_errors: Vec<RuleResolveError>,
}

impl<E> Default for ResolvedRules<E> {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            skipped: Vec::new(),
            resolve_errors: Vec::new(),
        }
    }
}

impl<E> ResolvedRules<E> {
    fn skip(&mut self, name: &str) {
        self.skipped.push(RuleSkip {
            name: name.to_string(),
            reason: ids::REASON_RULE_NOT_ENABLED.to_string(),
        });
    }

    fn unknown(&mut self, name: &str) {
        self.resolve_errors.push(RuleResolveError {
            name: name.to_string(),
            message: ids::REASON_RULE_NOT_REGISTERED.to_string(),
        });
    }
}

/// Turns configured rule names into executable rules.
///
/// Unknown names become resolve errors and disabled rules become skips; neither aborts
/// resolution of the remaining rules.
pub trait RuleResolver<E>: Send + Sync {
    fn resolve(&self, rules: &BTreeMap<String, RuleConfig>) -> ResolvedRules<E>;
}

/// Name-to-factory catalog for one entity type.
pub struct RuleRegistry<E> {
    factories: BTreeMap<String, RuleFactory<E>>,
}

impl<E> Default for RuleRegistry<E> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<E> RuleRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, factory: RuleFactory<E>) -> &mut Self {
        self.factories.insert(name.to_string(), factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl<E> RuleResolver<E> for RuleRegistry<E> {
    fn resolve(&self, rules: &BTreeMap<String, RuleConfig>) -> ResolvedRules<E> {
        let mut out = ResolvedRules::default();
        for (name, rule_config) in rules {
            let Some(factory) = self.factories.get(name) else {
                out.unknown(name);
                continue;
            };
            if !rule_config.enabled {
                out.skip(name);
                continue;
            }
            out.enabled.push(factory(RuleInit {
                display_name: name.clone(),
                config: rule_config.clone(),
            }));
        }
        out
    }
}

/// Registry for org settings: `Enforce<Name>Settings` resolves to the generic settings rule
/// bound to setting `<Name>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettingsRuleRegistry;

impl RuleResolver<ResolvedSetting> for SettingsRuleRegistry {
    fn resolve(&self, rules: &BTreeMap<String, RuleConfig>) -> ResolvedRules<ResolvedSetting> {
        let mut out = ResolvedRules::default();
        for (name, rule_config) in rules {
            let Some(setting) = setting_name_from_rule(name) else {
                out.unknown(name);
                continue;
            };
            if !rule_config.enabled {
                out.skip(name);
                continue;
            }
            let init = RuleInit {
                display_name: name.clone(),
                config: rule_config.clone(),
            };
            out.enabled
                .push(Box::new(EnforceSettings::new(init, setting.to_string())));
        }
        out
    }
}

/// Extract `<Name>` from a rule called `Enforce<Name>Settings`.
pub fn setting_name_from_rule(rule_name: &str) -> Option<&str> {
    let name = rule_name
        .strip_prefix(ids::SETTINGS_RULE_PREFIX)?
        .strip_suffix(ids::SETTINGS_RULE_SUFFIX)?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(name)
}
