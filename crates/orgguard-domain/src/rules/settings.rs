use super::{PartialRuleResult, PolicyRule, RuleContext, RuleError, RuleInit};
use crate::model::ResolvedSetting;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Generic rule bound to one org setting.
///
/// Options map setting fields to their expected values; every field that is missing or
/// differs is a violation addressed as `[setting, field]`.
pub struct EnforceSettings {
    name: String,
    setting: String,
    expected: Result<BTreeMap<String, Value>, RuleError>,
}

impl EnforceSettings {
    pub fn new(init: RuleInit, setting: String) -> Self {
        let expected = init.options::<BTreeMap<String, Value>>();
        Self {
            name: init.display_name,
            setting,
            expected,
        }
    }

    pub fn setting(&self) -> &str {
        &self.setting
    }
}

/// Numbers compare by value so `12` and `12.0` match.
fn same_value(got: &Value, want: &Value) -> bool {
    match (got.as_f64(), want.as_f64()) {
        (Some(a), Some(b)) if got.is_number() && want.is_number() => a == b,
        _ => got == want,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl PolicyRule<ResolvedSetting> for EnforceSettings {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &RuleContext<'_, ResolvedSetting>,
    ) -> Result<PartialRuleResult, RuleError> {
        let expected = self.expected.clone()?;
        let mut out = PartialRuleResult::new(&self.name);

        let Some(actual) = ctx.entities.get(&self.setting) else {
            out.error(
                [self.setting.as_str()],
                format!("Setting {} could not be resolved.", self.setting),
            );
            return Ok(out);
        };

        if expected.is_empty() {
            out.warning(
                [self.setting.as_str()],
                "No expected values configured for this setting.",
            );
        }

        for (field, want) in &expected {
            let identifier = [self.setting.as_str(), field.as_str()];
            match actual.values.get(field) {
                None => out.violation(
                    identifier,
                    format!(
                        "{}.{field} is not set, expected {}.",
                        self.setting,
                        render(want)
                    ),
                ),
                Some(got) if !same_value(got, want) => out.violation(
                    identifier,
                    format!(
                        "{}.{field} is {}, expected {}.",
                        self.setting,
                        render(got),
                        render(want)
                    ),
                ),
                Some(_) => {}
            }
        }

        Ok(out)
    }
}
