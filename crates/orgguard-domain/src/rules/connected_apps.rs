use super::{PartialRuleResult, PolicyRule, RuleContext, RuleError, RuleInit};
use crate::model::ResolvedConnectedApp;
use async_trait::async_trait;
use orgguard_types::ids;
use tracing::warn;

/// Apps that are used through OAuth tokens must be installed in the org.
pub struct AllUsedAppsUnderManagement {
    name: String,
}

impl AllUsedAppsUnderManagement {
    pub fn new(init: RuleInit) -> Self {
        Self {
            name: init.display_name,
        }
    }

    pub fn boxed(init: RuleInit) -> Box<dyn PolicyRule<ResolvedConnectedApp>> {
        Box::new(Self::new(init))
    }
}

#[async_trait]
impl PolicyRule<ResolvedConnectedApp> for AllUsedAppsUnderManagement {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &RuleContext<'_, ResolvedConnectedApp>,
    ) -> Result<PartialRuleResult, RuleError> {
        let mut out = PartialRuleResult::new(&self.name);
        for (id, app) in ctx.entities {
            if app.used_by_token && !app.installed {
                out.violation(
                    [id.as_str()],
                    "Connected app is used by OAuth tokens but is not installed in the org.",
                );
            }
        }
        Ok(out)
    }
}

/// Users must not be able to authorize connected apps by themselves.
///
/// When the org enforces admin-approved apps only, offending apps are reported as warnings.
pub struct NoUserCanSelfAuthorize {
    name: String,
}

impl NoUserCanSelfAuthorize {
    pub fn new(init: RuleInit) -> Self {
        Self {
            name: init.display_name,
        }
    }

    pub fn boxed(init: RuleInit) -> Box<dyn PolicyRule<ResolvedConnectedApp>> {
        Box::new(Self::new(init))
    }
}

#[async_trait]
impl PolicyRule<ResolvedConnectedApp> for NoUserCanSelfAuthorize {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &RuleContext<'_, ResolvedConnectedApp>,
    ) -> Result<PartialRuleResult, RuleError> {
        let mut out = PartialRuleResult::new(&self.name);

        let org_override = match ctx.org.setting(ids::ORG_SETTING_CONNECTED_APP).await {
            Ok(setting) => setting
                .map(|s| s.flag(ids::ORG_FIELD_ADMIN_APPROVED_APPS_ONLY))
                .unwrap_or(false),
            Err(err) => {
                warn!(rule = %self.name, error = %err, "org setting lookup failed");
                out.error(
                    [ids::ORG_SETTING_CONNECTED_APP],
                    format!("Could not read org setting: {err}"),
                );
                false
            }
        };

        for (id, app) in ctx.entities {
            if app.admin_pre_approved {
                continue;
            }
            if org_override {
                out.warning(
                    [id.as_str()],
                    "Users can self-authorize this app; the org allows admin-approved apps only.",
                );
            } else {
                out.violation([id.as_str()], "Users can self-authorize this connected app.");
            }
        }

        Ok(out)
    }
}
