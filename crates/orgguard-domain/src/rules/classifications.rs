use super::utils::enforce_permission;
use super::{PartialRuleResult, PolicyRule, RuleContext, RuleError, RuleInit};
use crate::model::{GrantedPermission, ResolvedPermissionHolder, ResolvedUser};
use async_trait::async_trait;
use orgguard_types::{ClassificationKind, PrivilegeLevel};
use std::collections::BTreeMap;

fn preset_or_unknown<E>(
    ctx: &RuleContext<'_, E>,
    out: &mut PartialRuleResult,
    entity: &str,
) -> PrivilegeLevel {
    match ctx.config.preset_for(ctx.policy, entity) {
        Some(preset) => preset,
        None => {
            out.warning(
                [entity],
                format!(
                    "No preset configured for {entity}, audited as {}.",
                    PrivilegeLevel::Unknown
                ),
            );
            PrivilegeLevel::Unknown
        }
    }
}

/// Classification enforcement for profiles and permission sets.
pub struct EnforceHolderClassifications {
    name: String,
}

impl EnforceHolderClassifications {
    pub fn new(init: RuleInit) -> Self {
        Self {
            name: init.display_name,
        }
    }

    pub fn boxed(init: RuleInit) -> Box<dyn PolicyRule<ResolvedPermissionHolder>> {
        Box::new(Self::new(init))
    }
}

#[async_trait]
impl PolicyRule<ResolvedPermissionHolder> for EnforceHolderClassifications {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &RuleContext<'_, ResolvedPermissionHolder>,
    ) -> Result<PartialRuleResult, RuleError> {
        let mut out = PartialRuleResult::new(&self.name);
        let check_custom = ctx.config.has_classification(ClassificationKind::CustomPermissions);

        for (id, holder) in ctx.entities {
            let preset = preset_or_unknown(ctx, &mut out, id);

            for permission in &holder.user_permissions {
                let classification =
                    ctx.config.classification(ClassificationKind::UserPermissions, permission);
                enforce_permission(&mut out, id, permission, classification, preset, "");
            }

            if check_custom {
                for permission in &holder.custom_permissions {
                    let classification = ctx
                        .config
                        .classification(ClassificationKind::CustomPermissions, permission);
                    enforce_permission(&mut out, id, permission, classification, preset, "");
                }
            }
        }

        Ok(out)
    }
}

/// Classification enforcement over the effective permissions of users.
pub struct EnforceUserClassifications {
    name: String,
}

impl EnforceUserClassifications {
    pub fn new(init: RuleInit) -> Self {
        Self {
            name: init.display_name,
        }
    }

    pub fn boxed(init: RuleInit) -> Box<dyn PolicyRule<ResolvedUser>> {
        Box::new(Self::new(init))
    }
}

/// Group grants by permission so a permission granted twice yields one finding.
fn group_grants(grants: &[GrantedPermission]) -> BTreeMap<&str, Vec<&str>> {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for grant in grants {
        let sources = grouped.entry(grant.name.as_str()).or_default();
        if !sources.contains(&grant.source.as_str()) {
            sources.push(grant.source.as_str());
        }
    }
    grouped
}

#[async_trait]
impl PolicyRule<ResolvedUser> for EnforceUserClassifications {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &RuleContext<'_, ResolvedUser>,
    ) -> Result<PartialRuleResult, RuleError> {
        let mut out = PartialRuleResult::new(&self.name);
        let check_custom = ctx.config.has_classification(ClassificationKind::CustomPermissions);

        for (id, user) in ctx.entities {
            let preset = preset_or_unknown(ctx, &mut out, id);

            let mut kinds = vec![(ClassificationKind::UserPermissions, &user.user_permissions)];
            if check_custom {
                kinds.push((ClassificationKind::CustomPermissions, &user.custom_permissions));
            }

            for (kind, grants) in kinds {
                for (permission, sources) in group_grants(grants) {
                    let note = format!(" (granted by {})", sources.join(", "));
                    let classification = ctx.config.classification(kind, permission);
                    enforce_permission(&mut out, id, permission, classification, preset, &note);
                }
            }
        }

        Ok(out)
    }
}
