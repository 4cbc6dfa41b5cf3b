use super::PartialRuleResult;
use crate::policy::PermissionClassification;
use orgguard_types::{PrivilegeLevel, RiskLevel, permission_allowed_under_preset};
use time::OffsetDateTime;

/// Whole days between two instants (absolute difference, floored).
pub fn whole_days_between(a: OffsetDateTime, b: OffsetDateTime) -> i64 {
    (a - b).whole_days().abs()
}

/// Classify one granted permission against the holder's preset.
///
/// `entity` and `permission` form the identifier. `grant_note` is appended to messages
/// (for example the profile that grants a user's permission).
pub fn enforce_permission(
    out: &mut PartialRuleResult,
    entity: &str,
    permission: &str,
    classification: Option<&PermissionClassification>,
    preset: PrivilegeLevel,
    grant_note: &str,
) {
    let identifier = [entity, permission];
    let Some(classification) = classification else {
        out.warning(
            identifier,
            format!("Permission {permission} is not classified{grant_note}."),
        );
        return;
    };
    let risk = classification.classification;

    if risk == RiskLevel::Blocked {
        out.violation(
            identifier,
            format!("Permission {permission} is blocked and must not be granted{grant_note}."),
        );
    } else if !permission_allowed_under_preset(risk, preset) {
        out.violation(
            identifier,
            format!(
                "Permission {permission} is classified as {risk} \
                 and not allowed for preset {preset}{grant_note}."
            ),
        );
    } else if risk == RiskLevel::Unknown {
        out.warning(
            identifier,
            format!("Permission {permission} has an unknown risk classification{grant_note}."),
        );
    }
}
