use crate::model::{
    ClassificationFileV1, PermissionSetsPolicyV1, ProfilesPolicyV1, RulesOnlyPolicyV1,
    UsersPolicyV1,
};
use crate::shape::FileKind;
use orgguard_types::PolicyKind;
use schemars::schema_for;

/// JSON Schema describing the content of one configuration file.
pub fn file_schema(kind: FileKind) -> schemars::Schema {
    match kind {
        FileKind::Classification(_) => schema_for!(ClassificationFileV1),
        FileKind::Policy(PolicyKind::Profiles) => schema_for!(ProfilesPolicyV1),
        FileKind::Policy(PolicyKind::PermissionSets) => schema_for!(PermissionSetsPolicyV1),
        FileKind::Policy(PolicyKind::Users) => schema_for!(UsersPolicyV1),
        FileKind::Policy(PolicyKind::ConnectedApps | PolicyKind::Settings) => {
            schema_for!(RulesOnlyPolicyV1)
        }
    }
}
