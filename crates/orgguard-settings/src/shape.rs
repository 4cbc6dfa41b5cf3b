//! Declarative description of the configuration document.

use orgguard_types::{ClassificationKind, PolicyKind, ids};
use std::collections::BTreeMap;

/// What a configuration file contains, which selects its content validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileKind {
    Classification(ClassificationKind),
    Policy(PolicyKind),
}

impl FileKind {
    pub fn file_name(self) -> &'static str {
        match self {
            FileKind::Classification(kind) => kind.as_str(),
            FileKind::Policy(kind) => kind.as_str(),
        }
    }
}

/// A classification a policy cannot be validated without.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigDependency {
    pub classification: ClassificationKind,
    /// Stable error code reported when the classification is missing.
    pub error_code: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileShape {
    pub kind: FileKind,
    pub depends_on: Vec<ConfigDependency>,
}

/// Every file a configuration document may contain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigShape {
    classifications: BTreeMap<String, FileShape>,
    policies: BTreeMap<String, FileShape>,
}

impl Default for ConfigShape {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConfigShape {
    /// Shape with no files at all.
    pub fn empty() -> Self {
        Self {
            classifications: BTreeMap::new(),
            policies: BTreeMap::new(),
        }
    }

    /// All known classification and policy files with the built-in dependencies.
    pub fn standard() -> Self {
        let mut shape = Self::empty();
        for kind in ClassificationKind::ALL {
            shape = shape.with_classification(kind);
        }
        for kind in PolicyKind::ALL {
            shape = shape.with_policy(kind, Vec::new());
        }
        shape
            .with_policy(
                PolicyKind::Profiles,
                vec![requires_user_permissions(ids::CODE_PROFILES_REQUIRE_USER_PERMISSIONS)],
            )
            .with_policy(
                PolicyKind::PermissionSets,
                vec![requires_user_permissions(
                    ids::CODE_PERMISSION_SETS_REQUIRE_USER_PERMISSIONS,
                )],
            )
            .with_policy(
                PolicyKind::Users,
                vec![requires_user_permissions(ids::CODE_USERS_REQUIRE_USER_PERMISSIONS)],
            )
    }

    pub fn with_classification(mut self, kind: ClassificationKind) -> Self {
        self.classifications.insert(
            kind.as_str().to_string(),
            FileShape {
                kind: FileKind::Classification(kind),
                depends_on: Vec::new(),
            },
        );
        self
    }

    /// Declare a policy file, replacing any earlier declaration.
    pub fn with_policy(mut self, kind: PolicyKind, depends_on: Vec<ConfigDependency>) -> Self {
        self.policies.insert(
            kind.as_str().to_string(),
            FileShape {
                kind: FileKind::Policy(kind),
                depends_on,
            },
        );
        self
    }

    pub fn classification_file(&self, name: &str) -> Option<&FileShape> {
        self.classifications.get(name)
    }

    pub fn policy_file(&self, name: &str) -> Option<&FileShape> {
        self.policies.get(name)
    }

    pub fn dependencies(&self, kind: PolicyKind) -> &[ConfigDependency] {
        self.policies
            .get(kind.as_str())
            .map(|f| f.depends_on.as_slice())
            .unwrap_or_default()
    }
}

fn requires_user_permissions(error_code: &'static str) -> ConfigDependency {
    ConfigDependency {
        classification: ClassificationKind::UserPermissions,
        error_code,
    }
}
