//! Accepted risks: operator-approved mutes addressed by identifier paths.

use orgguard_types::PolicyKind;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RiskNode {
    /// Everything at or below this path is muted.
    Leaf { reason: String },
    Branch(BTreeMap<String, RiskNode>),
}

impl Default for RiskNode {
    fn default() -> Self {
        RiskNode::Branch(BTreeMap::new())
    }
}

/// Per-policy suppression trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AcceptedRiskTree {
    policies: BTreeMap<PolicyKind, RiskNode>,
}

impl AcceptedRiskTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_policy(&mut self, policy: PolicyKind, root: RiskNode) {
        self.policies.insert(policy, root);
    }

    pub fn policy_root(&self, policy: PolicyKind) -> Option<&RiskNode> {
        self.policies.get(&policy)
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Mute `path` (and everything below it) for `policy`.
    ///
    /// A path that is already covered by a shorter leaf is left untouched.
    pub fn mute<S: AsRef<str>>(&mut self, policy: PolicyKind, path: &[S], reason: &str) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };

        let mut node = self.policies.entry(policy).or_default();
        for segment in parents {
            let children = match node {
                RiskNode::Leaf { .. } => return,
                RiskNode::Branch(children) => children,
            };
            node = children.entry(segment.as_ref().to_string()).or_default();
        }

        if let RiskNode::Branch(children) = node {
            children.insert(
                last.as_ref().to_string(),
                RiskNode::Leaf {
                    reason: reason.to_string(),
                },
            );
        }
    }

    /// Returns the recorded reason if `path` is muted for `policy`.
    ///
    /// A leaf on the way down mutes the remainder of the path. An empty path, a path that
    /// ends on a branch, or a missing segment is not muted.
    pub fn is_muted<S: AsRef<str>>(&self, policy: PolicyKind, path: &[S]) -> Option<&str> {
        if path.is_empty() {
            return None;
        }

        let mut node = self.policies.get(&policy)?;
        for segment in path {
            match node {
                RiskNode::Leaf { reason } => return Some(reason),
                RiskNode::Branch(children) => node = children.get(segment.as_ref())?,
            }
        }

        match node {
            RiskNode::Leaf { reason } => Some(reason),
            RiskNode::Branch(_) => None,
        }
    }
}
