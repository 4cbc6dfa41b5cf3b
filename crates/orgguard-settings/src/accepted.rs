//! Accepted-risk documents: one tree per policy file, terminating in `{ reason }` leaves.

use crate::error::{ConfigError, SchemaIssue};
use orgguard_domain::accepted_risks::{AcceptedRiskTree, RiskNode};
use orgguard_types::PolicyKind;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const REASON_KEY: &str = "reason";

/// Build the accepted-risk tree from `policy file name -> document`.
///
/// Issues are aggregated across all files like configuration issues.
pub fn parse_accepted_risks(
    files: &BTreeMap<String, Value>,
) -> Result<AcceptedRiskTree, ConfigError> {
    let mut issues = Vec::new();
    let mut tree = AcceptedRiskTree::new();

    for (file, content) in files {
        let Some(kind) = PolicyKind::from_file_name(file) else {
            issues.push(SchemaIssue::new(file, &[], "unknown policy"));
            continue;
        };
        let mut path = Vec::new();
        if let Some(root) = node(file, &mut path, content, &mut issues) {
            tree.set_policy(kind, root);
        }
    }

    if issues.is_empty() {
        Ok(tree)
    } else {
        issues.sort();
        Err(ConfigError::Schema(issues))
    }
}

fn node(
    file: &str,
    path: &mut Vec<String>,
    value: &Value,
    issues: &mut Vec<SchemaIssue>,
) -> Option<RiskNode> {
    let Some(object) = value.as_object() else {
        issues.push(issue(file, path, "expected a table or a { reason } leaf"));
        return None;
    };

    if let Some(reason) = leaf_reason(object) {
        if reason.trim().is_empty() {
            issues.push(issue(file, path, "reason must not be empty"));
            return None;
        }
        return Some(RiskNode::Leaf {
            reason: reason.to_string(),
        });
    }

    let mut children = BTreeMap::new();
    for (segment, child) in object {
        path.push(segment.clone());
        if let Some(parsed) = node(file, path, child, issues) {
            children.insert(segment.clone(), parsed);
        }
        path.pop();
    }
    Some(RiskNode::Branch(children))
}

/// A leaf is a table holding exactly one string `reason`.
fn leaf_reason(object: &Map<String, Value>) -> Option<&str> {
    if object.len() != 1 {
        return None;
    }
    object.get(REASON_KEY).and_then(Value::as_str)
}

fn issue(file: &str, path: &[String], message: &str) -> SchemaIssue {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    SchemaIssue::new(file, &segments, message)
}
