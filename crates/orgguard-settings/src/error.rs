use std::fmt;
use thiserror::Error;

/// One problem found in one configuration file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaIssue {
    pub file: String,
    /// Dot-joined path to the offending field; empty for file-level problems.
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(file: &str, path: &[&str], message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            path: path.join("."),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.file, self.message)
        } else {
            write!(f, "{}: {}: {}", self.file, self.path, self.message)
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Every issue found across all files, sorted by file and path.
    #[error("invalid configuration ({} issue(s)):\n{}", .0.len(), render(.0))]
    Schema(Vec<SchemaIssue>),
}

impl ConfigError {
    pub fn issues(&self) -> &[SchemaIssue] {
        match self {
            ConfigError::Schema(issues) => issues,
        }
    }
}

fn render(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}
