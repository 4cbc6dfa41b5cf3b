//! Configuration parsing and validation.
//!
//! This crate is intentionally IO-free: it validates documents provided as strings or values.

#![forbid(unsafe_code)]

mod accepted;
mod error;
mod model;
mod resolve;
mod schema;
mod shape;

pub use accepted::parse_accepted_risks;
pub use error::{ConfigError, SchemaIssue};
pub use model::{
    ClassificationFileV1, PermissionClassificationV1, PermissionSetsPolicyV1,
    PresetAssignmentV1, ProfilesPolicyV1, RawConfigDocument, RuleConfigV1, RulesOnlyPolicyV1,
    UsersOptionsV1, UsersPolicyV1,
};
pub use resolve::{ValidatedConfig, validate_config};
pub use schema::file_schema;
pub use shape::{ConfigDependency, ConfigShape, FileKind, FileShape};

use serde_json::Value;

/// Parse one configuration file written in TOML.
///
/// Syntax errors are reported as a file-level issue.
pub fn parse_document_toml(file: &str, input: &str) -> Result<Value, ConfigError> {
    toml::from_str(input)
        .map_err(|e| ConfigError::Schema(vec![SchemaIssue::new(file, &[], e.to_string())]))
}

/// Parse a whole configuration document (`[classifications.<file>]` and `[policies.<file>]`
/// tables) written in TOML.
pub fn parse_config_toml(input: &str) -> Result<RawConfigDocument, ConfigError> {
    toml::from_str(input).map_err(|e| {
        ConfigError::Schema(vec![SchemaIssue::new("<document>", &[], e.to_string())])
    })
}

/// Parse and validate a TOML configuration document against the standard shape.
pub fn load_config_toml(input: &str) -> Result<ValidatedConfig, ConfigError> {
    let doc = parse_config_toml(input)?;
    validate_config(&doc, &ConfigShape::standard())
}
