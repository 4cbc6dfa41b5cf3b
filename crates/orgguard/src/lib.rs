//! Audit rule evaluation for permission-based platforms.
//!
//! Typical flow: validate a configuration document with [`load_config_toml`] (or
//! [`validate_config`]), parse accepted risks with [`parse_accepted_risks`], then hand both
//! to [`run_audit`] together with one [`EntityResolver`] per audited entity type.

#![forbid(unsafe_code)]

pub use orgguard_app::{
    AuditError, AuditInput, AuditProgress, AuditRegistries, AuditResolvers, EntityResolver,
    ProgressSink, ResolveProgress, SelectionOptions, StaticResolver, run_audit, run_audit_at,
};
pub use orgguard_settings::{
    ConfigDependency, ConfigError, ConfigShape, FileKind, RawConfigDocument, SchemaIssue,
    ValidatedConfig, file_schema, load_config_toml, parse_accepted_risks, parse_config_toml,
    parse_document_toml, validate_config,
};
pub use orgguard_types::*;

pub use orgguard_domain::{accepted_risks, lookup, model, policy, rules};
