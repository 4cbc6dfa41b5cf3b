//! Use case orchestration for orgguard.
//!
//! This crate provides the application layer: it drives the domain engine over a validated
//! configuration and entities obtained from caller-provided resolvers.

#![forbid(unsafe_code)]

mod audit;
mod progress;
mod resolver;

pub use audit::{AuditError, AuditInput, AuditRegistries, run_audit, run_audit_at};
pub use progress::{AuditProgress, ProgressSink, ResolveProgress};
pub use resolver::{AuditResolvers, EntityResolver, SelectionOptions, StaticResolver};
