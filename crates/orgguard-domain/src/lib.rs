//! Pure audit evaluation (no IO).
//!
//! Input: a validated run configuration plus entities resolved elsewhere.
//! Output: per-policy rule results with accepted risks applied.

#![forbid(unsafe_code)]

pub mod accepted_risks;
pub mod lookup;
pub mod model;
pub mod policy;
pub mod rules;

mod engine;

pub use engine::{PolicyRun, finalize_rule, run_policy};

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;
