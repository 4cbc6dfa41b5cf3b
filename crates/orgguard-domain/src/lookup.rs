//! Secondary org lookups available to rules while they run.

use crate::model::ResolvedSetting;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("org lookup failed for {target}: {message}")]
pub struct LookupError {
    pub target: String,
    pub message: String,
}

/// Read-only access to org-wide facts that are not part of a policy's own entities.
#[async_trait]
pub trait OrgLookup: Send + Sync {
    /// Fetch an org setting by name. `Ok(None)` means the setting does not exist.
    async fn setting(&self, name: &str) -> Result<Option<ResolvedSetting>, LookupError>;
}

/// Lookup for runs without org access: every setting is absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOrgLookup;

#[async_trait]
impl OrgLookup for NoOrgLookup {
    async fn setting(&self, _name: &str) -> Result<Option<ResolvedSetting>, LookupError> {
        Ok(None)
    }
}

/// Lookup backed by settings resolved ahead of time.
#[derive(Clone, Debug, Default)]
pub struct StaticOrgLookup {
    settings: BTreeMap<String, ResolvedSetting>,
}

impl StaticOrgLookup {
    pub fn new(settings: BTreeMap<String, ResolvedSetting>) -> Self {
        Self { settings }
    }

    pub fn with_setting(mut self, setting: ResolvedSetting) -> Self {
        self.settings.insert(setting.name.clone(), setting);
        self
    }
}

#[async_trait]
impl OrgLookup for StaticOrgLookup {
    async fn setting(&self, name: &str) -> Result<Option<ResolvedSetting>, LookupError> {
        Ok(self.settings.get(name).cloned())
    }
}
