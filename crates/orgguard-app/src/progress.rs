//! Fire-and-forget progress notifications.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use orgguard_types::PolicyKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditProgress {
    PolicyStarted {
        policy: PolicyKind,
    },
    EntitiesResolved {
        policy: PolicyKind,
        resolved: usize,
        total: usize,
    },
    PolicyFinished {
        policy: PolicyKind,
        is_compliant: bool,
    },
}

/// Optional observer of an audit run.
///
/// Sending never blocks and a dropped receiver is ignored, so observers cannot influence the run.
#[derive(Clone, Debug, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<AuditProgress>>,
}

impl ProgressSink {
    /// Sink that discards every event.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn channel() -> (Self, UnboundedReceiver<AuditProgress>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn notify(&self, event: AuditProgress) {
        if let Some(tx) = &self.tx {
            let _ = tx.unbounded_send(event);
        }
    }

    /// Reporter handed to the resolver of one policy.
    pub fn for_policy(&self, policy: PolicyKind) -> ResolveProgress<'_> {
        ResolveProgress { sink: self, policy }
    }
}

/// Progress reporter scoped to one policy's entity resolution.
#[derive(Clone, Copy, Debug)]
pub struct ResolveProgress<'a> {
    sink: &'a ProgressSink,
    policy: PolicyKind,
}

impl ResolveProgress<'_> {
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn entities_resolved(&self, resolved: usize, total: usize) {
        self.sink.notify(AuditProgress::EntitiesResolved {
            policy: self.policy,
            resolved,
            total,
        });
    }
}
