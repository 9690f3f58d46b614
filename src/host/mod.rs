//! The boundary between the recorder and whatever is attached to the browser.
//!
//! A [`Host`] resolves frame documents and nodes, reports the browser's ready
//! state and manages document-level event subscriptions. The recorder ships
//! [`ReplayHost`], which serves DOM snapshots read from a transcript.

mod replay;

pub use replay::{DomUpdate, ReplayHost};

use std::fmt;

use crate::dom::{DomError, DomNode, NodeId, ReadyState};

/// Opaque handle for one frame's click/submit/focus-out subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

pub trait Host {
    type Node<'a>: DomNode
    where
        Self: 'a;

    /// The browser's own `readyState`.
    fn ready_state(&self) -> Result<ReadyState, DomError>;

    /// Document root of a frame.
    fn document(&self, frame: &str) -> Result<Self::Node<'_>, DomError>;

    fn node(&self, frame: &str, id: NodeId) -> Result<Self::Node<'_>, DomError>;

    /// Attach click, submit and focus-out listeners to a frame's document.
    fn subscribe(&mut self, frame: &str) -> Result<SubscriptionId, DomError>;

    fn unsubscribe(&mut self, subscription: SubscriptionId);

    /// Route a form's native submit through `subscription`.
    fn bind_submit(
        &mut self,
        frame: &str,
        form: NodeId,
        subscription: SubscriptionId,
    ) -> Result<(), DomError>;

    /// Accept a DOM snapshot from the transcript. Live hosts observe the
    /// browser directly and ignore these.
    fn apply_update(&mut self, update: DomUpdate) {
        tracing::debug!("Ignoring DOM update for frame {:?}", update.frame);
    }
}
