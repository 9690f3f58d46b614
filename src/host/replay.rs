use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Host, SubscriptionId};
use crate::dom::{
    DomError, DomErrorKind, DomNode, DomTree, NodeId, NodeKind, NodeRef, NodeSpec, ReadyState,
};

/// A frame's document as described by one transcript line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomUpdate {
    #[serde(default)]
    pub frame: String,

    #[serde(default)]
    pub ready_state: ReadyState,

    /// The frame's document cannot be read (cross-origin).
    #[serde(default)]
    pub access_denied: bool,

    /// Raw host error raised when the document is accessed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<NodeSpec>,
}

#[derive(Debug)]
struct FrameDocument {
    tree: Option<DomTree>,
    ready_state: ReadyState,
    access_denied: bool,
    error: Option<String>,
}

impl From<DomUpdate> for FrameDocument {
    fn from(update: DomUpdate) -> Self {
        Self {
            tree: update.root.as_ref().map(DomTree::from_spec),
            ready_state: update.ready_state,
            access_denied: update.access_denied,
            error: update.error,
        }
    }
}

/// Serves DOM snapshots replayed from a transcript and keeps the book of
/// subscriptions a live browser would hold.
#[derive(Debug)]
pub struct ReplayHost {
    top_frame: String,
    frames: HashMap<String, FrameDocument>,
    subscriptions: BTreeMap<SubscriptionId, String>,
    submit_bindings: HashMap<(String, NodeId), SubscriptionId>,
    next_subscription: u64,
}

impl ReplayHost {
    pub fn new(top_frame: impl Into<String>) -> Self {
        Self {
            top_frame: top_frame.into(),
            frames: HashMap::new(),
            subscriptions: BTreeMap::new(),
            submit_bindings: HashMap::new(),
            next_subscription: 1,
        }
    }

    /// Number of live subscriptions attached to `frame`.
    pub fn live_subscriptions(&self, frame: &str) -> usize {
        self.subscriptions.values().filter(|f| *f == frame).count()
    }

    /// Forms of `frame` whose submit is routed through a live subscription.
    pub fn bound_forms(&self, frame: &str) -> Vec<NodeId> {
        let mut forms: Vec<_> = self
            .submit_bindings
            .iter()
            .filter(|((f, _), sub)| f == frame && self.subscriptions.contains_key(*sub))
            .map(|((_, form), _)| *form)
            .collect();
        forms.sort();
        forms
    }

    fn frame(&self, frame: &str) -> Result<&FrameDocument, DomError> {
        self.frames.get(frame).ok_or_else(|| {
            DomError::with_kind(
                DomErrorKind::NotReady,
                format!("unknown property or method: document (frame {:?})", frame),
            )
        })
    }

    fn tree(&self, frame: &str) -> Result<&DomTree, DomError> {
        let doc = self.frame(frame)?;
        if let Some(ref message) = doc.error {
            return Err(DomError::new(message.clone()));
        }
        if doc.access_denied {
            return Err(DomError::with_kind(
                DomErrorKind::AccessDenied,
                format!("access denied to document of frame {:?}", frame),
            ));
        }
        doc.tree.as_ref().ok_or_else(|| {
            DomError::with_kind(
                DomErrorKind::NotReady,
                format!("unknown property or method: body (frame {:?})", frame),
            )
        })
    }
}

impl Host for ReplayHost {
    type Node<'a> = NodeRef<'a>;

    fn ready_state(&self) -> Result<ReadyState, DomError> {
        Ok(self
            .frames
            .get(&self.top_frame)
            .map(|doc| doc.ready_state)
            .unwrap_or(ReadyState::Uninitialized))
    }

    fn document(&self, frame: &str) -> Result<NodeRef<'_>, DomError> {
        Ok(self.tree(frame)?.root())
    }

    fn node(&self, frame: &str, id: NodeId) -> Result<NodeRef<'_>, DomError> {
        self.tree(frame)?.get(id).ok_or_else(|| {
            DomError::with_kind(
                DomErrorKind::NotReady,
                format!("unknown property or method: node {} (frame {:?})", id, frame),
            )
        })
    }

    fn subscribe(&mut self, frame: &str) -> Result<SubscriptionId, DomError> {
        self.tree(frame)?;
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, frame.to_string());
        tracing::debug!("Subscribed {} to frame {:?}", id, frame);
        Ok(id)
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        if self.subscriptions.remove(&subscription).is_some() {
            self.submit_bindings.retain(|_, sub| *sub != subscription);
            tracing::debug!("Released {}", subscription);
        }
    }

    fn bind_submit(
        &mut self,
        frame: &str,
        form: NodeId,
        subscription: SubscriptionId,
    ) -> Result<(), DomError> {
        let node = self.node(frame, form)?;
        if node.kind() != NodeKind::Form {
            return Err(DomError::with_kind(
                DomErrorKind::Other,
                format!("node {} of frame {:?} is not a form", form, frame),
            ));
        }
        self.submit_bindings
            .insert((frame.to_string(), form), subscription);
        Ok(())
    }

    fn apply_update(&mut self, update: DomUpdate) {
        tracing::debug!(
            "DOM update for frame {:?} (readyState {:?})",
            update.frame,
            update.ready_state
        );
        let frame = update.frame.clone();
        self.frames.insert(frame, FrameDocument::from(update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(frame: &str) -> DomUpdate {
        DomUpdate {
            frame: frame.to_string(),
            root: Some(
                NodeSpec::new("html").child(
                    NodeSpec::new("body").child(NodeSpec::new("form").attr("id", "f")),
                ),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn unknown_frames_are_not_ready() {
        let host = ReplayHost::new("");
        assert_eq!(host.ready_state().unwrap(), ReadyState::Uninitialized);
        assert_eq!(host.document("").unwrap_err().kind(), DomErrorKind::NotReady);
    }

    #[test]
    fn denied_and_failing_frames_surface_their_kind() {
        let mut host = ReplayHost::new("");
        host.apply_update(DomUpdate {
            frame: "ads".to_string(),
            access_denied: true,
            ..Default::default()
        });
        host.apply_update(DomUpdate {
            frame: "broken".to_string(),
            error: Some("The RPC server is unavailable".to_string()),
            ..Default::default()
        });

        assert_eq!(host.document("ads").unwrap_err().kind(), DomErrorKind::AccessDenied);
        assert_eq!(host.document("broken").unwrap_err().kind(), DomErrorKind::Other);
    }

    #[test]
    fn unsubscribe_drops_submit_bindings() {
        let mut host = ReplayHost::new("");
        host.apply_update(update(""));

        let sub = host.subscribe("").unwrap();
        host.bind_submit("", NodeId(3), sub).unwrap();
        assert_eq!(host.live_subscriptions(""), 1);
        assert_eq!(host.bound_forms(""), [NodeId(3)]);

        host.unsubscribe(sub);
        assert_eq!(host.live_subscriptions(""), 0);
        assert!(host.bound_forms("").is_empty());
    }

    #[test]
    fn bind_submit_rejects_non_forms() {
        let mut host = ReplayHost::new("");
        host.apply_update(update(""));
        let sub = host.subscribe("").unwrap();

        let err = host.bind_submit("", NodeId(2), sub).unwrap_err();
        assert_eq!(err.kind(), DomErrorKind::Other);
    }

    #[test]
    fn update_parses_camel_case_json() {
        let update: DomUpdate = serde_json::from_str(
            r#"{"frame":"main","readyState":"loading","root":{"tag":"html"}}"#,
        )
        .unwrap();
        assert_eq!(update.ready_state, ReadyState::Loading);
        assert!(!update.access_denied);
        assert!(update.root.is_some());
    }
}
