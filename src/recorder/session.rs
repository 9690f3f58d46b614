use std::collections::{BTreeMap, BTreeSet};

use crate::dom::NodeId;
use crate::host::SubscriptionId;

/// Navigation lifecycle as seen by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterState {
    #[default]
    Idle,
    NavigatingTopLevel,
    FramesLoading,
    Ready,
    Terminated,
}

/// A click inside a form, remembered so a native submit it triggers is not
/// recorded a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentClick {
    pub frame: String,
    pub form: NodeId,
}

/// The single live recording context.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: RouterState,
    /// Set when a navigation starts, cleared by the next emitted statement.
    pub recording: bool,
    /// Emit `open(url)` for the next completed top-level navigation.
    pub navigate_directly: bool,
    /// Frames touched since the last top-level navigation started.
    pub frame_names: Vec<String>,
    pub last_click_signature: Option<String>,
    pub test_case_index: u32,
    pub recent_click: Option<RecentClick>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: RouterState::Idle,
            recording: false,
            navigate_directly: false,
            frame_names: Vec::new(),
            last_click_signature: None,
            test_case_index: 1,
            recent_click: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_terminated(&self) -> bool {
        self.state == RouterState::Terminated
    }

    /// Start a new navigation epoch.
    pub fn reset_frames(&mut self) {
        self.frame_names.clear();
    }

    pub fn note_frame(&mut self, frame: &str) {
        if !self.frame_names.iter().any(|f| f == frame) {
            self.frame_names.push(frame.to_string());
        }
    }
}

/// Live document-event subscription per frame. Holds at most one handle per
/// frame name; callers release the previous handle before inserting a new one.
/// Forms whose submit was bound under a handle are dropped with it.
#[derive(Debug, Clone, Default)]
pub struct FrameRegistrations {
    by_frame: BTreeMap<String, Registration>,
}

#[derive(Debug, Clone)]
struct Registration {
    subscription: SubscriptionId,
    forms: BTreeSet<NodeId>,
}

impl FrameRegistrations {
    pub fn get(&self, frame: &str) -> Option<SubscriptionId> {
        self.by_frame.get(frame).map(|r| r.subscription)
    }

    pub fn is_live(&self, frame: &str) -> bool {
        self.by_frame.contains_key(frame)
    }

    pub fn remove(&mut self, frame: &str) -> Option<SubscriptionId> {
        self.by_frame.remove(frame).map(|r| r.subscription)
    }

    pub fn insert(&mut self, frame: &str, subscription: SubscriptionId) {
        let previous = self.by_frame.insert(
            frame.to_string(),
            Registration {
                subscription,
                forms: BTreeSet::new(),
            },
        );
        debug_assert!(previous.is_none(), "frame {frame:?} registered twice");
    }

    /// Note that `form`'s submit is routed through the frame's subscription.
    /// Returns false when the frame has no live registration.
    pub fn bind_form(&mut self, frame: &str, form: NodeId) -> bool {
        match self.by_frame.get_mut(frame) {
            Some(registration) => {
                registration.forms.insert(form);
                true
            }
            None => false,
        }
    }

    pub fn is_bound(&self, frame: &str, form: NodeId) -> bool {
        self.by_frame
            .get(frame)
            .is_some_and(|r| r.forms.contains(&form))
    }

    pub fn len(&self) -> usize {
        self.by_frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_frame.is_empty()
    }

    pub fn frames(&self) -> impl Iterator<Item = &str> {
        self.by_frame.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_idle_at_first_test_case() {
        let session = Session::new();
        assert_eq!(session.state, RouterState::Idle);
        assert_eq!(session.test_case_index, 1);
        assert!(!session.navigate_directly);
    }

    #[test]
    fn frames_are_noted_once_per_epoch() {
        let mut session = Session::new();
        session.note_frame("");
        session.note_frame("nav");
        session.note_frame("nav");
        assert_eq!(session.frame_names, ["", "nav"]);

        session.reset_frames();
        assert!(session.frame_names.is_empty());
    }

    #[test]
    fn registrations_hold_one_handle_per_frame() {
        let mut regs = FrameRegistrations::default();
        regs.insert("", SubscriptionId(1));
        assert_eq!(regs.remove(""), Some(SubscriptionId(1)));
        regs.insert("", SubscriptionId(2));

        assert_eq!(regs.len(), 1);
        assert_eq!(regs.get(""), Some(SubscriptionId(2)));
        assert!(!regs.is_live("other"));
    }

    #[test]
    fn bound_forms_go_with_their_registration() {
        let mut regs = FrameRegistrations::default();
        assert!(!regs.bind_form("", NodeId(3)));

        regs.insert("", SubscriptionId(1));
        assert!(regs.bind_form("", NodeId(3)));
        assert!(regs.is_bound("", NodeId(3)));
        assert!(!regs.is_bound("", NodeId(4)));

        regs.remove("");
        regs.insert("", SubscriptionId(2));
        assert!(!regs.is_bound("", NodeId(3)));
    }
}
