//! Stateful dispatch of browser events into recorded statements.
//!
//! The router owns the [`Session`], the frame registration table, the host and
//! the emitter. Each call to [`EventRouter::dispatch`] runs one handler to
//! completion; statements reach the sink in event order.

use std::io::Write;

use super::emitter::StatementEmitter;
use super::event::BrowserEvent;
use super::form_scan::scan_form_inputs;
use super::locator::{synthesize, LocatorOptions};
use super::session::{FrameRegistrations, RecentClick, RouterState, Session};
use super::statement::{Action, RecordedStatement};
use crate::config::{Config, LocatorProfile};
use crate::dom::{DomNode, NodeId, NodeKind, ReadyState};
use crate::error::{RecorderError, Result};
use crate::host::Host;

/// `WindowStateChanged` flags and mask the browser reports when the user
/// starts a navigation from the address bar.
const DIRECT_NAVIGATION_FLAGS: i64 = 3;

#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Frame name of the top-level document
    pub top_frame: String,
    pub locator: LocatorOptions,
    pub page_load_timeout_ms: u64,
    pub capture_focus_out: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            top_frame: String::new(),
            locator: LocatorOptions::default(),
            page_load_timeout_ms: 30_000,
            capture_focus_out: true,
        }
    }
}

impl RouterOptions {
    pub fn from_config(config: &Config, profile: &LocatorProfile) -> Self {
        Self {
            top_frame: config.recorder.top_frame.clone(),
            locator: LocatorOptions::from(profile),
            page_load_timeout_ms: config.recorder.page_load_timeout_ms,
            capture_focus_out: config.recorder.capture_focus_out,
        }
    }
}

pub struct EventRouter<H: Host, W: Write> {
    host: H,
    emitter: StatementEmitter<W>,
    session: Session,
    registrations: FrameRegistrations,
    options: RouterOptions,
}

impl<H: Host, W: Write> EventRouter<H, W> {
    pub fn new(host: H, emitter: StatementEmitter<W>, options: RouterOptions) -> Self {
        Self {
            host,
            emitter,
            session: Session::new(),
            registrations: FrameRegistrations::default(),
            options,
        }
    }

    pub fn state(&self) -> RouterState {
        self.session.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registrations(&self) -> &FrameRegistrations {
        &self.registrations
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn emitter(&self) -> &StatementEmitter<W> {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut StatementEmitter<W> {
        &mut self.emitter
    }

    pub fn into_emitter(self) -> StatementEmitter<W> {
        self.emitter
    }

    /// Stop reacting to events (quit or interrupt).
    pub fn terminate(&mut self) {
        if !self.session.is_terminated() {
            tracing::info!("Recording terminated");
            self.session.state = RouterState::Terminated;
        }
    }

    /// Handle one event. Only fatal host errors are returned; transient ones
    /// are logged and the event is dropped.
    pub fn dispatch(&mut self, event: &BrowserEvent) -> Result<RouterState> {
        if self.session.is_terminated() {
            tracing::debug!("Ignoring {} after termination", event.name());
            return Ok(RouterState::Terminated);
        }
        tracing::debug!("Dispatching: {:?}", event);

        if let Some(frame) = event.subscribed_frame() {
            if !self.registrations.is_live(frame) {
                tracing::debug!(
                    "Dropping {} for frame {:?}: no live subscription",
                    event.name(),
                    frame
                );
                return Ok(self.session.state);
            }
        }
        if let BrowserEvent::Submit { frame, form } = event {
            if !self.registrations.is_bound(frame, *form) {
                tracing::debug!("Dropping Submit of unbound form {} in {:?}", form, frame);
                return Ok(self.session.state);
            }
        }

        let result = match event {
            BrowserEvent::BeforeNavigate { frame } => {
                self.on_before_navigate(frame);
                Ok(())
            }
            BrowserEvent::DocumentComplete { frame, url } => self.on_document_complete(frame, url),
            BrowserEvent::WindowStateChanged { flags, mask } => {
                self.on_window_state_changed(*flags, *mask);
                Ok(())
            }
            BrowserEvent::Quit => {
                self.terminate();
                Ok(())
            }
            BrowserEvent::Click { frame, target } => self.on_click(frame, *target),
            BrowserEvent::Submit { frame, form } => self.on_form_submit(frame, *form),
            BrowserEvent::FocusOut { frame, target } => self.on_focus_out(frame, *target),
        };

        match result {
            Err(e) if e.is_transient() => {
                tracing::debug!("{} skipped: {}", event.name(), e);
            }
            other => other?,
        }
        Ok(self.session.state)
    }

    fn is_top_frame(&self, frame: &str) -> bool {
        frame == self.options.top_frame
    }

    fn emit(&mut self, statement: RecordedStatement) -> Result<()> {
        self.emitter.emit(&statement, &mut self.session)
    }

    fn on_before_navigate(&mut self, frame: &str) {
        if self.is_top_frame(frame) {
            self.session.reset_frames();
            self.session.recent_click = None;
            self.session.state = RouterState::NavigatingTopLevel;
        } else {
            self.session.state = RouterState::FramesLoading;
        }
        self.session.note_frame(frame);
        self.session.recording = true;
    }

    fn on_window_state_changed(&mut self, flags: i64, mask: i64) {
        if flags == DIRECT_NAVIGATION_FLAGS && mask == DIRECT_NAVIGATION_FLAGS {
            tracing::debug!("Next navigation is a direct open");
            self.session.navigate_directly = true;
        }
    }

    fn on_document_complete(&mut self, frame: &str, url: &str) -> Result<()> {
        let ready_state = self.host.ready_state()?;
        if ready_state != ReadyState::Complete {
            tracing::debug!(
                "DocumentComplete for {:?} while readyState is {:?}, waiting",
                frame,
                ready_state
            );
            return Ok(());
        }

        if self.session.navigate_directly && self.is_top_frame(frame) {
            self.emit(RecordedStatement::open(url))?;
            self.emit(RecordedStatement::wait_for_page_to_load(
                self.options.page_load_timeout_ms,
            ))?;
            self.session.navigate_directly = false;
        }

        self.session.note_frame(frame);
        let frames = self.session.frame_names.clone();
        for name in &frames {
            match self.register_frame(name) {
                Err(RecorderError::AccessDenied(msg)) => {
                    tracing::debug!("Frame {:?} not instrumented: {}", name, msg);
                }
                other => other?,
            }
        }

        self.session.state = RouterState::Ready;
        Ok(())
    }

    /// Subscribe to a frame's document events, replacing any previous
    /// subscription for the same frame, and rebind its forms' submit.
    pub fn register_frame(&mut self, frame: &str) -> Result<()> {
        let forms: Vec<NodeId> = {
            let document = self.host.document(frame)?;
            document
                .descendants()
                .iter()
                .filter(|node| node.kind() == NodeKind::Form)
                .map(|node| node.id())
                .collect()
        };

        if let Some(previous) = self.registrations.remove(frame) {
            self.host.unsubscribe(previous);
        }
        let subscription = self.host.subscribe(frame)?;
        self.registrations.insert(frame, subscription);

        for form in forms {
            self.host.bind_submit(frame, form, subscription)?;
            self.registrations.bind_form(frame, form);
        }
        tracing::debug!("Registered frame {:?} as {}", frame, subscription);
        Ok(())
    }

    fn on_click(&mut self, frame: &str, target: NodeId) -> Result<()> {
        let (statements, recent) = {
            let node = self.host.node(frame, target)?;
            let locator = synthesize(&node, &self.options.locator);
            if locator.is_empty() {
                tracing::debug!("Click on document root of {:?} ignored", frame);
                return Ok(());
            }

            let submitted = submit_control(&node).and_then(|s| s.enclosing_form());

            let mut statements = submitted
                .as_ref()
                .map(|f| scan_form_inputs(f, &self.options.locator))
                .unwrap_or_default();

            let mut click = RecordedStatement::new(Action::Click, locator.to_string());
            if submitted.is_some() || navigates(&node) {
                click = click.waiting_for_page();
            }
            statements.push(click);

            // Any click inside a form may submit it from a script handler.
            let recent = node.enclosing_form().map(|f| RecentClick {
                frame: frame.to_string(),
                form: f.id(),
            });
            (statements, recent)
        };

        for statement in statements {
            self.emit(statement)?;
        }
        self.session.recent_click = recent;
        Ok(())
    }

    fn on_form_submit(&mut self, frame: &str, form: NodeId) -> Result<()> {
        if let Some(click) = self.session.recent_click.take() {
            if click.frame == frame && click.form == form {
                tracing::debug!("Submit of {} already recorded by its click", form);
                return Ok(());
            }
        }

        let statements = {
            let node = self.host.node(frame, form)?;
            let mut statements = scan_form_inputs(&node, &self.options.locator);
            let locator = synthesize(&node, &self.options.locator);
            statements.push(
                RecordedStatement::new(Action::Submit, locator.to_string()).waiting_for_page(),
            );
            statements
        };

        for statement in statements {
            self.emit(statement)?;
        }
        Ok(())
    }

    fn on_focus_out(&mut self, frame: &str, target: NodeId) -> Result<()> {
        self.session.recent_click = None;
        if !self.options.capture_focus_out {
            return Ok(());
        }

        let statement = {
            let node = self.host.node(frame, target)?;
            if node.tag_name().as_deref() != Some("select") {
                return Ok(());
            }
            let Some(value) = node.value() else {
                return Ok(());
            };
            let locator = synthesize(&node, &self.options.locator);
            RecordedStatement::new(Action::Select, locator.to_string())
                .with_value(format!("value={}", value))
        };

        self.emit(statement)
    }
}

/// The control that submits a form when `node` is clicked: the node itself, or
/// the submit button it sits inside.
fn submit_control<N: DomNode>(node: &N) -> Option<N> {
    if node.is_submit_control() {
        return Some(node.clone());
    }
    let mut current = node.parent();
    while let Some(ancestor) = current {
        match ancestor.kind() {
            NodeKind::Button if ancestor.is_submit_control() => return Some(ancestor),
            NodeKind::Form | NodeKind::DocumentRoot => return None,
            _ => current = ancestor.parent(),
        }
    }
    None
}

/// Whether clicking `node` is expected to load a new page.
fn navigates<N: DomNode>(node: &N) -> bool {
    let anchor = if node.kind() == NodeKind::Anchor {
        Some(node.clone())
    } else {
        let mut current = node.parent();
        loop {
            match current {
                Some(n) if n.kind() == NodeKind::Anchor => break Some(n),
                Some(n) if n.kind() == NodeKind::DocumentRoot => break None,
                Some(n) => current = n.parent(),
                None => break None,
            }
        }
    };

    anchor
        .and_then(|a| a.non_empty_attribute("href"))
        .map(|href| {
            let href = href.trim().to_ascii_lowercase();
            !href.starts_with('#') && !href.starts_with("javascript:")
        })
        .unwrap_or(false)
}
