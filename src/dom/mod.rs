//! Read-only view of a live DOM as the recorder sees it.
//!
//! The recorder never owns DOM nodes. A host hands out [`DomNode`] handles that
//! are only valid while one event is being handled; anything that has to survive
//! the event (locators, values, [`NodeId`]s) is copied out as plain data.

mod tree;

pub use tree::{DomTree, NodeRef, NodeSpec};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a node inside one document snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of element categories the locator synthesizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Div,
    Form,
    Input,
    Button,
    Table,
    TableRow,
    TableCell,
    ListItem,
    Anchor,
    Span,
    /// Structural elements that only contribute their tag name.
    GenericContainer,
    DocumentRoot,
    Unrecognized,
}

const GENERIC_CONTAINERS: &[&str] = &[
    "html", "body", "head", "thead", "tbody", "tfoot", "th", "ul", "ol", "p", "section",
    "article", "nav", "header", "footer", "main", "aside", "label", "fieldset", "legend",
    "select", "option", "optgroup", "textarea", "img", "iframe", "frame", "frameset", "h1",
    "h2", "h3", "h4", "h5", "h6", "strong", "em", "b", "i", "center", "font", "dl", "dt",
    "dd",
];

impl NodeKind {
    /// Classify a tag name (case-insensitive). `#document` is the document root.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        match tag.as_str() {
            "#document" => NodeKind::DocumentRoot,
            "div" => NodeKind::Div,
            "form" => NodeKind::Form,
            "input" => NodeKind::Input,
            "button" => NodeKind::Button,
            "table" => NodeKind::Table,
            "tr" => NodeKind::TableRow,
            "td" => NodeKind::TableCell,
            "li" => NodeKind::ListItem,
            "a" => NodeKind::Anchor,
            "span" => NodeKind::Span,
            t if GENERIC_CONTAINERS.contains(&t) => NodeKind::GenericContainer,
            _ => NodeKind::Unrecognized,
        }
    }

    /// Canonical tag for kinds that map to exactly one tag.
    pub fn canonical_tag(&self) -> Option<&'static str> {
        match self {
            NodeKind::Div => Some("div"),
            NodeKind::Form => Some("form"),
            NodeKind::Input => Some("input"),
            NodeKind::Button => Some("button"),
            NodeKind::Table => Some("table"),
            NodeKind::TableRow => Some("tr"),
            NodeKind::TableCell => Some("td"),
            NodeKind::ListItem => Some("li"),
            NodeKind::Anchor => Some("a"),
            NodeKind::Span => Some("span"),
            NodeKind::GenericContainer | NodeKind::DocumentRoot | NodeKind::Unrecognized => None,
        }
    }
}

/// Mirrors `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Uninitialized,
    Loading,
    Loaded,
    Interactive,
    #[default]
    Complete,
}

/// A borrowed handle to a node in a live document.
pub trait DomNode: Sized + Clone {
    fn id(&self) -> NodeId;

    fn kind(&self) -> NodeKind;

    /// Lowercase tag name, if the host can provide one.
    fn tag_name(&self) -> Option<String>;

    fn attribute(&self, name: &str) -> Option<String>;

    /// Current value of a form control (may differ from the `value` attribute).
    fn value(&self) -> Option<String>;

    fn checked(&self) -> bool;

    /// Zero-based position among siblings sharing this node's tag.
    fn sibling_index(&self) -> Option<usize>;

    fn parent(&self) -> Option<Self>;

    /// All descendant elements in document order.
    fn descendants(&self) -> Vec<Self>;

    /// Non-empty attribute value.
    fn non_empty_attribute(&self, name: &str) -> Option<String> {
        self.attribute(name).filter(|v| !v.is_empty())
    }

    /// Lowercase `type` of an input or button, with the HTML defaults applied.
    fn control_type(&self) -> Option<String> {
        let default = match self.kind() {
            NodeKind::Input => "text",
            NodeKind::Button => "submit",
            _ => return None,
        };
        Some(
            self.non_empty_attribute("type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| default.to_string()),
        )
    }

    /// Whether activating this element submits its form.
    fn is_submit_control(&self) -> bool {
        matches!(
            (self.kind(), self.control_type().as_deref()),
            (NodeKind::Input, Some("submit" | "image")) | (NodeKind::Button, Some("submit"))
        )
    }

    /// Nearest `form` ancestor, the node itself excluded.
    fn enclosing_form(&self) -> Option<Self> {
        let mut current = self.parent();
        while let Some(node) = current {
            match node.kind() {
                NodeKind::Form => return Some(node),
                NodeKind::DocumentRoot => return None,
                _ => current = node.parent(),
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomErrorKind {
    /// The object is not queryable yet; a later event retries.
    NotReady,
    /// Cross-origin or permission failure.
    AccessDenied,
    Other,
}

/// An error raised by the host DOM layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomError {
    kind: DomErrorKind,
    message: String,
}

impl DomError {
    /// Build an error, classifying it from the host's message text.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = classify(&message);
        Self { kind, message }
    }

    pub fn with_kind(kind: DomErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> DomErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DomError {}

fn classify(message: &str) -> DomErrorKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("unknown property") || lower.contains("unknown method") {
        DomErrorKind::NotReady
    } else if lower.contains("access denied") || lower.contains("access is denied") {
        DomErrorKind::AccessDenied
    } else {
        DomErrorKind::Other
    }
}
