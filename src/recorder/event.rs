use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom::NodeId;
use crate::error::{RecorderError, Result};
use crate::host::DomUpdate;

/// Browser and document events the router reacts to.
///
/// Frame-level events come from the browser itself; `Click`, `Submit` and
/// `FocusOut` are delivered through a frame's document subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum BrowserEvent {
    BeforeNavigate {
        #[serde(default)]
        frame: String,
    },
    DocumentComplete {
        #[serde(default)]
        frame: String,
        url: String,
    },
    WindowStateChanged {
        flags: i64,
        mask: i64,
    },
    Quit,
    Click {
        #[serde(default)]
        frame: String,
        target: NodeId,
    },
    Submit {
        #[serde(default)]
        frame: String,
        form: NodeId,
    },
    FocusOut {
        #[serde(default)]
        frame: String,
        target: NodeId,
    },
}

/// Event names with a handler.
pub const EVENT_NAMES: &[&str] = &[
    "BeforeNavigate",
    "DocumentComplete",
    "WindowStateChanged",
    "Quit",
    "Click",
    "Submit",
    "FocusOut",
];

impl BrowserEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserEvent::BeforeNavigate { .. } => "BeforeNavigate",
            BrowserEvent::DocumentComplete { .. } => "DocumentComplete",
            BrowserEvent::WindowStateChanged { .. } => "WindowStateChanged",
            BrowserEvent::Quit => "Quit",
            BrowserEvent::Click { .. } => "Click",
            BrowserEvent::Submit { .. } => "Submit",
            BrowserEvent::FocusOut { .. } => "FocusOut",
        }
    }

    /// The frame whose document subscription delivers this event.
    pub fn subscribed_frame(&self) -> Option<&str> {
        match self {
            BrowserEvent::Click { frame, .. }
            | BrowserEvent::Submit { frame, .. }
            | BrowserEvent::FocusOut { frame, .. } => Some(frame.as_str()),
            _ => None,
        }
    }
}

/// One parsed transcript line.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptLine {
    Dom(DomUpdate),
    Event(BrowserEvent),
    /// An event name without a handler.
    Unhandled(String),
}

/// Parse a transcript line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<TranscriptLine>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let invalid = |message: String| RecorderError::Transcript {
        line: line_no,
        message,
    };

    let mut value: Value = serde_json::from_str(line).map_err(|e| invalid(e.to_string()))?;

    if let Some(dom) = value.get_mut("dom") {
        let update: DomUpdate =
            serde_json::from_value(dom.take()).map_err(|e| invalid(e.to_string()))?;
        return Ok(Some(TranscriptLine::Dom(update)));
    }

    let name = match value.get("event").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return Err(invalid("expected a \"dom\" or \"event\" field".to_string())),
    };
    if !EVENT_NAMES.contains(&name.as_str()) {
        return Ok(Some(TranscriptLine::Unhandled(name)));
    }

    let event: BrowserEvent = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
    Ok(Some(TranscriptLine::Event(event)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_events_with_default_frame() {
        let line = parse_line(1, r#"{"event":"Click","target":7}"#).unwrap();
        assert_eq!(
            line,
            Some(TranscriptLine::Event(BrowserEvent::Click {
                frame: String::new(),
                target: NodeId(7),
            }))
        );

        let line = parse_line(2, r#"{"event":"Quit"}"#).unwrap();
        assert_eq!(line, Some(TranscriptLine::Event(BrowserEvent::Quit)));
    }

    #[test]
    fn unknown_event_names_are_not_errors() {
        let line = parse_line(1, r#"{"event":"StatusTextChange","text":"Done"}"#).unwrap();
        assert_eq!(
            line,
            Some(TranscriptLine::Unhandled("StatusTextChange".to_string()))
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(parse_line(1, "   ").unwrap().is_none());
        assert!(parse_line(2, "# login flow").unwrap().is_none());
    }

    #[test]
    fn reports_line_numbers_for_bad_input() {
        let err = parse_line(9, r#"{"event":"DocumentComplete","frame":""}"#).unwrap_err();
        assert!(matches!(err, RecorderError::Transcript { line: 9, .. }));

        let err = parse_line(10, r#"{"frame":""}"#).unwrap_err();
        assert!(matches!(err, RecorderError::Transcript { line: 10, .. }));

        assert!(parse_line(11, "not json").is_err());
    }

    #[test]
    fn dom_lines_become_updates() {
        let line = parse_line(1, r#"{"dom":{"frame":"nav","accessDenied":true}}"#).unwrap();
        match line {
            Some(TranscriptLine::Dom(update)) => {
                assert_eq!(update.frame, "nav");
                assert!(update.access_denied);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn subscribed_frame_only_for_document_events() {
        let submit = BrowserEvent::Submit {
            frame: "main".to_string(),
            form: NodeId(2),
        };
        assert_eq!(submit.subscribed_frame(), Some("main"));
        assert_eq!(BrowserEvent::Quit.subscribed_frame(), None);
    }
}
