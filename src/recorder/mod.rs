//! Record-to-script engine: event routing, locator synthesis and statement
//! emission.

mod driver;
mod emitter;
mod envelope;
mod event;
mod form_scan;
mod locator;
mod router;
mod session;
mod statement;

pub use driver::{Recorder, RecordingSummary};
pub use emitter::{StatementEmitter, DUPLICATE_MARKER};
pub use envelope::ScriptEnvelope;
pub use event::{parse_line, BrowserEvent, TranscriptLine, EVENT_NAMES};
pub use form_scan::scan_form_inputs;
pub use locator::{synthesize, xpath_literal, Locator, LocatorOptions, Segment};
pub use router::{EventRouter, RouterOptions};
pub use session::{FrameRegistrations, RecentClick, RouterState, Session};
pub use statement::{Action, RecordedStatement};
