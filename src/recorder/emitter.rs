use std::io::Write;

use super::session::Session;
use super::statement::{Action, RecordedStatement};
use crate::error::Result;

/// Marker put in front of a click that repeats the previous click verbatim.
pub const DUPLICATE_MARKER: &str = "DUP? ";

/// Formats statements and appends them to the output sink.
pub struct StatementEmitter<W: Write> {
    sink: W,
    receiver: String,
    indent: usize,
    emitted: usize,
    duplicates: usize,
}

impl<W: Write> StatementEmitter<W> {
    pub fn new(sink: W, receiver: impl Into<String>, indent: usize) -> Self {
        Self {
            sink,
            receiver: receiver.into(),
            indent,
            emitted: 0,
            duplicates: 0,
        }
    }

    /// Append one statement line.
    ///
    /// A click whose rendered text equals the previous click is still written,
    /// prefixed with [`DUPLICATE_MARKER`] for review.
    pub fn emit(&mut self, statement: &RecordedStatement, session: &mut Session) -> Result<()> {
        let text = statement.render(&self.receiver);
        let mut line = "\t".repeat(self.indent);

        if statement.action() == Action::Click {
            if session.last_click_signature.as_deref() == Some(text.as_str()) {
                tracing::debug!("Repeated click: {}", text);
                line.push_str(DUPLICATE_MARKER);
                self.duplicates += 1;
            }
            session.last_click_signature = Some(text.clone());
        }

        line.push_str(&text);
        writeln!(self.sink, "{}", line)?;
        tracing::debug!("Emitted: {}", text);

        session.recording = false;
        self.emitted += 1;
        Ok(())
    }

    /// Write envelope text verbatim.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.sink.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(emitter: &StatementEmitter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(emitter.sink().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn indents_with_tabs() {
        let mut session = Session::new();
        let mut emitter = StatementEmitter::new(Vec::new(), "@selenium", 2);
        emitter
            .emit(&RecordedStatement::open("http://example.com"), &mut session)
            .unwrap();

        assert_eq!(output(&emitter), ["\t\t@selenium.open(\"http://example.com\")"]);
    }

    #[test]
    fn second_identical_click_is_marked() {
        let mut session = Session::new();
        let mut emitter = StatementEmitter::new(Vec::new(), "@selenium", 1);
        let click = RecordedStatement::new(Action::Click, "//a[@href='/x']");

        emitter.emit(&click, &mut session).unwrap();
        emitter.emit(&click, &mut session).unwrap();

        let lines = output(&emitter);
        assert_eq!(lines[0], "\t@selenium.click(\"//a[@href='/x']\")");
        assert_eq!(lines[1], "\tDUP? @selenium.click(\"//a[@href='/x']\")");
        assert_eq!(emitter.duplicates(), 1);
        assert_eq!(emitter.emitted(), 2);
    }

    #[test]
    fn duplicate_check_compares_against_previous_click_only() {
        let mut session = Session::new();
        let mut emitter = StatementEmitter::new(Vec::new(), "@selenium", 0);
        let first = RecordedStatement::new(Action::Click, "//button[1]");
        let second = RecordedStatement::new(Action::Click, "//button[2]");
        let typed = RecordedStatement::new(Action::Type, "//input").with_value("x");

        emitter.emit(&first, &mut session).unwrap();
        emitter.emit(&typed, &mut session).unwrap();
        emitter.emit(&first, &mut session).unwrap();
        emitter.emit(&second, &mut session).unwrap();

        let lines = output(&emitter);
        assert!(lines[2].starts_with(DUPLICATE_MARKER));
        assert!(!lines[3].starts_with(DUPLICATE_MARKER));
    }

    #[test]
    fn emitting_ends_the_recording_flag() {
        let mut session = Session::new();
        session.recording = true;
        let mut emitter = StatementEmitter::new(Vec::new(), "@selenium", 2);
        emitter
            .emit(&RecordedStatement::wait_for_page_to_load(30000), &mut session)
            .unwrap();
        assert!(!session.recording);
    }
}
