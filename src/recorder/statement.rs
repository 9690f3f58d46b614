use std::fmt;

/// Script actions the recorder can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Open,
    Type,
    Click,
    Submit,
    Select,
    WaitForPageToLoad,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Open => "open",
            Action::Type => "type",
            Action::Click => "click",
            Action::Submit => "submit",
            Action::Select => "select",
            Action::WaitForPageToLoad => "wait_for_page_to_load",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded user action, immutable once built.
///
/// `target` is the first argument of the call: a locator for element actions,
/// a URL for `open`, a timeout for `wait_for_page_to_load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStatement {
    action: Action,
    target: String,
    value: Option<String>,
    wait_for_page: bool,
}

impl RecordedStatement {
    pub fn new(action: Action, target: impl Into<String>) -> Self {
        Self {
            action,
            target: target.into(),
            value: None,
            wait_for_page: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn waiting_for_page(mut self) -> Self {
        self.wait_for_page = true;
        self
    }

    pub fn open(url: impl Into<String>) -> Self {
        Self::new(Action::Open, url)
    }

    pub fn wait_for_page_to_load(timeout_ms: u64) -> Self {
        Self::new(Action::WaitForPageToLoad, timeout_ms.to_string())
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn waits_for_page(&self) -> bool {
        self.wait_for_page
    }

    /// Render as `<receiver>.<action>("<target>"[, "<value>"][, :wait_for => :page])`.
    pub fn render(&self, receiver: &str) -> String {
        let mut line = format!("{}.{}({}", receiver, self.action, quote(&self.target));
        if let Some(ref value) = self.value {
            line.push_str(", ");
            line.push_str(&quote(value));
        }
        if self.wait_for_page {
            line.push_str(", :wait_for => :page");
        }
        line.push(')');
        line
    }
}

/// Double-quoted Ruby string literal.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            // only `#{`, `#$` and `#@` interpolate
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
