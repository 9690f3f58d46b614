use crate::config::EnvelopeConfig;

const RULE: &str = "# =============================================================== #";

/// Boilerplate around the statement stream: an RSpec suite holding one test
/// case, with a Selenium RC driver started before and stopped after.
#[derive(Debug, Clone)]
pub struct ScriptEnvelope {
    config: EnvelopeConfig,
    receiver: String,
    test_case_index: u32,
}

impl ScriptEnvelope {
    pub fn new(config: EnvelopeConfig, receiver: impl Into<String>) -> Self {
        Self {
            config,
            receiver: receiver.into(),
            test_case_index: 1,
        }
    }

    pub fn with_test_case_index(mut self, index: u32) -> Self {
        self.test_case_index = index;
        self
    }

    /// Everything up to and including the opening of the test case block.
    pub fn header(&self) -> String {
        let c = &self.config;
        let r = &self.receiver;
        let mut out = String::new();
        out.push_str(RULE);
        out.push('\n');
        out.push_str("# Selenium RSpec script - generated by webrec\n");
        out.push_str("# Run with RSpec's \"spec\" command:\n");
        out.push_str("# => spec <this_file.rb>\n");
        out.push_str(RULE);
        out.push('\n');
        out.push_str("require 'selenium/client'\n");
        out.push_str("require 'spec'\n\n");
        out.push_str(&format!("describe {} do\n", ruby_string(&c.suite_name)));
        out.push_str("\tbefore(:all) do\n");
        out.push_str(&format!(
            "\t\t{} = Selenium::Client::Driver.new({}, {}, {}, {}, {})\n",
            r,
            ruby_string(&c.host),
            c.port,
            ruby_string(&c.browser),
            ruby_string(&c.base_url),
            c.timeout_ms
        ));
        out.push_str(&format!("\t\t{}.start\n", r));
        out.push_str("\tend\n\n");
        out.push_str("\tafter(:all) do\n");
        out.push_str(&format!("\t\t{}.stop\n", r));
        out.push_str("\tend\n\n");
        out.push_str(&format!(
            "\tit \"test case {}\" do\n",
            self.test_case_index
        ));
        out
    }

    /// Closes the test case and suite blocks.
    pub fn footer(&self) -> String {
        format!("\tend\nend\n{}\n", RULE)
    }
}

fn ruby_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_connects_to_configured_endpoint() {
        let envelope = ScriptEnvelope::new(EnvelopeConfig::default(), "@selenium");
        let header = envelope.header();

        assert!(header.starts_with(RULE));
        assert!(header.contains("require 'selenium/client'"));
        assert!(header.contains("describe \"Recorded session (RENAME THIS)\" do"));
        assert!(header.contains(
            "\t\t@selenium = Selenium::Client::Driver.new(\"localhost\", 4444, \"*iexplore\", \"http://localhost\", 10000)\n"
        ));
        assert!(header.ends_with("\tit \"test case 1\" do\n"));
    }

    #[test]
    fn footer_closes_both_blocks() {
        let envelope = ScriptEnvelope::new(EnvelopeConfig::default(), "@selenium");
        assert_eq!(envelope.footer(), format!("\tend\nend\n{}\n", RULE));
    }

    #[test]
    fn test_case_index_is_used_in_header() {
        let envelope =
            ScriptEnvelope::new(EnvelopeConfig::default(), "page").with_test_case_index(3);
        let header = envelope.header();
        assert!(header.contains("\tit \"test case 3\" do\n"));
        assert!(header.contains("\t\tpage.start\n"));
    }
}
