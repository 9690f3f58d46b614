mod profile;

pub use profile::{LocatorProfile, COMPACT_PROFILE, FULL_PROFILE};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{RecorderError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Recording behaviour
    #[serde(default)]
    pub recorder: RecorderConfig,

    /// Generated script boilerplate
    #[serde(default)]
    pub envelope: EnvelopeConfig,

    /// Named locator profiles
    #[serde(default)]
    pub profiles: HashMap<String, LocatorProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Frame name the browser reports for the top-level document
    #[serde(default)]
    pub top_frame: String,

    /// Receiver expression every statement is called on
    #[serde(default = "default_receiver")]
    pub receiver: String,

    /// Tab depth of statements inside the test block
    #[serde(default = "default_statement_indent")]
    pub statement_indent: usize,

    /// Timeout passed to wait_for_page_to_load
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_ms: u64,

    /// Record select changes when a control loses focus
    #[serde(default = "default_true")]
    pub capture_focus_out: bool,

    /// Script output path
    #[serde(default = "default_output")]
    pub output: String,

    /// Debug log path used while recording
    #[serde(default = "default_debug_log")]
    pub debug_log: String,

    /// Locator profile used when none is given
    #[serde(default = "default_profile_name")]
    pub default_profile: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            top_frame: String::new(),
            receiver: default_receiver(),
            statement_indent: default_statement_indent(),
            page_load_timeout_ms: default_page_load_timeout(),
            capture_focus_out: true,
            output: default_output(),
            debug_log: default_debug_log(),
            default_profile: default_profile_name(),
        }
    }
}

fn default_receiver() -> String {
    "@selenium".to_string()
}

fn default_statement_indent() -> usize {
    2
}

fn default_page_load_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_output() -> String {
    "recorded_spec.rb".to_string()
}

fn default_debug_log() -> String {
    "webrec-debug.log".to_string()
}

fn default_profile_name() -> String {
    FULL_PROFILE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    /// Name of the generated `describe` block
    #[serde(default = "default_suite_name")]
    pub suite_name: String,

    /// Selenium RC host
    #[serde(default = "default_host")]
    pub host: String,

    /// Selenium RC port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser launcher string
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Base URL handed to the driver
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Driver command timeout
    #[serde(default = "default_driver_timeout")]
    pub timeout_ms: u64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            suite_name: default_suite_name(),
            host: default_host(),
            port: default_port(),
            browser: default_browser(),
            base_url: default_base_url(),
            timeout_ms: default_driver_timeout(),
        }
    }
}

fn default_suite_name() -> String {
    "Recorded session (RENAME THIS)".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    4444
}

fn default_browser() -> String {
    "*iexplore".to_string()
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_driver_timeout() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(FULL_PROFILE.to_string(), LocatorProfile::default());
        profiles.insert(COMPACT_PROFILE.to_string(), LocatorProfile::compact());

        Self {
            recorder: RecorderConfig::default(),
            envelope: EnvelopeConfig::default(),
            profiles,
        }
    }
}

impl Config {
    /// Load configuration from all sources (file, env, defaults)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration using the given file in place of the default path
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            // WEBREC_RECORDER__TOP_FRAME=main -> recorder.top_frame
            .merge(Env::prefixed("WEBREC_").split("__"))
            .extract()
            .map_err(|e| RecorderError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("webrec")
            .join("config.toml")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RecorderError::ConfigError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn effective_default_profile_name(&self) -> String {
        let trimmed = self.recorder.default_profile.trim();
        if trimmed.is_empty() {
            default_profile_name()
        } else {
            trimmed.to_string()
        }
    }

    /// Get a locator profile by name; `None` selects the configured default
    pub fn get_profile(&self, name: Option<&str>) -> Result<LocatorProfile> {
        let name = match name.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => name.to_string(),
            None => self.effective_default_profile_name(),
        };

        if let Some(profile) = self.profiles.get(&name) {
            return Ok(profile.clone());
        }

        LocatorProfile::builtin(&name).ok_or(RecorderError::ProfileNotFound(name))
    }

    /// Look up a dotted key for `config get`
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "recorder.top_frame" => self.recorder.top_frame.clone(),
            "recorder.receiver" => self.recorder.receiver.clone(),
            "recorder.statement_indent" => self.recorder.statement_indent.to_string(),
            "recorder.page_load_timeout_ms" => self.recorder.page_load_timeout_ms.to_string(),
            "recorder.capture_focus_out" => self.recorder.capture_focus_out.to_string(),
            "recorder.output" => self.recorder.output.clone(),
            "recorder.debug_log" => self.recorder.debug_log.clone(),
            "recorder.default_profile" => self.recorder.default_profile.clone(),
            "envelope.suite_name" => self.envelope.suite_name.clone(),
            "envelope.host" => self.envelope.host.clone(),
            "envelope.port" => self.envelope.port.to_string(),
            "envelope.browser" => self.envelope.browser.clone(),
            "envelope.base_url" => self.envelope.base_url.clone(),
            "envelope.timeout_ms" => self.envelope.timeout_ms.to_string(),
            _ => {
                return Err(RecorderError::ConfigError(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        };
        Ok(value)
    }

    /// Update a dotted key for `config set`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value.parse().map_err(|_| {
                RecorderError::ConfigError(format!("Invalid value for {}: {}", key, value))
            })
        }

        match key {
            "recorder.top_frame" => self.recorder.top_frame = value.to_string(),
            "recorder.receiver" => self.recorder.receiver = value.to_string(),
            "recorder.statement_indent" => self.recorder.statement_indent = parse(key, value)?,
            "recorder.page_load_timeout_ms" => {
                self.recorder.page_load_timeout_ms = parse(key, value)?
            }
            "recorder.capture_focus_out" => self.recorder.capture_focus_out = parse(key, value)?,
            "recorder.output" => self.recorder.output = value.to_string(),
            "recorder.debug_log" => self.recorder.debug_log = value.to_string(),
            "recorder.default_profile" => self.recorder.default_profile = value.to_string(),
            "envelope.suite_name" => self.envelope.suite_name = value.to_string(),
            "envelope.host" => self.envelope.host = value.to_string(),
            "envelope.port" => self.envelope.port = parse(key, value)?,
            "envelope.browser" => self.envelope.browser = value.to_string(),
            "envelope.base_url" => self.envelope.base_url = value.to_string(),
            "envelope.timeout_ms" => self.envelope.timeout_ms = parse(key, value)?,
            _ => {
                return Err(RecorderError::ConfigError(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}
