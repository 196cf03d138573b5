use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the relay.
///
/// `port` is the catcher listener; the feeds listener has its own block.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub feeds: FeedsSettings,
    pub intake: IntakeSettings,
}

/// Configuration for the SSE feeds listener.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedsSettings {
    pub port: u16,
    /// Seconds between keep-alive frames.
    pub heartbeat: u64,
    /// Frames buffered per subscriber before it is evicted as stalled.
    pub buffer: usize,
}

/// Configuration for the link catcher.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct IntakeSettings {
    /// The only `action` value that is acted upon.
    pub action: String,
    /// Scheme and host the caller is sent back to.
    pub redirect: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub feeds: Option<PartialFeedsSettings>,
    pub intake: Option<PartialIntakeSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialFeedsSettings {
    pub port: Option<u16>,
    pub heartbeat: Option<u64>,
    pub buffer: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialIntakeSettings {
    pub action: Option<String>,
    pub redirect: Option<String>,
}

impl Settings {
    pub fn catcher_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn feeds_addr(&self) -> String {
        format!("{}:{}", self.bind, self.feeds.port)
    }
}

impl FeedsSettings {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat.max(1))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 4020,
            feeds: FeedsSettings::default(),
            intake: IntakeSettings::default(),
        }
    }
}

impl Default for FeedsSettings {
    fn default() -> Self {
        Self {
            port: 4021,
            heartbeat: 25,
            buffer: 64,
        }
    }
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            action: "initialSetup".to_string(),
            redirect: "https://bls.filevineapp.com".to_string(),
        }
    }
}
