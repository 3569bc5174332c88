//! meshchat CLI configuration management
//!
//! Loads the optional TOML configuration file and maps it onto the session
//! options the core crate consumes. Every field has a default, so a missing
//! file or an empty one both yield the stock DC540 channel setup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use meshchat_core::config::{
    DEFAULT_CHANNEL_INDEX, DEFAULT_CHANNEL_NAME, DEFAULT_CHANNEL_PSK_B64, EVENT_QUEUE_CAPACITY,
    SEND_PACING, SETTLE_DELAY,
};
use meshchat_core::{ChannelRequest, SessionOptions};

use crate::error::{CliError, Result};

/// Channel slots available on the radio; index 0 is the primary channel.
const MAX_CHANNEL_INDEX: u32 = 7;

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the meshchat CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Channel to provision and chat on
    pub channel: ChannelSection,

    /// Session timing and display behavior
    pub session: SessionSection,
}

/// Channel provisioning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSection {
    /// Channel slot index (1..=7; 0 is the primary channel)
    pub index: u32,

    /// Channel name
    pub name: String,

    /// Base64-encoded 256-bit pre-shared key
    pub psk_base64: String,
}

/// Session behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Input prompt; derived from the channel index when unset
    pub prompt: Option<String>,

    /// Delay after opening the port before configuring the radio
    pub settle_delay_ms: u64,

    /// Pause between consecutive outbound sends
    pub send_pacing_ms: u64,

    /// Bound on the inbound event queue
    pub event_queue_capacity: usize,
}

impl Default for ChannelSection {
    fn default() -> Self {
        Self {
            index: DEFAULT_CHANNEL_INDEX,
            name: DEFAULT_CHANNEL_NAME.to_string(),
            psk_base64: DEFAULT_CHANNEL_PSK_B64.to_string(),
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            prompt: None,
            settle_delay_ms: SETTLE_DELAY.as_millis() as u64,
            send_pacing_ms: SEND_PACING.as_millis() as u64,
            event_queue_capacity: EVENT_QUEUE_CAPACITY,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            channel: ChannelSection::default(),
            session: SessionSection::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that make the session unrunnable if violated.
    ///
    /// A key of the wrong length is deliberately not checked here; it is a
    /// provisioning-time problem the session survives, not a startup error.
    pub fn validate(&self) -> Result<()> {
        if self.channel.index == 0 || self.channel.index > MAX_CHANNEL_INDEX {
            return Err(CliError::Config(format!(
                "channel index {} out of range (1..={MAX_CHANNEL_INDEX})",
                self.channel.index
            )));
        }
        if self.channel.name.is_empty() {
            return Err(CliError::Config("channel name must not be empty".into()));
        }
        if self.session.event_queue_capacity == 0 {
            return Err(CliError::Config(
                "event queue capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Session options for `run_session`, resolved from this configuration.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            channel: ChannelRequest {
                index: self.channel.index,
                name: self.channel.name.clone(),
                psk_base64: self.channel.psk_base64.clone(),
            },
            prompt: self.session.prompt.clone(),
            settle_delay: Duration::from_millis(self.session.settle_delay_ms),
            send_pacing: Duration::from_millis(self.session.send_pacing_ms),
        }
    }
}
