//! Channel configuration types and fixed defaults
//!
//! The client chats on one logical channel whose slot is provisioned once
//! at startup. Defaults below reproduce the stock deployment (channel 1,
//! label "DC540", a fixed base64 256-bit preshared key) and can be
//! overridden from the CLI configuration file.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::ConfigurationError;

/// Channel slot the client provisions and chats on.
pub const DEFAULT_CHANNEL_INDEX: u32 = 1;

/// Default channel label.
pub const DEFAULT_CHANNEL_NAME: &str = "DC540";

/// Default preshared key, base64 for a 256-bit secret.
pub const DEFAULT_CHANNEL_PSK_B64: &str = "OVRpanBCYjZ2WmVIZTRheVlSZDZZWGxUcElFNFRSaWo=";

/// Pause after connecting, letting the serial link stabilize before any
/// provisioning or send operation is attempted.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Pause after each send, bounding the outbound message rate.
pub const SEND_PACING: Duration = Duration::from_millis(100);

/// Capacity of the bounded inbound event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Decoded preshared key length for a 256-bit channel key.
pub const PSK_LEN: usize = 32;

/// Input prompt for a channel, e.g. `"Ch1> "`.
pub fn channel_prompt(index: u32) -> String {
    format!("Ch{index}> ")
}

// ----------------------------------------------------------------------------
// Preshared Key
// ----------------------------------------------------------------------------

/// A validated 256-bit channel preshared key.
#[derive(Clone, PartialEq, Eq)]
pub struct Psk([u8; PSK_LEN]);

impl Psk {
    /// Decode a base64 key, rejecting anything that is not exactly 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigurationError> {
        let bytes = BASE64.decode(encoded.trim())?;
        let actual = bytes.len();
        let key: [u8; PSK_LEN] = bytes.try_into().map_err(|_| ConfigurationError::PskLength {
            expected: PSK_LEN,
            actual,
        })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; PSK_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

// Debug output omits the key material.
impl std::fmt::Debug for Psk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Psk([..; {PSK_LEN}])")
    }
}

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Validated configuration for one secure channel slot.
///
/// Constructing one with a custom key forces `use_preset` off; the two are
/// mutually exclusive on the radio.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub index: u32,
    pub name: String,
    psk: Psk,
    use_preset: bool,
}

impl ChannelConfig {
    /// A channel secured with a custom preshared key.
    pub fn with_key(index: u32, name: impl Into<String>, psk: Psk) -> Self {
        Self {
            index,
            name: name.into(),
            psk,
            // Custom key and built-in preset are mutually exclusive.
            use_preset: false,
        }
    }

    pub fn psk(&self) -> &Psk {
        &self.psk
    }

    pub fn use_preset(&self) -> bool {
        self.use_preset
    }
}

/// Unvalidated channel request, as read from configuration.
///
/// Resolution decodes the preshared key; a malformed key fails the
/// provisioning step (non-fatally) rather than the whole program.
#[derive(Debug, Clone)]
pub struct ChannelRequest {
    pub index: u32,
    pub name: String,
    pub psk_base64: String,
}

impl Default for ChannelRequest {
    fn default() -> Self {
        Self {
            index: DEFAULT_CHANNEL_INDEX,
            name: DEFAULT_CHANNEL_NAME.to_string(),
            psk_base64: DEFAULT_CHANNEL_PSK_B64.to_string(),
        }
    }
}

impl ChannelRequest {
    /// Validate the request into a usable channel configuration.
    pub fn resolve(&self) -> Result<ChannelConfig, ConfigurationError> {
        let psk = Psk::from_base64(&self.psk_base64)?;
        Ok(ChannelConfig::with_key(self.index, self.name.clone(), psk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_psk_decodes_to_256_bits() {
        let psk = Psk::from_base64(DEFAULT_CHANNEL_PSK_B64).unwrap();
        assert_eq!(psk.as_bytes().len(), PSK_LEN);
    }

    #[test]
    fn short_psk_is_rejected() {
        // "c2hvcnQ=" decodes to the 5 bytes of "short".
        let err = Psk::from_base64("c2hvcnQ=").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::PskLength {
                expected: PSK_LEN,
                actual: 5
            }
        ));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = Psk::from_base64("not base64!").unwrap_err();
        assert!(matches!(err, ConfigurationError::PskEncoding(_)));
    }

    #[test]
    fn custom_key_forces_preset_off() {
        let psk = Psk::from_base64(DEFAULT_CHANNEL_PSK_B64).unwrap();
        let config = ChannelConfig::with_key(1, "DC540", psk);
        assert!(!config.use_preset());
    }

    #[test]
    fn default_request_resolves() {
        let config = ChannelRequest::default().resolve().unwrap();
        assert_eq!(config.index, 1);
        assert_eq!(config.name, "DC540");
    }

    #[test]
    fn prompt_carries_channel_index() {
        assert_eq!(channel_prompt(1), "Ch1> ");
    }

    #[test]
    fn psk_debug_hides_key_material() {
        let psk = Psk::from_base64(DEFAULT_CHANNEL_PSK_B64).unwrap();
        assert!(!format!("{psk:?}").contains("9Tij"));
    }
}
