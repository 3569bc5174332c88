//! Error types for the meshchat core
//!
//! One enum per failure family, matching how each family is handled:
//! connection errors are fatal to the process, configuration and send
//! errors are logged at their call site and the session continues.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Connection Errors (fatal)
// ----------------------------------------------------------------------------

/// Errors raised while opening, settling, or tearing down the device link.
///
/// An open failure is fatal: the caller reports it and the process exits
/// with a non-zero status. No retry is attempted.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to open device at {port}: {reason}")]
    Open { port: String, reason: String },

    #[error("disconnect failed: {0}")]
    Disconnect(String),
}

// ----------------------------------------------------------------------------
// Configuration Errors (non-fatal)
// ----------------------------------------------------------------------------

/// Errors raised while provisioning the secure channel slot.
///
/// All variants are non-fatal: the session logs them and proceeds to the
/// chat loop with the channel left in its prior state.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no channel slot at index {index}")]
    NoSuchChannel { index: u32 },

    #[error("preshared key is not valid base64: {0}")]
    PskEncoding(#[from] base64::DecodeError),

    #[error("preshared key must decode to {expected} bytes, got {actual}")]
    PskLength { expected: usize, actual: usize },

    #[error("failed to write channel {index}: {reason}")]
    ChannelWrite { index: u32, reason: String },

    #[error("failed to persist node configuration: {reason}")]
    ConfigWrite { reason: String },

    #[error("connection is not ready for provisioning (state: {state})")]
    ConnectionNotReady { state: &'static str },
}

// ----------------------------------------------------------------------------
// Send Errors (non-fatal)
// ----------------------------------------------------------------------------

/// Errors raised while transmitting an outbound message.
///
/// Send failures are logged and the interactive loop continues.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("transmit failed on channel {channel_index}: {reason}")]
    Transmit { channel_index: u32, reason: String },

    #[error("connection is closed")]
    ConnectionClosed,
}
