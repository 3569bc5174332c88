//! One-time secure-channel provisioning
//!
//! Runs once after the connection settles and before the chat loop starts.
//! Failures here are non-fatal by design: a broken transport makes chat
//! impossible, but a misconfigured channel merely degrades security and
//! chat is still attempted on whatever state the slot was left in.

use tracing::info;

use crate::config::ChannelConfig;
use crate::connection::{Connection, ConnectionState};
use crate::device::MeshDevice;
use crate::error::ConfigurationError;

/// Configure the secure channel slot on the connection's local node.
///
/// In order: locate the slot at the configured index, stage name, preshared
/// key, and preset flag, persist that single channel, then persist the
/// node's overall configuration. The written state is not re-validated
/// afterwards, so a partially applied configuration goes undetected.
pub async fn provision_channel<D: MeshDevice>(
    conn: &mut Connection<D>,
    config: &ChannelConfig,
) -> Result<(), ConfigurationError> {
    if conn.state() != ConnectionState::Connected {
        return Err(ConfigurationError::ConnectionNotReady {
            state: conn.state().as_str(),
        });
    }

    let index = config.index;
    let device = conn.device_mut();

    let mut slot = device.channel(index)?;
    slot.name = config.name.clone();
    slot.psk = config.psk().to_vec();
    slot.use_preset = config.use_preset();

    device.stage_channel(index, slot)?;
    device.write_channel(index).await?;
    device.write_config().await?;

    info!(index, name = %config.name, "channel provisioned with custom preshared key");
    Ok(())
}
