//! Serial device over the meshtastic stream API
//!
//! `SerialDevice` owns the configured stream handle and a background adapter
//! task. The adapter drains the decoded packet stream from the radio,
//! records node and channel state as the device reports it, and forwards
//! chat-relevant packets onto a bounded event queue. Everything else in the
//! crate talks to the radio through the `MeshDevice` trait only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use meshtastic::api::state::Configured;
use meshtastic::api::{ConnectedStreamApi, StreamApi};
use meshtastic::packet::{PacketDestination, PacketRouter};
use meshtastic::protobufs;
use meshtastic::types::NodeId;
use meshtastic::utils;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use meshchat_core::{
    ChannelSlot, ConfigurationError, ConnectionError, EventReceiver, MeshDevice, RadioEvent,
    SendError,
};

use crate::event::packet_event;

// ----------------------------------------------------------------------------
// Packet Router
// ----------------------------------------------------------------------------

/// The chat router never fails; outbound routing has no fallible step.
#[derive(Debug, Error)]
enum RouteError {}

/// Minimal router for outbound packets.
///
/// The stream API asks the router for the source node id when it builds a
/// packet. Inbound traffic is handled by the adapter task, so both handler
/// hooks are no-ops here.
struct ChatRouter {
    node_id: Arc<AtomicU32>,
}

impl PacketRouter<(), RouteError> for ChatRouter {
    fn handle_packet_from_radio(
        &mut self,
        _packet: protobufs::FromRadio,
    ) -> Result<(), RouteError> {
        Ok(())
    }

    fn handle_mesh_packet(&mut self, _packet: protobufs::MeshPacket) -> Result<(), RouteError> {
        Ok(())
    }

    fn source_node_id(&self) -> NodeId {
        self.node_id.load(Ordering::Relaxed).into()
    }
}

// ----------------------------------------------------------------------------
// Shadow State
// ----------------------------------------------------------------------------

/// Device state mirrored from the radio's startup config stream.
#[derive(Default)]
struct ShadowState {
    channels: HashMap<u32, ChannelSlot>,
    lora: Option<protobufs::config::LoRaConfig>,
}

// ----------------------------------------------------------------------------
// Serial Device
// ----------------------------------------------------------------------------

/// A mesh radio reached over a serial port.
pub struct SerialDevice {
    port: String,
    api: Option<ConnectedStreamApi<Configured>>,
    router: ChatRouter,
    shadow: Arc<Mutex<ShadowState>>,
    staged: HashMap<u32, ChannelSlot>,
    preset_override: Option<bool>,
    adapter: JoinHandle<()>,
}

impl SerialDevice {
    /// Open `port` and hand back the device plus its inbound event queue.
    ///
    /// The radio replays its node info, config, and channel table right
    /// after the stream is configured; the adapter task captures those
    /// before the settle delay elapses, so channel reads that follow it see
    /// the real slot contents.
    pub async fn open(
        port: &str,
        queue_capacity: usize,
    ) -> Result<(Self, EventReceiver), ConnectionError> {
        let open_error = |reason: String| ConnectionError::Open {
            port: port.to_string(),
            reason,
        };

        let stream = utils::stream::build_serial_stream(port.to_string(), None, None, None)
            .map_err(|err| open_error(err.to_string()))?;
        let (listener, connected) = StreamApi::new().connect(stream).await;
        let api = connected
            .configure(utils::generate_rand_id())
            .await
            .map_err(|err| open_error(err.to_string()))?;

        let node_id = Arc::new(AtomicU32::new(0));
        let shadow = Arc::new(Mutex::new(ShadowState::default()));
        let (events_tx, events_rx) = mpsc::channel(queue_capacity);
        let adapter = tokio::spawn(adapter_loop(
            listener,
            events_tx,
            node_id.clone(),
            shadow.clone(),
        ));

        let device = Self {
            port: port.to_string(),
            api: Some(api),
            router: ChatRouter { node_id },
            shadow,
            staged: HashMap::new(),
            preset_override: None,
            adapter,
        };
        Ok((device, events_rx))
    }

    fn shadow(&self) -> std::sync::MutexGuard<'_, ShadowState> {
        // Held only for map reads and inserts; a poisoned lock means the
        // adapter task panicked mid-insert and the mirror is suspect anyway.
        match self.shadow.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MeshDevice for SerialDevice {
    fn channel(&self, index: u32) -> Result<ChannelSlot, ConfigurationError> {
        self.shadow()
            .channels
            .get(&index)
            .cloned()
            .ok_or(ConfigurationError::NoSuchChannel { index })
    }

    fn stage_channel(&mut self, index: u32, slot: ChannelSlot) -> Result<(), ConfigurationError> {
        if !self.shadow().channels.contains_key(&index) {
            return Err(ConfigurationError::NoSuchChannel { index });
        }
        self.staged.insert(index, slot);
        Ok(())
    }

    async fn write_channel(&mut self, index: u32) -> Result<(), ConfigurationError> {
        let slot = self
            .staged
            .remove(&index)
            .ok_or(ConfigurationError::NoSuchChannel { index })?;
        let channel = protobufs::Channel {
            index: index as i32,
            settings: Some(protobufs::ChannelSettings {
                name: slot.name.clone(),
                psk: slot.psk.clone(),
                ..Default::default()
            }),
            role: protobufs::channel::Role::Secondary as i32,
        };

        let api = self
            .api
            .as_mut()
            .ok_or_else(|| ConfigurationError::ChannelWrite {
                index,
                reason: "connection closed".to_string(),
            })?;
        api.update_channel_config(&mut self.router, channel)
            .await
            .map_err(|err| ConfigurationError::ChannelWrite {
                index,
                reason: err.to_string(),
            })?;

        debug!(index, name = %slot.name, "channel settings written");
        self.preset_override = Some(slot.use_preset);
        self.shadow().channels.insert(index, slot);
        Ok(())
    }

    async fn write_config(&mut self) -> Result<(), ConfigurationError> {
        // Start from the radio's own LoRa config so a modem-preset toggle
        // does not clobber region or hop settings it shipped with.
        let mut lora = self.shadow().lora.clone().unwrap_or_default();
        if let Some(use_preset) = self.preset_override.take() {
            lora.use_preset = use_preset;
        }
        let config = protobufs::Config {
            payload_variant: Some(protobufs::config::PayloadVariant::Lora(lora)),
        };

        let api = self
            .api
            .as_mut()
            .ok_or_else(|| ConfigurationError::ConfigWrite {
                reason: "connection closed".to_string(),
            })?;
        api.update_config(&mut self.router, config)
            .await
            .map_err(|err| ConfigurationError::ConfigWrite {
                reason: err.to_string(),
            })?;

        debug!("node config written");
        Ok(())
    }

    async fn send_text(&mut self, text: &str, channel_index: u32) -> Result<(), SendError> {
        let api = self.api.as_mut().ok_or(SendError::ConnectionClosed)?;
        api.send_text(
            &mut self.router,
            text.to_string(),
            PacketDestination::Broadcast,
            true,
            channel_index.into(),
        )
        .await
        .map_err(|err| SendError::Transmit {
            channel_index,
            reason: err.to_string(),
        })
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        if let Some(api) = self.api.take() {
            debug!(port = %self.port, "disconnecting serial stream");
            api.disconnect()
                .await
                .map_err(|err| ConnectionError::Disconnect(err.to_string()))?;
        }
        // Dropping the stream ends the listener; abort covers the case
        // where the adapter is parked on a full event queue.
        self.adapter.abort();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Adapter Task
// ----------------------------------------------------------------------------

/// Drain the decoded radio stream until it ends or the queue's consumer
/// goes away.
async fn adapter_loop(
    mut listener: mpsc::UnboundedReceiver<protobufs::FromRadio>,
    events: mpsc::Sender<RadioEvent>,
    node_id: Arc<AtomicU32>,
    shadow: Arc<Mutex<ShadowState>>,
) {
    use protobufs::from_radio::PayloadVariant;

    while let Some(from_radio) = listener.recv().await {
        match from_radio.payload_variant {
            Some(PayloadVariant::MyInfo(info)) => {
                debug!(node = %format!("!{:08x}", info.my_node_num), "node id learned");
                node_id.store(info.my_node_num, Ordering::Relaxed);
            }
            Some(PayloadVariant::Channel(channel)) => {
                record_channel(&shadow, channel);
            }
            Some(PayloadVariant::Config(config)) => {
                if let Some(protobufs::config::PayloadVariant::Lora(lora)) = config.payload_variant
                {
                    lock_shadow(&shadow).lora = Some(lora);
                }
            }
            Some(PayloadVariant::Packet(packet)) => {
                if events.send(packet_event(packet)).await.is_err() {
                    // Dispatcher dropped its receiver; nothing left to feed.
                    break;
                }
            }
            _ => {}
        }
    }
    debug!("radio event stream ended");
}

fn record_channel(shadow: &Arc<Mutex<ShadowState>>, channel: protobufs::Channel) {
    if channel.index < 0 {
        warn!(index = channel.index, "radio reported a negative channel index");
        return;
    }
    let settings = channel.settings.unwrap_or_default();
    let mut state = lock_shadow(shadow);
    let use_preset = state.lora.as_ref().map(|l| l.use_preset).unwrap_or(false);
    state.channels.insert(
        channel.index as u32,
        ChannelSlot {
            name: settings.name,
            psk: settings.psk,
            use_preset,
        },
    );
}

fn lock_shadow(shadow: &Arc<Mutex<ShadowState>>) -> std::sync::MutexGuard<'_, ShadowState> {
    match shadow.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
