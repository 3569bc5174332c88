//! Core logic for the meshchat client
//!
//! This crate contains everything that does not touch hardware: the device
//! seam (`MeshDevice`), the connection state machine, secure-channel
//! provisioning, the inbound receive dispatcher, and the interactive chat
//! session loop. Concrete device backends (serial radio, test mock) live in
//! sibling crates and plug in through the `MeshDevice` trait.

pub mod config;
pub mod connection;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod provision;
pub mod session;
pub mod types;

pub use config::{ChannelConfig, ChannelRequest, Psk, PSK_LEN};
pub use connection::{Connection, ConnectionState};
pub use device::{ChannelSlot, DecodedPayload, EventReceiver, MeshDevice, RadioEvent};
pub use dispatch::{MessageSink, ReceiveDispatcher};
pub use error::{ConfigurationError, ConnectionError, SendError};
pub use session::{run_session, LineSource, SessionOptions};
pub use types::{IncomingMessage, OutgoingMessage};
