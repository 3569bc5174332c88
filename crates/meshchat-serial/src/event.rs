//! Radio packet to chat event mapping
//!
//! Pure translation from the decoded protobuf stream into the
//! transport-neutral [`RadioEvent`] the dispatcher consumes. Anything that
//! is not a mesh packet carries no chat payload; anything that is not a
//! plain text port carries no text.

use meshchat_core::{DecodedPayload, RadioEvent};
use meshtastic::protobufs;

/// Map one inbound mesh packet to a chat event.
///
/// Encrypted packets (no decoded variant) yield an event with no payload;
/// decoded packets on ports other than the text-message app yield a payload
/// with no text. Both are passed along so the dispatcher owns the decision
/// to stay silent.
pub(crate) fn packet_event(packet: protobufs::MeshPacket) -> RadioEvent {
    let from_id = (packet.from != 0).then(|| format!("!{:08x}", packet.from));
    let decoded = match packet.payload_variant {
        Some(protobufs::mesh_packet::PayloadVariant::Decoded(data)) => {
            let text = (data.portnum() == protobufs::PortNum::TextMessageApp)
                .then(|| String::from_utf8_lossy(&data.payload).into_owned());
            Some(DecodedPayload { text })
        }
        _ => None,
    };
    RadioEvent { from_id, decoded }
}
