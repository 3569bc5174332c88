//! Serial radio backend for meshchat
//!
//! Implements the `MeshDevice` seam over the `meshtastic` crate's stream
//! API: the radio protocol, packet framing, and key handling on the wire
//! all belong to that crate; this one only adapts its surface to the shape
//! the session logic consumes.

mod device;
mod event;

pub use device::SerialDevice;
