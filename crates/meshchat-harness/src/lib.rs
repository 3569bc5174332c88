//! Test harness for meshchat
//!
//! Provides a deterministic mock device plus scripted input and recording
//! sink implementations, so session behavior can be tested without
//! hardware.

pub mod device;
pub mod io;

pub use device::{MockDevice, MockDeviceProbe};
pub use io::{RecordingSink, ScriptedInput, SinkProbe, SinkRecord};
