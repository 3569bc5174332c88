//! meshchat CLI library
//!
//! Argument parsing, configuration loading, and the terminal front-end for
//! the interactive chat session. The binary in `main.rs` wires these onto
//! `meshchat_core::run_session` with the serial device backend.

pub mod cli;
pub mod config;
pub mod error;
pub mod terminal;
