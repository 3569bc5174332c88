//! Scripted input and recording sink
//!
//! `ScriptedInput` feeds a fixed sequence of lines to the send loop and can
//! either end the input (like EOF) or stay pending afterwards so an
//! interrupt path can be exercised. `RecordingSink` captures everything the
//! dispatcher would print.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use meshchat_core::{LineSource, MessageSink};

// ----------------------------------------------------------------------------
// Scripted Input
// ----------------------------------------------------------------------------

/// Line source that replays a fixed script.
pub struct ScriptedInput {
    lines: VecDeque<String>,
    hold_open: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInput {
    /// Replay `lines`, then end the input (the session exits normally).
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            hold_open: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replay `lines`, then wait forever (the session must be interrupted).
    pub fn ending_with_wait(lines: &[&str]) -> Self {
        Self {
            hold_open: true,
            ..Self::new(lines)
        }
    }

    /// Prompts shown so far, for assertions.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        self.prompts.clone()
    }
}

#[async_trait]
impl LineSource for ScriptedInput {
    async fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        match self.lines.pop_front() {
            Some(line) => Some(line),
            None if self.hold_open => futures::future::pending().await,
            None => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Recording Sink
// ----------------------------------------------------------------------------

/// One display-sink call, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkRecord {
    Message(String),
    Prompt(String),
}

/// Sink that records instead of printing.
pub struct RecordingSink {
    records: Arc<Mutex<Vec<SinkRecord>>>,
}

/// Read side of a [`RecordingSink`].
#[derive(Clone)]
pub struct SinkProbe {
    records: Arc<Mutex<Vec<SinkRecord>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, SinkProbe) {
        let records = Arc::new(Mutex::new(Vec::new()));
        let probe = SinkProbe {
            records: records.clone(),
        };
        (Self { records }, probe)
    }
}

impl MessageSink for RecordingSink {
    fn message(&mut self, line: &str) {
        self.records
            .lock()
            .expect("sink records poisoned")
            .push(SinkRecord::Message(line.to_string()));
    }

    fn prompt(&mut self, prompt: &str) {
        self.records
            .lock()
            .expect("sink records poisoned")
            .push(SinkRecord::Prompt(prompt.to_string()));
    }
}

impl SinkProbe {
    /// Everything recorded so far, in call order.
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.lock().expect("sink records poisoned").clone()
    }

    /// Only the message lines, in call order.
    pub fn messages(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Message(line) => Some(line),
                SinkRecord::Prompt(_) => None,
            })
            .collect()
    }
}
