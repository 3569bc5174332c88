//! Terminal front-end for the chat session
//!
//! Blocking stdin reads run on the blocking thread pool so the runtime
//! stays free to dispatch inbound messages while the user types. Output
//! goes straight to stdout; logs go to stderr, so the chat transcript
//! stays clean.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use meshchat_core::{LineSource, MessageSink};

// ----------------------------------------------------------------------------
// Stdin Line Source
// ----------------------------------------------------------------------------

/// Reads chat input lines from stdin.
pub struct StdinLineSource;

#[async_trait]
impl LineSource for StdinLineSource {
    async fn read_line(&mut self, prompt: &str) -> Option<String> {
        let prompt = prompt.to_string();
        let line = tokio::task::spawn_blocking(move || {
            let mut stdout = io::stdout();
            if stdout
                .write_all(prompt.as_bytes())
                .and_then(|_| stdout.flush())
                .is_err()
            {
                return None;
            }
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) => None, // EOF
                Ok(_) => Some(line),
                Err(_) => None,
            }
        })
        .await
        .ok()??; // a cancelled read at shutdown also ends the input
        Some(line)
    }
}

// ----------------------------------------------------------------------------
// Stdout Sink
// ----------------------------------------------------------------------------

/// Prints inbound messages and prompts to stdout.
///
/// Messages open with a newline so they land on their own line even when
/// the user is mid-keystroke, then the prompt is redrawn.
pub struct StdoutSink;

impl MessageSink for StdoutSink {
    fn message(&mut self, line: &str) {
        println!("\n{line}");
    }

    fn prompt(&mut self, prompt: &str) {
        print!("{prompt}");
        let _ = io::stdout().flush();
    }
}
