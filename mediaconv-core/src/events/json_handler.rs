//! JSON progress handler for structured progress output
//!
//! This module provides a JSON-based event handler that emits one JSON line
//! per job event, for consumption by wrapping tools and log collectors.

use super::{Event, EventHandler};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs job events as structured JSON lines
pub struct JsonProgressHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonProgressHandler {
    /// Create a new JSON progress handler that writes to stdout
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a new JSON progress handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    /// Get current timestamp as seconds since Unix epoch
    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Write a JSON event to the output
    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }
}

impl EventHandler for JsonProgressHandler {
    fn handle(&self, event: &Event) {
        let timestamp = Self::get_timestamp();

        match event {
            Event::JobStarted { args } => {
                let started = json!({
                    "type": "job_started",
                    "args": args,
                    "timestamp": timestamp
                });
                self.write_json(started);
            }

            Event::ProgressChunk { chunk } => {
                let progress = json!({
                    "type": "progress_chunk",
                    "chunk": chunk,
                    "timestamp": timestamp
                });
                self.write_json(progress);
            }

            Event::JobFinished { outcome } => {
                let finished = json!({
                    "type": "job_finished",
                    "outcome": outcome,
                    "timestamp": timestamp
                });
                self.write_json(finished);
            }
        }
    }
}

impl Default for JsonProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
