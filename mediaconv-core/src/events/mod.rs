use std::sync::Arc;

use crate::jobs::Outcome;

pub mod json_handler;

#[derive(Debug, Clone)]
pub enum Event {
    // Lifecycle events
    JobStarted {
        args: Vec<String>,
    },

    JobFinished {
        outcome: Outcome,
    },

    // Streamed tool output, one event per raw stdout chunk
    ProgressChunk {
        chunk: String,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
