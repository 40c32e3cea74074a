//! Lifecycle notifications published after the registry persists a change.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RegistryError;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

pub const FEED_SAVED: &str = "FeedSaved";
pub const FEED_ENABLED: &str = "FeedEnabled";
pub const FEED_DISABLED: &str = "FeedDisabled";
pub const FEEDS_RETAGGED: &str = "FeedsRetagged";

/// Payload of a [`FEEDS_RETAGGED`] event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedsRetagged {
    pub old_template_id: String,
    pub new_template_id: String,
    pub feed_ids: Vec<String>,
}

/// Receives registry events. Payloads are JSON.
pub trait FeedEventPublisher: Send {
    fn publish(&mut self, event_type: &str, payload: &[u8]) -> Result<(), RegistryError>;
}

/// A simple publisher that logs events through tracing or into a buffer.
#[derive(Default)]
pub struct LogPublisher {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl LogPublisher {
    pub fn new() -> Self {
        LogPublisher { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogPublisher {
            buffer: Some(buffer),
        }
    }
}

impl FeedEventPublisher for LogPublisher {
    fn publish(&mut self, event_type: &str, payload: &[u8]) -> Result<(), RegistryError> {
        let payload_str = String::from_utf8_lossy(payload);
        match &self.buffer {
            Some(buffer) => {
                let mut buffer = buffer
                    .lock()
                    .map_err(|_| RegistryError::Publish("log buffer poisoned".into()))?;
                buffer.push(format!("[FEED] {} {}", event_type, payload_str));
            }
            None => info!(event_type, payload = %payload_str, "feed event"),
        }
        Ok(())
    }
}

/// A publisher that emits events via an EventEmitter for in-process subscribers.
#[cfg(feature = "emitter")]
pub struct LocalEmitterPublisher {
    emitter: EventEmitter,
}

#[cfg(feature = "emitter")]
impl LocalEmitterPublisher {
    pub fn new(emitter: EventEmitter) -> Self {
        LocalEmitterPublisher { emitter }
    }
}

#[cfg(feature = "emitter")]
impl FeedEventPublisher for LocalEmitterPublisher {
    fn publish(&mut self, event_type: &str, payload: &[u8]) -> Result<(), RegistryError> {
        let payload_str = String::from_utf8_lossy(payload).into_owned();
        self.emitter.emit(event_type, payload_str);
        Ok(())
    }
}
