//! Test utilities: scripted transports and frame builders.

#![cfg(test)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::transport::Transport;
use crate::wire::format::{CHANNEL_COUNT, PACKET_SIZE, encode};
use crate::{AcquisitionError, Result};

/// A well-formed frame with every channel set to `value`.
pub fn frame_bytes(value: u16) -> [u8; PACKET_SIZE] {
    encode(&[value; CHANNEL_COUNT])
}

/// One step in a scripted transport's playback.
pub enum ScriptStep {
    /// Deliver these bytes on the next read.
    Chunk(Vec<u8>),
    /// Fail the next read with a transport error.
    Fail(String),
}

/// Transport that plays back a fixed script, for exercising the
/// acquisition loop without hardware.
///
/// Reads return the scripted steps in order, then `Ok(None)` (end of
/// stream) unless constructed with [`ScriptedTransport::endless`], in which
/// case drained scripts idle forever delivering empty chunks.
pub struct ScriptedTransport {
    script: VecDeque<ScriptStep>,
    endless: bool,
    closed: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { script: steps.into(), endless: false, closed: Arc::new(AtomicBool::new(false)) }
    }

    /// A transport that never delivers data and never ends; only
    /// cancellation or close stops it.
    pub fn endless() -> Self {
        Self { script: VecDeque::new(), endless: true, closed: Arc::new(AtomicBool::new(false)) }
    }

    /// Flag set once `close` has been called, for asserting release on
    /// every exit path.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn read_available(&mut self) -> Result<Option<Vec<u8>>> {
        match self.script.pop_front() {
            Some(ScriptStep::Chunk(bytes)) => Ok(Some(bytes)),
            Some(ScriptStep::Fail(reason)) => Err(AcquisitionError::transport_failed(reason)),
            None if self.endless => {
                // Bounded wait standing in for a serial read timeout.
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                Ok(Some(Vec::new()))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn frame_rate(&self) -> f64 {
        1000.0
    }
}
