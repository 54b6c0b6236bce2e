//! Replay transport for captured byte dumps.
//!
//! Plays a raw capture of the sensor's serial output back through the
//! [`Transport`] trait in paced chunks, letting the whole pipeline run
//! without hardware attached. Chunk boundaries are deliberately unrelated
//! to frame boundaries; reassembly downstream must not care.

use std::path::Path;
use tokio::time::{Duration, Interval, interval};
use tracing::{debug, info};

use crate::transport::Transport;
use crate::wire::PACKET_SIZE;
use crate::{AcquisitionError, Result};

/// Default bytes delivered per simulated read.
const DEFAULT_CHUNK_SIZE: usize = 256;

/// Default pacing between simulated reads.
const DEFAULT_CHUNK_INTERVAL: Duration = Duration::from_millis(10);

/// Transport that replays a captured byte stream in paced chunks.
pub struct ReplayTransport {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    chunk_interval: Duration,
    // Created on first read; the tokio timer needs a running runtime,
    // which a plain constructor cannot assume.
    interval: Option<Interval>,
    frame_rate: f64,
    closed: bool,
}

impl ReplayTransport {
    /// Open a raw capture file for replay.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read(&path).await.map_err(|e| {
            AcquisitionError::transport_failed_with_source(
                format!("cannot read capture {}", path.as_ref().display()),
                Box::new(e),
            )
        })?;
        info!(bytes = data.len(), path = %path.as_ref().display(), "opened capture for replay");
        Ok(Self::from_bytes(data))
    }

    /// Replay an in-memory capture with default chunking and pacing.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::with_pacing(data, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_INTERVAL)
    }

    /// Replay with explicit chunk size and inter-chunk delay.
    pub fn with_pacing(data: Vec<u8>, chunk_size: usize, chunk_interval: Duration) -> Self {
        let chunk_size = chunk_size.max(1);
        // tokio::time::interval panics on a zero period.
        let chunk_interval = chunk_interval.max(Duration::from_micros(1));
        let bytes_per_sec = chunk_size as f64 / chunk_interval.as_secs_f64().max(f64::EPSILON);
        let frame_rate = bytes_per_sec / PACKET_SIZE as f64;
        Self {
            data,
            position: 0,
            chunk_size,
            chunk_interval,
            interval: None,
            frame_rate,
            closed: false,
        }
    }

    /// Bytes not yet delivered.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

#[async_trait::async_trait]
impl Transport for ReplayTransport {
    async fn read_available(&mut self) -> Result<Option<Vec<u8>>> {
        if self.closed || self.position >= self.data.len() {
            return Ok(None);
        }

        // Pace delivery against the configured chunk interval.
        self.interval
            .get_or_insert_with(|| interval(self.chunk_interval))
            .tick()
            .await;

        let end = (self.position + self.chunk_size).min(self.data.len());
        let chunk = self.data[self.position..end].to_vec();
        self.position = end;
        Ok(Some(chunk))
    }

    async fn close(&mut self) {
        if !self.closed {
            debug!(replayed = self.position, "replay transport closed");
            self.closed = true;
        }
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}
