//! Transport trait for byte-stream sources.

use crate::Result;

/// Trait for raw byte sources feeding the acquisition loop.
///
/// Transports abstract over the physical link (a serial port, a socket, a
/// captured byte dump) and handle their own timing internally: a serial
/// implementation waits on its read timeout, a replay implementation paces
/// itself against the original capture rate. The acquisition loop never
/// sleeps on a transport's behalf.
#[async_trait::async_trait]
pub trait Transport: Send + 'static {
    /// Read whatever bytes are currently available.
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - zero or more newly received bytes (an empty
    ///   chunk is permitted and means "nothing yet, try again")
    /// - `Ok(None)` - source ended (normal termination, replay exhausted)
    /// - `Err(e)` - read failure; fatal to the acquisition loop
    ///
    /// The call must be bounded by the transport's own read timeout; it
    /// never blocks indefinitely.
    async fn read_available(&mut self) -> Result<Option<Vec<u8>>>;

    /// Release the underlying resource.
    ///
    /// Called by the acquisition loop on every exit path, including failure
    /// exits. Implementations should be idempotent.
    async fn close(&mut self);

    /// Nominal frame rate of the source in Hz, used to normalize subscriber
    /// update rates.
    fn frame_rate(&self) -> f64;
}
