//! Framed serial acquisition of multichannel ADC telemetry.
//!
//! Adclink recovers fixed 88-byte sensor frames from an arbitrarily
//! fragmented byte stream, decodes each into 40 channel readings, and keeps
//! the resulting sample stream available to concurrent consumers - live
//! plotting, event markers, and CSV recording - with correct temporal
//! alignment between samples and markers.
//!
//! # Architecture
//!
//! - **Wire layer** ([`wire`]): sentinel-delimited packet layout, the pure
//!   frame decoder, and the [`FrameReassembler`] that buffers and
//!   resynchronizes over a noisy stream.
//! - **Ledger** ([`ledger`]): the one piece of shared state - monotonic
//!   sample indices, rolling per-channel histories, the marker map, and the
//!   recording log - behind a single exclusion discipline.
//! - **Acquisition** ([`acquisition`]): a cancellable tokio task that owns
//!   the [`Transport`] and drives bytes through reassembly into the ledger.
//! - **Export** ([`export`]): CSV rendering of a recording, with channel
//!   names from a configured [`ChannelLabels`] table.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use adclink::{Adclink, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> adclink::Result<()> {
//!     // Replay a captured byte dump through the full pipeline.
//!     let handle = Adclink::replay("capture.bin").await?;
//!     let ledger = handle.ledger();
//!
//!     let mut batches = handle.subscribe(UpdateRate::Max(10));
//!     ledger.start_recording();
//!     while let Some(batch) = batches.next().await {
//!         println!("frame {}: ch0 = {}", batch.index, batch.channels[0]);
//!     }
//!
//!     adclink::export::export_recording(&ledger, &Default::default(), "run.csv")?;
//!     handle.stop().await
//! }
//! ```

pub mod acquisition;
pub mod config;
mod error;
pub mod export;
pub mod ledger;
pub mod stream;
#[cfg(test)]
mod test_utils;
pub mod transport;
pub mod transports;
pub mod types;
pub mod wire;

pub use acquisition::{Acquisition, AcquisitionHandle};
pub use config::ChannelLabels;
pub use error::{AcquisitionError, Result};
pub use ledger::{RenderSnapshot, SampleLedger, SampleRecord};
pub use transport::Transport;
pub use transports::ReplayTransport;
pub use types::{SampleBatch, SampleIndex, UpdateRate};
pub use wire::{CHANNEL_COUNT, FrameReassembler, PACKET_SIZE};

/// Unified entry point for acquisition sessions.
///
/// Thin factory over [`Acquisition::spawn`] for the common cases: a custom
/// transport, or replaying a captured byte dump.
pub struct Adclink;

impl Adclink {
    /// Start acquiring from any [`Transport`] implementation.
    ///
    /// ```rust,no_run
    /// use adclink::{Adclink, ReplayTransport};
    ///
    /// # async fn run() -> adclink::Result<()> {
    /// let transport = ReplayTransport::from_bytes(vec![]);
    /// let handle = Adclink::attach(transport);
    /// handle.stop().await
    /// # }
    /// ```
    pub fn attach<T: Transport>(transport: T) -> AcquisitionHandle {
        Acquisition::spawn(transport)
    }

    /// Replay a captured raw byte dump through the full pipeline.
    pub async fn replay<P: AsRef<std::path::Path>>(path: P) -> Result<AcquisitionHandle> {
        let transport = ReplayTransport::open(path).await?;
        Ok(Acquisition::spawn(transport))
    }
}
