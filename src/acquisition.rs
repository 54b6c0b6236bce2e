//! Acquisition loop: drives a transport through the reassembler into the
//! ledger.
//!
//! [`Acquisition::spawn`] starts one tokio task that owns the transport and
//! a [`FrameReassembler`]. Every decoded frame is ingested into the shared
//! [`SampleLedger`] and published on a watch channel for live subscribers.
//! Framing errors are absorbed by the reassembler and never terminate the
//! loop; a transport read failure is fatal, logged, retained, and surfaced
//! when the handle is stopped. The transport is closed on every exit path.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::ledger::SampleLedger;
use crate::stream::SampleStreamExt;
use crate::transport::Transport;
use crate::types::{SampleBatch, UpdateRate};
use crate::wire::FrameReassembler;
use crate::{AcquisitionError, Result};

/// Spawns and manages the acquisition task.
pub struct Acquisition;

impl Acquisition {
    /// Start acquiring from `transport` on the current tokio runtime.
    ///
    /// The returned handle is the owner of the background task: dropping it
    /// cancels acquisition, [`AcquisitionHandle::stop`] cancels and joins.
    pub fn spawn<T: Transport>(transport: T) -> AcquisitionHandle {
        let ledger = Arc::new(SampleLedger::new());
        let (batch_tx, batch_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let source_hz = transport.frame_rate();

        let task_cancel = cancel.clone();
        let task_ledger = Arc::clone(&ledger);
        let task = tokio::spawn(async move {
            reader_task(transport, task_ledger, batch_tx, task_cancel).await
        });

        AcquisitionHandle { ledger, batches: batch_rx, cancel, task: Some(task), source_hz }
    }
}

/// Handle to a running acquisition loop.
///
/// Grants access to the shared ledger and live batch subscriptions, and
/// owns the stop/join contract for the background task.
pub struct AcquisitionHandle {
    ledger: Arc<SampleLedger>,
    batches: watch::Receiver<Option<Arc<SampleBatch>>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<()>>>,
    source_hz: f64,
}

impl AcquisitionHandle {
    /// The ledger this loop ingests into.
    pub fn ledger(&self) -> Arc<SampleLedger> {
        Arc::clone(&self.ledger)
    }

    /// Nominal source frame rate in Hz.
    pub fn source_hz(&self) -> f64 {
        self.source_hz
    }

    /// Whether the acquisition task has finished (ended, failed, or been
    /// stopped).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Subscribe to decoded batches as a stream.
    ///
    /// The stream stays pending while waiting for the first frame, yields
    /// batches in index order, and ends when the acquisition loop ends.
    /// `UpdateRate::Max` applies latest-wins throttling, so slow consumers
    /// observe the freshest batch rather than a backlog.
    pub fn subscribe(&self, rate: UpdateRate) -> impl Stream<Item = Arc<SampleBatch>> + 'static {
        // The watch channel starts at None and is reset to None when the
        // loop ends. Skip the leading Nones (no frame yet); after the first
        // batch, a None means the loop has terminated.
        let batches = WatchStream::new(self.batches.clone())
            .skip_while(|opt| {
                let waiting = opt.is_none();
                async move { waiting }
            })
            .take_while(|opt| {
                let live = opt.is_some();
                async move { live }
            })
            .filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.source_hz) {
            None => batches.boxed(),
            Some(period) => batches.latest_every(period).boxed(),
        }
    }

    /// Stop acquisition and wait for the task to finish.
    ///
    /// Returns `Ok(())` after a cooperative stop or a normal end of stream,
    /// or the transport error that terminated the loop.
    pub async fn stop(mut self) -> Result<()> {
        self.cancel.cancel();
        match self.task.take() {
            Some(task) => task.await.unwrap_or_else(|join_err| {
                Err(AcquisitionError::transport_failed_with_source(
                    "acquisition task panicked",
                    Box::new(join_err),
                ))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for AcquisitionHandle {
    fn drop(&mut self) {
        debug!("dropping acquisition handle");
        self.cancel.cancel();
    }
}

/// The acquisition loop body. Owns the transport for its whole lifetime and
/// closes it on every exit path.
async fn reader_task<T: Transport>(
    mut transport: T,
    ledger: Arc<SampleLedger>,
    batch_tx: watch::Sender<Option<Arc<SampleBatch>>>,
    cancel: CancellationToken,
) -> Result<()> {
    info!("acquisition loop started");
    let mut reassembler = FrameReassembler::new();

    let result = loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => {
                info!("acquisition cancelled");
                break Ok(());
            }
            read = transport.read_available() => read,
        };

        match read {
            Ok(Some(bytes)) => {
                for channels in reassembler.feed(&bytes) {
                    let index = ledger.ingest(channels);
                    // Send failure means every receiver is gone; the handle
                    // cancels on drop, so the next select exits the loop.
                    let _ = batch_tx.send(Some(SampleBatch::new(index, channels)));
                }
            }
            Ok(None) => {
                info!(frames = reassembler.frames_decoded(), "transport ended");
                break Ok(());
            }
            Err(e) => {
                error!(error = %e, "transport read failed, terminating acquisition");
                break Err(e);
            }
        }
    };

    // The watch channel keeps only the latest value; yield once so live
    // subscribers can observe the final batch before the end-of-stream
    // marker overwrites it.
    tokio::task::yield_now().await;
    let _ = batch_tx.send(None);
    transport.close().await;

    info!(
        frames = reassembler.frames_decoded(),
        resyncs = reassembler.resyncs(),
        "acquisition loop ended"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptStep, ScriptedTransport, frame_bytes};
    use crate::types::SampleIndex;
    use crate::wire::CHANNEL_COUNT;

    /// Let the acquisition task drain its transport before joining, so
    /// cancellation does not race the scripted reads.
    async fn wait_until_finished(handle: &AcquisitionHandle) {
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn decodes_across_chunk_boundaries() {
        let first = frame_bytes(10);
        let second = frame_bytes(11);

        // Split mid-frame to force the reassembler to buffer residue.
        let mut stream = first.to_vec();
        stream.extend_from_slice(&second);
        let transport = ScriptedTransport::new(vec![
            ScriptStep::Chunk(stream[..30].to_vec()),
            ScriptStep::Chunk(stream[30..100].to_vec()),
            ScriptStep::Chunk(stream[100..].to_vec()),
        ]);
        let closed = transport.closed_flag();

        let handle = Acquisition::spawn(transport);
        let ledger = handle.ledger();
        wait_until_finished(&handle).await;
        handle.stop().await.expect("clean shutdown");

        assert_eq!(ledger.next_index(), SampleIndex(2));
        let snapshot = ledger.snapshot_for_render();
        assert_eq!(snapshot.channels[0], vec![10, 11]);
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn framing_corruption_does_not_terminate_loop() {
        let mut corrupt = frame_bytes(1).to_vec();
        let len = corrupt.len();
        corrupt[len - 1] ^= 0xFF; // break the footer
        let transport = ScriptedTransport::new(vec![
            ScriptStep::Chunk(corrupt),
            ScriptStep::Chunk(frame_bytes(2).to_vec()),
        ]);

        let handle = Acquisition::spawn(transport);
        let ledger = handle.ledger();
        wait_until_finished(&handle).await;
        handle.stop().await.expect("framing errors are recoverable");

        // Only the valid frame was ingested, at index 0 (no gaps, no drops).
        assert_eq!(ledger.next_index(), SampleIndex(1));
        assert_eq!(ledger.snapshot_for_render().channels[5], vec![2]);
    }

    #[tokio::test]
    async fn transport_error_is_fatal_and_surfaced() {
        let transport = ScriptedTransport::new(vec![
            ScriptStep::Chunk(frame_bytes(3).to_vec()),
            ScriptStep::Fail("device unplugged".into()),
        ]);
        let closed = transport.closed_flag();

        let handle = Acquisition::spawn(transport);
        let ledger = handle.ledger();
        wait_until_finished(&handle).await;
        let err = handle.stop().await.expect_err("transport failure is fatal");

        assert!(matches!(err, AcquisitionError::Transport { .. }));
        assert!(err.to_string().contains("device unplugged"));
        // The frame before the failure was still ingested, and the
        // transport was released on the failure path.
        assert_eq!(ledger.next_index(), SampleIndex(1));
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cooperative_stop_halts_an_idle_transport() {
        let transport = ScriptedTransport::endless();
        let closed = transport.closed_flag();

        let handle = Acquisition::spawn(transport);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        handle.stop().await.expect("cancellation is a clean exit");

        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn subscribe_yields_batches_in_index_order() {
        let transport = ScriptedTransport::new(vec![
            ScriptStep::Chunk(frame_bytes(7).to_vec()),
            ScriptStep::Chunk(frame_bytes(8).to_vec()),
        ]);

        let handle = Acquisition::spawn(transport);
        let mut stream = handle.subscribe(UpdateRate::Native);

        let mut last = None;
        while let Some(batch) = stream.next().await {
            if let Some(prev) = last {
                assert!(batch.index > prev);
            }
            assert_eq!(batch.channels.len(), CHANNEL_COUNT);
            last = Some(batch.index);
        }
        // Watch semantics may coalesce bursts, but the final batch is
        // always observed.
        assert_eq!(last, Some(SampleIndex(1)));

        handle.stop().await.expect("clean shutdown");
    }
}
