//! Thread-safe bookkeeping for decoded samples, markers, and recordings.
//!
//! The [`SampleLedger`] is the only state shared between the acquisition
//! loop and its consumers (render tick, marker insertion, export). Every
//! operation takes the internal lock exactly once, holds it for a bounded
//! critical section, and never across an await point; nested acquisition
//! does not occur. Consumers always observe a full, consistent snapshot,
//! never a torn append.
//!
//! ## Marker timing
//!
//! A marker is associated with the index the *next* ingested frame will use.
//! When a marker request races an in-flight ingest, the marker lands either
//! on the index ingestion is concurrently claiming or on the one after it.
//! This ambiguity is bounded to a window of exactly one sample and is part
//! of the API contract; see [`SampleLedger::add_marker`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::{AcquisitionError, Result};
use crate::types::SampleIndex;
use crate::wire::{CHANNEL_COUNT, ChannelReadings};

/// Per-channel rolling history capacity for live display.
pub const HISTORY_CAPACITY: usize = 100;

/// Number of trailing readings handed to the render sink per channel.
pub const RENDER_WINDOW: usize = 50;

/// One recorded snapshot: a frame's index, its channel values, and the
/// marker label resolved at ingest time (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub index: SampleIndex,
    pub channels: ChannelReadings,
    pub marker: Option<String>,
}

/// Read-only view of recent channel history for the render sink.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    /// Up to [`RENDER_WINDOW`] trailing readings per channel, oldest first.
    pub channels: Vec<Vec<u16>>,
}

#[derive(Debug)]
struct LedgerState {
    /// Index the next ingested frame will receive.
    next_index: u64,

    /// Bounded rolling history per channel, FIFO eviction at capacity.
    histories: Vec<VecDeque<u16>>,

    /// Sparse index -> label map for user-inserted event markers.
    markers: HashMap<SampleIndex, String>,

    /// Append-only while armed; cleared when a recording (re)starts.
    recording: Vec<SampleRecord>,

    /// Whether ingested frames are currently appended to the recording.
    armed: bool,
}

/// Shared sample store: monotonic index counter, rolling per-channel
/// histories, marker map, and the optional recording log.
#[derive(Debug)]
pub struct SampleLedger {
    inner: Mutex<LedgerState>,
}

impl Default for SampleLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerState {
                next_index: 0,
                histories: (0..CHANNEL_COUNT).map(|_| VecDeque::new()).collect(),
                markers: HashMap::new(),
                recording: Vec::new(),
                armed: false,
            }),
        }
    }

    /// Take the state lock, absorbing poisoning so a panicked consumer
    /// cannot take the acquisition loop down with it.
    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The index the next ingested frame will receive.
    ///
    /// Callable independently of ingestion, for marker association timing.
    pub fn next_index(&self) -> SampleIndex {
        SampleIndex(self.state().next_index)
    }

    /// Ingest one decoded frame; returns the index it was assigned.
    ///
    /// Resolves any marker already assigned to the claimed index, appends a
    /// snapshot to the recording log iff armed, pushes each channel value
    /// into its rolling history (FIFO eviction at [`HISTORY_CAPACITY`]), and
    /// increments the counter. One critical section; frames that reach this
    /// point are never dropped, so issued indices have no gaps.
    pub fn ingest(&self, channels: ChannelReadings) -> SampleIndex {
        let mut state = self.state();
        let index = SampleIndex(state.next_index);

        if state.armed {
            let marker = state.markers.get(&index).cloned();
            state.recording.push(SampleRecord { index, channels, marker });
        }

        for (history, &value) in state.histories.iter_mut().zip(channels.iter()) {
            if history.len() == HISTORY_CAPACITY {
                history.pop_front();
            }
            history.push_back(value);
        }

        state.next_index += 1;
        index
    }

    /// Associate `label` with the index the next ingested frame will use.
    ///
    /// Returns the index used. If an ingest is interleaving at the same
    /// instant, the marker may land on the frame being ingested or on the
    /// one after it; the ambiguity is bounded to one sample and is not
    /// resolved here. A second marker for the same index replaces the first.
    pub fn add_marker(&self, label: impl Into<String>) -> SampleIndex {
        let mut state = self.state();
        let index = SampleIndex(state.next_index);
        let label = label.into();
        info!(%index, label = %label, "marker added");
        state.markers.insert(index, label);
        index
    }

    /// Marker label recorded for `index`, if any.
    pub fn marker_at(&self, index: SampleIndex) -> Option<String> {
        self.state().markers.get(&index).cloned()
    }

    /// Full, consistent copy of each channel's trailing readings for the
    /// render sink. Never observes a partially applied ingest.
    pub fn snapshot_for_render(&self) -> RenderSnapshot {
        let state = self.state();
        let channels = state
            .histories
            .iter()
            .map(|history| {
                let skip = history.len().saturating_sub(RENDER_WINDOW);
                history.iter().skip(skip).copied().collect()
            })
            .collect();
        RenderSnapshot { channels }
    }

    /// Arm recording, discarding any previously recorded snapshots.
    ///
    /// Clears the log even when already armed: a restart always begins from
    /// an empty recording.
    pub fn start_recording(&self) {
        let mut state = self.state();
        debug!(discarded = state.recording.len(), "recording started");
        state.recording.clear();
        state.armed = true;
    }

    /// Disarm recording; returns whether it was armed.
    ///
    /// The recorded log is retained until exported or until a new recording
    /// starts.
    pub fn stop_recording(&self) -> bool {
        let mut state = self.state();
        let was_armed = state.armed;
        state.armed = false;
        if was_armed {
            debug!(recorded = state.recording.len(), "recording stopped");
        }
        was_armed
    }

    /// Whether ingested frames are currently being recorded.
    pub fn is_recording(&self) -> bool {
        self.state().armed
    }

    /// Ordered copy of the recorded snapshots for the export collaborator.
    ///
    /// Fails with [`AcquisitionError::EmptyRecording`] when nothing has been
    /// recorded; the log itself is left untouched either way.
    pub fn export_snapshot(&self) -> Result<Vec<SampleRecord>> {
        let state = self.state();
        if state.recording.is_empty() {
            return Err(AcquisitionError::EmptyRecording);
        }
        Ok(state.recording.clone())
    }
}
