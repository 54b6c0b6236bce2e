//! Decoded sample batch types for the stream-based architecture.

use std::sync::Arc;

use crate::wire::ChannelReadings;

/// Identifier of one decoded frame's worth of samples.
///
/// Strictly increasing from 0, incremented exactly once per successfully
/// decoded frame, shared by all 40 channels of that frame. Never reissued
/// and never skipped: frames that pass footer validation are never dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleIndex(pub u64);

impl SampleIndex {
    /// The index the next ingested frame will receive after this one.
    pub fn next(self) -> Self {
        SampleIndex(self.0 + 1)
    }
}

impl std::fmt::Display for SampleIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One decoded frame as published to live consumers.
///
/// This is the fundamental data unit that flows out of the acquisition loop.
/// Shared by `Arc` so the watch channel and any number of subscribers read
/// the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBatch {
    /// Ledger-assigned index of this frame.
    pub index: SampleIndex,

    /// Channel readings in channel order 0..39, unscaled.
    pub channels: ChannelReadings,
}

impl SampleBatch {
    pub fn new(index: SampleIndex, channels: ChannelReadings) -> Arc<Self> {
        Arc::new(Self { index, channels })
    }
}
