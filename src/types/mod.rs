//! Core types for decoded sample data.

mod batch;
mod update_rate;

pub use batch::{SampleBatch, SampleIndex};
pub use update_rate::UpdateRate;
