//! Stream utilities for sample consumers.

mod throttle;

pub use throttle::{LatestEvery, SampleStreamExt};
