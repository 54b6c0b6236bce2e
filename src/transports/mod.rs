//! Transport implementations.

pub mod replay;

pub use replay::ReplayTransport;
