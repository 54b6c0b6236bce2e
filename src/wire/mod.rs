//! Wire-level frame handling: packet layout, decoding, and stream reassembly.

pub mod format;
mod reassembler;

pub use format::{
    CHANNEL_COUNT, ChannelReadings, FOOTER_SENTINEL, FrameError, HEADER_SENTINEL, PACKET_SIZE,
};
pub use reassembler::FrameReassembler;
