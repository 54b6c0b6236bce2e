//! On-wire packet layout and frame decoding.
//!
//! The sensor firmware emits fixed 88-byte frames with no length field and
//! no checksum; two sentinel words double as framing and a crude corruption
//! check:
//!
//! ```text
//! offset  size  field
//! 0       4     header sentinel, 0xFFFFFFFF little-endian
//! 4       80    payload: 40 x u16, little-endian, channel order 0..39
//! 84      4     footer sentinel, 0xDEADBEEF little-endian
//! ```
//!
//! [`decode`] is a pure function of its input window. It performs no buffer
//! mutation; resync policy on a failed decode belongs to the caller
//! ([`crate::wire::FrameReassembler`]).

use thiserror::Error;

/// Header sentinel value, serialized little-endian as the first 4 frame bytes.
pub const HEADER_SENTINEL: u32 = 0xFFFF_FFFF;

/// Footer sentinel value, serialized little-endian as the last 4 frame bytes.
pub const FOOTER_SENTINEL: u32 = 0xDEAD_BEEF;

/// Size in bytes of the header sentinel.
pub const HEADER_SIZE: usize = 4;

/// Size in bytes of the footer sentinel.
pub const FOOTER_SIZE: usize = 4;

/// Number of ADC channels carried per frame.
pub const CHANNEL_COUNT: usize = 40;

/// Payload size in bytes: one u16 per channel.
pub const PAYLOAD_SIZE: usize = CHANNEL_COUNT * 2;

/// Total frame size: header + payload + footer.
pub const PACKET_SIZE: usize = HEADER_SIZE + PAYLOAD_SIZE + FOOTER_SIZE;

/// Header sentinel as wire bytes.
pub const HEADER_BYTES: [u8; HEADER_SIZE] = HEADER_SENTINEL.to_le_bytes();

/// Footer sentinel as wire bytes.
pub const FOOTER_BYTES: [u8; FOOTER_SIZE] = FOOTER_SENTINEL.to_le_bytes();

/// One decoded frame's worth of channel readings, in channel order 0..39.
pub type ChannelReadings = [u16; CHANNEL_COUNT];

/// Reasons a candidate byte window is not a valid frame.
///
/// Never surfaced past the reassembler: a bad footer triggers a one-byte
/// resync, a bad header means the window was never a candidate at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame window is {len} bytes, expected {PACKET_SIZE}")]
    Truncated { len: usize },

    #[error("header sentinel mismatch: {found:#010x}")]
    BadHeader { found: u32 },

    #[error("footer sentinel mismatch: {found:#010x}")]
    BadFooter { found: u32 },
}

/// Decode one candidate frame window into channel readings.
///
/// Validates the window length and both sentinels byte-exact, then
/// interprets bytes 4..84 as 40 little-endian u16 values. Readings are
/// returned unscaled; calibration is not this layer's concern.
pub fn decode(window: &[u8]) -> Result<ChannelReadings, FrameError> {
    if window.len() != PACKET_SIZE {
        return Err(FrameError::Truncated { len: window.len() });
    }

    let header = u32::from_le_bytes([window[0], window[1], window[2], window[3]]);
    if header != HEADER_SENTINEL {
        return Err(FrameError::BadHeader { found: header });
    }

    let tail = PACKET_SIZE - FOOTER_SIZE;
    let footer =
        u32::from_le_bytes([window[tail], window[tail + 1], window[tail + 2], window[tail + 3]]);
    if footer != FOOTER_SENTINEL {
        return Err(FrameError::BadFooter { found: footer });
    }

    let payload = &window[HEADER_SIZE..PACKET_SIZE - FOOTER_SIZE];
    let mut readings = [0u16; CHANNEL_COUNT];
    for (ch, bytes) in payload.chunks_exact(2).enumerate() {
        readings[ch] = u16::from_le_bytes([bytes[0], bytes[1]]);
    }

    Ok(readings)
}

/// Build a well-formed frame from channel readings.
///
/// Used by the replay tooling and tests; the inverse of [`decode`].
pub fn encode(readings: &ChannelReadings) -> [u8; PACKET_SIZE] {
    let mut frame = [0u8; PACKET_SIZE];
    frame[..HEADER_SIZE].copy_from_slice(&HEADER_BYTES);
    for (ch, value) in readings.iter().enumerate() {
        let at = HEADER_SIZE + ch * 2;
        frame[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }
    frame[PACKET_SIZE - FOOTER_SIZE..].copy_from_slice(&FOOTER_BYTES);
    frame
}
