//! Stream reassembly: recovering fixed-size frames from an arbitrarily
//! fragmented byte stream.
//!
//! The transport delivers bytes with no respect for frame boundaries: a
//! single read may carry half a frame, three frames, or line noise. The
//! [`FrameReassembler`] buffers unresolved bytes and extracts every
//! well-formed frame the moment it is complete, resynchronizing past
//! corruption without ever losing a valid frame that follows it.
//!
//! Boundary detection is header-first and window-length-fixed: only a window
//! that begins with the exact header sentinel and spans exactly
//! [`PACKET_SIZE`] bytes is ever checked against the footer. A footer
//! sentinel appearing by chance inside payload data therefore cannot create
//! a false frame boundary.

use tracing::{debug, trace};

use super::format::{
    self, ChannelReadings, FrameError, HEADER_BYTES, HEADER_SIZE, PACKET_SIZE,
};

/// Incremental frame extractor over a fragmented byte stream.
///
/// Feed bytes in any chunking; the decoded output is identical to feeding
/// the same bytes in one call. Internal buffering is bounded: every byte
/// eventually leaves the buffer, either consumed as part of a decoded frame,
/// discarded as pre-header noise, or dropped as a false-positive header byte.
#[derive(Debug, Default)]
pub struct FrameReassembler {
    /// Bytes received but not yet resolved into a frame. Consumed from the
    /// front; never retains more than one frame length plus a partial header.
    buf: Vec<u8>,

    /// Frames decoded over the reassembler's lifetime.
    frames_decoded: u64,

    /// Resynchronization events (false-positive headers dropped).
    resyncs: u64,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly received bytes and extract every frame now complete.
    ///
    /// Returns the decoded frames in stream order; the result is empty when
    /// the buffered residue plus `bytes` does not yet contain a full frame.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChannelReadings> {
        self.buf.extend_from_slice(bytes);
        let mut decoded = Vec::new();

        loop {
            let Some(header_at) = find_header(&self.buf) else {
                // No header anywhere: all but a possible split-header tail
                // is noise.
                if self.buf.len() > HEADER_SIZE - 1 {
                    let dropped = self.buf.len() - (HEADER_SIZE - 1);
                    trace!(dropped, "discarding pre-header noise");
                    self.buf.drain(..dropped);
                }
                break;
            };

            if self.buf.len() < header_at + PACKET_SIZE {
                // Partial frame: drop the noise prefix, wait for more bytes.
                if header_at > 0 {
                    self.buf.drain(..header_at);
                }
                break;
            }

            let window = &self.buf[header_at..header_at + PACKET_SIZE];
            match format::decode(window) {
                Ok(readings) => {
                    self.frames_decoded += 1;
                    trace!(total = self.frames_decoded, "frame decoded");
                    self.buf.drain(..header_at + PACKET_SIZE);
                    decoded.push(readings);
                }
                Err(FrameError::BadFooter { found }) => {
                    // The header was a false positive; advance one byte and
                    // keep scanning the remainder of the buffer.
                    self.resyncs += 1;
                    debug!(
                        found = format_args!("{found:#010x}"),
                        resyncs = self.resyncs,
                        "footer mismatch, resynchronizing"
                    );
                    self.buf.drain(..header_at + 1);
                }
                Err(err) => {
                    // Unreachable: the window starts with a matched header
                    // and is exactly PACKET_SIZE bytes long.
                    unreachable!("decode of header-aligned full window failed: {err}");
                }
            }
        }

        decoded
    }

    /// Number of bytes currently buffered awaiting resolution.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Frames decoded since construction.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// False-positive headers dropped since construction.
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }
}

/// Find the first occurrence of the header sentinel.
fn find_header(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_SIZE).position(|w| w == HEADER_BYTES)
}
