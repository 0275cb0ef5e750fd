//! Streaming frame decoder.
//!
//! [`FrameDecoder`] is fed one raw wire byte at a time. It strips escape
//! sequences, accumulates payload + trailer in a fixed buffer, and validates
//! the trailer each time a boundary octet closes a frame. Anything that does
//! not validate (checksum mismatch, oversized run, escape immediately before
//! a boundary) is dropped without surfacing an error; the next boundary
//! octet starts a fresh frame.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::crc;
use crate::error::{FrameError, Result};
use crate::frame::{
    Frame, FrameConfig, CONTROL_ESCAPE, DEFAULT_MAX_FRAME_LENGTH, ESCAPE_XOR, FRAME_BOUNDARY,
    MIN_FRAME_CAPACITY, TRAILER_SIZE,
};

/// Receiver of validated frames.
///
/// `raw` is the accumulated payload followed by the two trailer bytes, so
/// `raw.len()` is the raw frame length. Consumers wanting the application
/// payload must drop the last two bytes (or use [`Frame::payload`]).
pub trait FrameHandler {
    fn on_frame(&mut self, raw: &[u8]);
}

impl<F> FrameHandler for F
where
    F: FnMut(&[u8]),
{
    fn on_frame(&mut self, raw: &[u8]) {
        self(raw)
    }
}

/// Counters describing what the decoder saw on the link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames that passed the checksum and were delivered.
    pub frames: u64,
    /// Frames dropped because the trailer did not match.
    pub crc_errors: u64,
    /// Runs dropped because they did not fit in the buffer.
    pub overflows: u64,
    /// Frames dropped because an escape octet directly preceded a boundary.
    pub aborted_escapes: u64,
    /// Boundaries closing a single buffered byte (too short for a trailer).
    pub runts: u64,
}

impl DecoderStats {
    /// Total number of frames dropped for any reason.
    pub fn dropped(&self) -> u64 {
        self.crc_errors + self.overflows + self.aborted_escapes + self.runts
    }
}

/// Per-link receive state machine.
///
/// The buffer is allocated once with the configured capacity and never
/// grows. One decoder belongs to exactly one link; callers driving a link
/// from several threads must serialize calls to [`feed`](Self::feed).
pub struct FrameDecoder {
    buf: Box<[u8]>,
    pos: usize,
    escape_pending: bool,
    discarding: bool,
    running_fcs: u16,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder whose buffer holds `capacity` bytes (payload + trailer).
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < MIN_FRAME_CAPACITY {
            debug!(capacity, "rejecting decoder capacity");
            return Err(FrameError::InvalidCapacity {
                capacity,
                min: MIN_FRAME_CAPACITY,
            });
        }
        Ok(Self::with_capacity_unchecked(capacity))
    }

    /// Create a decoder sized by `config.max_frame_length`.
    pub fn with_config(config: &FrameConfig) -> Result<Self> {
        Self::new(config.max_frame_length)
    }

    fn with_capacity_unchecked(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            escape_pending: false,
            discarding: false,
            running_fcs: crc::INIT,
            stats: DecoderStats::default(),
        }
    }

    /// Process one received byte.
    ///
    /// Returns the frame closed by this byte if it validated. At most one
    /// frame is produced per call.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        self.accept(byte)
            .map(|len| Frame::from_raw(Bytes::copy_from_slice(&self.buf[..len])))
    }

    /// Process one received byte, handing a validated frame to `handler`
    /// synchronously. Returns true if the handler was invoked.
    pub fn feed_with<H: FrameHandler + ?Sized>(&mut self, byte: u8, handler: &mut H) -> bool {
        match self.accept(byte) {
            Some(len) => {
                handler.on_frame(&self.buf[..len]);
                true
            }
            None => false,
        }
    }

    /// Feed every byte of `bytes`, returning how many frames were delivered.
    pub fn feed_slice<H: FrameHandler + ?Sized>(&mut self, bytes: &[u8], handler: &mut H) -> usize {
        bytes
            .iter()
            .filter(|&&byte| self.feed_with(byte, handler))
            .count()
    }

    /// Feed every byte of `bytes` and collect the frames produced.
    pub fn decode_all(&mut self, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&byte| self.feed(byte)).collect()
    }

    /// Drop any partial frame and return to the initial state.
    ///
    /// Statistics are kept.
    pub fn reset(&mut self) {
        self.escape_pending = false;
        self.restart();
    }

    /// Buffer capacity in bytes (payload + trailer).
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes accumulated for the frame in progress.
    pub fn buffered(&self) -> usize {
        self.pos
    }

    /// True between an escape octet and the byte it modifies.
    pub fn is_escape_pending(&self) -> bool {
        self.escape_pending
    }

    /// Running checksum over the buffered bytes, lagging two positions
    /// behind so the unknown trailer is excluded.
    ///
    /// Bookkeeping only: trailer validation always recomputes the checksum
    /// over the whole payload.
    pub fn running_fcs(&self) -> u16 {
        self.running_fcs
    }

    /// Link statistics since construction.
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Core state machine. Returns the raw length of a validated frame left
    /// in `buf[..len]`.
    fn accept(&mut self, byte: u8) -> Option<usize> {
        if byte == FRAME_BOUNDARY {
            let completed = self.close_frame();
            self.restart();
            return completed;
        }

        if self.discarding {
            return None;
        }

        let byte = if self.escape_pending {
            self.escape_pending = false;
            byte ^ ESCAPE_XOR
        } else if byte == CONTROL_ESCAPE {
            self.escape_pending = true;
            return None;
        } else {
            byte
        };

        if self.pos == self.buf.len() {
            self.stats.overflows += 1;
            debug!(
                capacity = self.buf.len(),
                "frame exceeds buffer capacity, discarding until next boundary"
            );
            self.restart();
            self.discarding = true;
            return None;
        }

        self.buf[self.pos] = byte;
        if self.pos >= TRAILER_SIZE {
            self.running_fcs = crc::update(self.running_fcs, self.buf[self.pos - TRAILER_SIZE]);
        }
        self.pos += 1;
        None
    }

    fn close_frame(&mut self) -> Option<usize> {
        if self.escape_pending {
            self.escape_pending = false;
            self.stats.aborted_escapes += 1;
            debug!(buffered = self.pos, "escape before boundary, dropping frame");
            return None;
        }
        if self.discarding {
            return None;
        }

        let len = self.pos;
        match len {
            0 => None,
            1 => {
                self.stats.runts += 1;
                trace!("single byte between boundaries, ignoring");
                None
            }
            _ => {
                let payload_len = len - TRAILER_SIZE;
                let computed = crc::compute(&self.buf[..payload_len]);
                let received = u16::from(self.buf[len - 1]) | (u16::from(self.buf[len - 2]) << 8);
                if computed == received {
                    self.stats.frames += 1;
                    trace!(raw_len = len, payload_len, "frame accepted");
                    Some(len)
                } else {
                    self.stats.crc_errors += 1;
                    debug!(
                        raw_len = len,
                        computed = format_args!("{computed:#06x}"),
                        received = format_args!("{received:#06x}"),
                        "checksum mismatch, dropping frame"
                    );
                    None
                }
            }
        }
    }

    fn restart(&mut self) {
        self.pos = 0;
        self.running_fcs = crc::INIT;
        self.discarding = false;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::with_capacity_unchecked(DEFAULT_MAX_FRAME_LENGTH)
    }
}

impl fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("capacity", &self.buf.len())
            .field("buffered", &self.pos)
            .field("escape_pending", &self.escape_pending)
            .field("discarding", &self.discarding)
            .field("stats", &self.stats)
            .finish()
    }
}
