use bytes::Bytes;

/// Boundary octet marking the start and end of every frame (`01111110`).
pub const FRAME_BOUNDARY: u8 = 0x7E;

/// Control escape octet (`01111101`). The byte that follows it on the wire
/// has bit 5 inverted.
pub const CONTROL_ESCAPE: u8 = 0x7D;

/// Mask applied to an escaped byte.
pub const ESCAPE_XOR: u8 = 0x20;

/// Size of the frame check sequence that trails every payload.
pub const TRAILER_SIZE: usize = 2;

/// Default decoder buffer capacity (payload + trailer).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 128;

/// Smallest usable decoder capacity: room for the trailer of an empty frame.
pub const MIN_FRAME_CAPACITY: usize = TRAILER_SIZE;

/// Returns true if `byte` must be escaped on the wire.
#[inline]
pub fn is_reserved(byte: u8) -> bool {
    byte == FRAME_BOUNDARY || byte == CONTROL_ESCAPE
}

/// A validated frame as accumulated by the decoder.
///
/// The decoder hands over everything it buffered between two boundary
/// octets: the payload followed by the two trailer bytes. Use
/// [`payload`](Self::payload) / [`payload_len`](Self::payload_len) for the
/// application data and [`raw`](Self::raw) / [`raw_len`](Self::raw_len) for
/// the full accumulated buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    raw: Bytes,
}

impl Frame {
    /// Wrap an accumulated payload + trailer buffer.
    pub(crate) fn from_raw(raw: Bytes) -> Self {
        debug_assert!(raw.len() >= TRAILER_SIZE);
        Self { raw }
    }

    /// Payload followed by the trailer, exactly as accumulated.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Length of the accumulated buffer, trailer included.
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    /// Application payload without the trailer.
    pub fn payload(&self) -> &[u8] {
        &self.raw[..self.payload_len()]
    }

    /// Payload length, i.e. `raw_len() - 2`.
    pub fn payload_len(&self) -> usize {
        self.raw.len().saturating_sub(TRAILER_SIZE)
    }

    /// Payload as a cheaply cloneable buffer.
    pub fn payload_bytes(&self) -> Bytes {
        self.raw.slice(..self.payload_len())
    }

    /// Frame check sequence as transmitted (high byte first).
    pub fn fcs(&self) -> u16 {
        let n = self.raw.len();
        u16::from_be_bytes([self.raw[n - 2], self.raw[n - 1]])
    }

    /// Number of bytes this frame occupies on the wire, boundaries included.
    pub fn wire_size(&self) -> usize {
        2 + self
            .raw
            .iter()
            .map(|&b| if is_reserved(b) { 2 } else { 1 })
            .sum::<usize>()
    }

    /// Consume the frame and return the accumulated buffer.
    pub fn into_raw(self) -> Bytes {
        self.raw
    }
}

/// Link configuration shared by the stream adapters and the async codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Receive buffer capacity in bytes, trailer included. Default: 128.
    pub max_frame_length: usize,
}

impl FrameConfig {
    /// Largest payload that still fits a peer decoder with this capacity.
    pub fn max_payload(&self) -> usize {
        self.max_frame_length.saturating_sub(TRAILER_SIZE)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}
