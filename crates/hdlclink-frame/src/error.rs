/// Errors raised by the layers around the frame state machine.
///
/// The decoder itself never fails: corrupt, oversized and aborted frames are
/// dropped silently. These errors come from configuration, the stream
/// adapters and the async codec.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload cannot fit in the peer's receive buffer.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The decoder buffer cannot hold even an empty frame plus its trailer.
    #[error("invalid frame capacity ({capacity} bytes, min {min})")]
    InvalidCapacity { capacity: usize, min: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended while waiting for a complete frame.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
