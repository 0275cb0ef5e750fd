//! HDLC-style asynchronous framing for byte-oriented links.
//!
//! This is the core of hdlclink. Every frame on the wire is:
//! - A boundary octet `0x7E`
//! - The payload, with `0x7E` / `0x7D` escaped as `0x7D, byte ^ 0x20`
//! - A CRC-16/CCITT-FALSE trailer, high byte first, escaped the same way
//! - A closing boundary octet `0x7E`
//!
//! [`FrameDecoder`] recovers frames from a raw byte stream one byte at a
//! time; [`encode`] produces the wire bytes for a payload.

pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod codec;

#[cfg(feature = "async")]
pub use codec::HdlcCodec;
pub use decoder::{DecoderStats, FrameDecoder, FrameHandler};
pub use encoder::{encode, encode_into, encode_to_vec, encoded_len, sink_fn, ByteSink, FnSink};
pub use error::{FrameError, Result};
pub use frame::{
    Frame, FrameConfig, CONTROL_ESCAPE, DEFAULT_MAX_FRAME_LENGTH, FRAME_BOUNDARY,
    MIN_FRAME_CAPACITY, TRAILER_SIZE,
};
pub use reader::FrameReader;
pub use writer::FrameWriter;
