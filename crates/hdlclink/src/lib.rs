//! HDLC-style framing for byte-oriented links.
//!
//! hdlclink carries variable-length binary messages over transports that
//! only guarantee ordered byte delivery (UART, RS-485, pipes): frames are
//! delimited by `0x7E`, reserved octets are byte-stuffed, and every frame
//! carries a CRC-16/CCITT-FALSE trailer.
//!
//! # Crate Structure
//!
//! - [`frame`]: checksum engine, streaming decoder, encoder, and blocking
//!   stream adapters; the async `HdlcCodec` sits behind the `async` feature
//!
//! The `hdlclink` binary (feature `cli`) encodes payloads, decodes captured
//! byte streams and computes checksums from the command line.

/// Re-export frame types.
pub mod frame {
    pub use hdlclink_frame::*;
}

pub use hdlclink_frame::{
    encode, Frame, FrameConfig, FrameDecoder, FrameError, FrameHandler, FrameReader, FrameWriter,
};
