//! `tokio_util` codec for async byte streams.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::decoder::{DecoderStats, FrameDecoder};
use crate::encoder::encode_into;
use crate::error::{FrameError, Result};
use crate::frame::{Frame, FrameConfig};

/// Frame codec for `FramedRead` / `FramedWrite` / `Framed`.
///
/// Decoding drains every byte handed to it into the link state machine, so
/// the read buffer never holds more than one partial chunk.
#[derive(Debug)]
pub struct HdlcCodec {
    decoder: FrameDecoder,
    max_payload: usize,
}

impl HdlcCodec {
    /// Codec with the default frame capacity.
    pub fn new() -> Self {
        let config = FrameConfig::default();
        Self {
            max_payload: config.max_payload(),
            decoder: FrameDecoder::default(),
        }
    }

    /// Codec sized by `config.max_frame_length` in both directions.
    pub fn with_config(config: &FrameConfig) -> Result<Self> {
        Ok(Self {
            decoder: FrameDecoder::with_config(config)?,
            max_payload: config.max_payload(),
        })
    }

    /// Receive statistics of the underlying decoder.
    pub fn stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    fn encode_payload(&self, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
        if payload.len() > self.max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }
        encode_into(payload, dst);
        Ok(())
    }
}

impl Default for HdlcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HdlcCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        while src.has_remaining() {
            if let Some(frame) = self.decoder.feed(src.get_u8()) {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if self.decoder.buffered() > 0 {
            tracing::debug!(
                buffered = self.decoder.buffered(),
                "stream closed mid-frame"
            );
            self.decoder.reset();
        }
        Ok(None)
    }
}

impl Encoder<&[u8]> for HdlcCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<()> {
        self.encode_payload(item, dst)
    }
}

impl Encoder<Bytes> for HdlcCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        self.encode_payload(&item, dst)
    }
}
