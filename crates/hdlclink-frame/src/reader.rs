use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::decoder::{DecoderStats, FrameDecoder};
use crate::error::{FrameError, Result};
use crate::frame::{Frame, FrameConfig};

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads validated frames from any `Read` stream (serial port, pipe, file).
///
/// Bytes are pushed through a [`FrameDecoder`]; corrupt or oversized frames
/// are skipped and reading continues with the next one.
pub struct FrameReader<T> {
    inner: T,
    pending: BytesMut,
    decoder: FrameDecoder,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            pending: BytesMut::with_capacity(READ_CHUNK_SIZE),
            decoder: FrameDecoder::default(),
            config: FrameConfig::default(),
        }
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Result<Self> {
        Ok(Self {
            inner,
            pending: BytesMut::with_capacity(READ_CHUNK_SIZE),
            decoder: FrameDecoder::with_config(&config)?,
            config,
        })
    }

    /// Read the next valid frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; any
    /// partial frame buffered at that point is discarded.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            while self.pending.has_remaining() {
                let byte = self.pending.get_u8();
                if let Some(frame) = self.decoder.feed(byte) {
                    return Ok(frame);
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.decoder.buffered() > 0 {
                    tracing::debug!(
                        buffered = self.decoder.buffered(),
                        "stream closed mid-frame"
                    );
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend_from_slice(&chunk[..read]);
        }
    }

    /// Receive statistics of the underlying decoder.
    pub fn stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames until the stream closes cleanly.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::encoder::encode_to_vec;
    use crate::frame::{CONTROL_ESCAPE, DEFAULT_MAX_FRAME_LENGTH, FRAME_BOUNDARY};

    fn wire_of(payloads: &[&str]) -> Vec<u8> {
        payloads
            .iter()
            .flat_map(|p| encode_to_vec(p.as_bytes()))
            .collect()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(encode_to_vec(b"hello")));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.payload(), b"hello");
        assert_eq!(frame.raw_len(), 7);
    }

    #[test]
    fn read_multiple_frames_from_one_chunk() {
        let wire = wire_of(&["one", "two", "three"]);
        let mut reader = FrameReader::new(Cursor::new(wire));

        assert_eq!(reader.read_frame().unwrap().payload(), b"one");
        assert_eq!(reader.read_frame().unwrap().payload(), b"two");
        assert_eq!(reader.read_frame().unwrap().payload(), b"three");
        assert!(matches!(
            reader.read_frame().unwrap_err(),
            FrameError::ConnectionClosed
        ));
    }

    #[test]
    fn skips_corrupt_frames() {
        let mut wire = encode_to_vec(b"good-1");
        let mut bad = encode_to_vec(b"bad");
        bad[2] ^= 0x01;
        wire.extend_from_slice(&bad);
        wire.extend_from_slice(&encode_to_vec(b"good-2"));

        let mut reader = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.read_frame().unwrap().payload(), b"good-1");
        assert_eq!(reader.read_frame().unwrap().payload(), b"good-2");
        assert_eq!(reader.stats().crc_errors, 1);
    }

    #[test]
    fn respects_configured_capacity() {
        let cfg = FrameConfig {
            max_frame_length: 8,
        };
        let wire = wire_of(&["this payload is far too long", "short"]);
        let mut reader = FrameReader::with_config(Cursor::new(wire), cfg).unwrap();

        assert_eq!(reader.read_frame().unwrap().payload(), b"short");
        assert_eq!(reader.stats().overflows, 1);
        assert_eq!(reader.config().max_frame_length, 8);
    }

    #[test]
    fn rejects_unusable_capacity() {
        let cfg = FrameConfig {
            max_frame_length: 1,
        };
        let result = FrameReader::with_config(Cursor::new(Vec::new()), cfg);
        assert!(matches!(result, Err(FrameError::InvalidCapacity { .. })));
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: encode_to_vec(&[0x01, FRAME_BOUNDARY, CONTROL_ESCAPE, 0x02]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.payload(), &[0x01, FRAME_BOUNDARY, CONTROL_ESCAPE, 0x02]);
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut wire = encode_to_vec(b"only-part");
        wire.truncate(5);

        let mut reader = FrameReader::new(Cursor::new(wire));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn iterator_stops_at_eof() {
        let wire = wire_of(&["a", "b", "c"]);
        let payloads: Vec<Vec<u8>> = FrameReader::new(Cursor::new(wire))
            .map(|frame| frame.unwrap().payload().to_vec())
            .collect();
        assert_eq!(payloads, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.send(b"ping").unwrap();
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.payload(), b"ping");
    }

    #[test]
    #[cfg(unix)]
    fn concurrent_reader_writer_threads() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let reader = Arc::new(Mutex::new(FrameReader::new(right)));

        let reader_thread = {
            let reader = Arc::clone(&reader);
            std::thread::spawn(move || {
                for expected in 0..64u16 {
                    let frame = reader.lock().unwrap().read_frame().unwrap();
                    assert_eq!(frame.payload(), format!("msg-{expected}").as_bytes());
                }
            })
        };

        for i in 0..64u16 {
            writer.send(format!("msg-{i}").as_bytes()).unwrap();
        }

        reader_thread.join().unwrap();
    }

    #[test]
    fn accessors_expose_inner_stream() {
        let wire = wire_of(&["one", "two"]);
        let wire_len = wire.len() as u64;
        let mut reader = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.config().max_frame_length, DEFAULT_MAX_FRAME_LENGTH);
        assert_eq!(reader.get_ref().position(), 0);

        assert_eq!(reader.read_frame().unwrap().payload(), b"one");
        // The whole capture fits in one chunk read.
        assert_eq!(reader.get_ref().position(), wire_len);

        reader.get_mut().set_position(0);
        let inner = reader.into_inner();
        assert_eq!(inner.position(), 0);
        assert_eq!(inner.get_ref().len() as u64, wire_len);
    }

    #[test]
    fn read_would_block_propagates_io_error() {
        let reader = WouldBlockThenData {
            state: 0,
            bytes: encode_to_vec(b"ok"),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: encode_to_vec(b"ok"),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        assert_eq!(framed.read_frame().unwrap().payload(), b"ok");
    }

    struct WouldBlockThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for WouldBlockThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            read_remaining(&self.bytes, &mut self.pos, buf)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            read_remaining(&self.bytes, &mut self.pos, buf)
        }
    }

    fn read_remaining(bytes: &[u8], pos: &mut usize, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = (bytes.len() - *pos).min(buf.len());
        buf[..n].copy_from_slice(&bytes[*pos..*pos + n]);
        *pos += n;
        Ok(n)
    }
}
