//! Drive the decoder one byte at a time, the way a UART receive interrupt
//! would, with line noise and a corrupted frame mixed into the stream.
//!
//! Run with:
//!   cargo run --example byte-at-a-time

use hdlclink::frame::sink_fn;
use hdlclink::{encode, FrameDecoder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Stand-in for a transmit register: the encoder pushes one octet at a time.
    let mut line = vec![0x00, 0x55, 0xAA];
    encode(b"AB", &mut sink_fn(|byte| line.push(byte)));
    encode(&[0x7E, 0x01, 0x7D], &mut line);

    let mut corrupted = Vec::new();
    encode(b"flip", &mut corrupted);
    corrupted[2] ^= 0x01;
    line.extend_from_slice(&corrupted);

    encode(b"last", &mut line);

    let mut decoder = FrameDecoder::new(8)?;
    let mut on_frame = |raw: &[u8]| {
        let (payload, trailer) = raw.split_at(raw.len() - 2);
        println!(
            "frame raw_len={} payload={payload:02x?} trailer={trailer:02x?}",
            raw.len()
        );
    };

    for &byte in &line {
        decoder.feed_with(byte, &mut on_frame);
    }

    let stats = decoder.stats();
    eprintln!(
        "delivered={} crc_errors={} dropped={}",
        stats.frames,
        stats.crc_errors,
        stats.dropped()
    );

    Ok(())
}
