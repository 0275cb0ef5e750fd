//! Blocking loopback: frame a few payloads into a buffer, then read them back.
//!
//! Run with:
//!   cargo run --example loopback

use std::io::Cursor;

use hdlclink::{FrameConfig, FrameReader, FrameWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = FrameConfig {
        max_frame_length: 32,
    };

    let mut writer = FrameWriter::with_config(Vec::new(), config.clone());
    writer.send(b"temp=21.5")?;
    writer.send(&[0x7E, 0x7D, 0x00, 0xFF])?;
    writer.send(b"")?;

    if let Err(err) = writer.send(&[0u8; 64]) {
        eprintln!("refused oversized payload: {err}");
    }

    let wire = writer.into_inner();
    eprintln!("wire ({} bytes): {wire:02x?}", wire.len());

    let reader = FrameReader::with_config(Cursor::new(wire), config)?;
    for frame in reader {
        let frame = frame?;
        println!(
            "payload={:02x?} payload_len={} raw_len={} fcs={:#06x}",
            frame.payload(),
            frame.payload_len(),
            frame.raw_len(),
            frame.fcs()
        );
    }

    Ok(())
}
