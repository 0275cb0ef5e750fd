//! Async loopback over an in-memory duplex pipe using `HdlcCodec`.
//!
//! Run with:
//!   cargo run --example async-loopback --features async

use futures_util::{SinkExt, StreamExt};
use hdlclink::frame::HdlcCodec;
use tokio_util::codec::{FramedRead, FramedWrite};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = tokio::io::duplex(64);

    let sender = tokio::spawn(async move {
        let mut sink = FramedWrite::new(tx, HdlcCodec::new());
        for reading in ["temp=21.5", "temp=21.7", "temp=22.0"] {
            sink.send(reading.as_bytes()).await?;
        }
        Ok::<_, hdlclink::FrameError>(())
    });

    let mut frames = FramedRead::new(rx, HdlcCodec::new());
    while let Some(frame) = frames.next().await {
        let frame = frame?;
        println!(
            "{} (fcs {:#06x})",
            String::from_utf8_lossy(frame.payload()),
            frame.fcs()
        );
    }

    sender.await??;
    eprintln!("decoder stats: {:?}", frames.decoder().stats());

    Ok(())
}
