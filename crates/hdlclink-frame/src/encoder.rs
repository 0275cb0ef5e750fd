use bytes::{BufMut, BytesMut};

use crate::crc;
use crate::frame::{is_reserved, CONTROL_ESCAPE, ESCAPE_XOR, FRAME_BOUNDARY};

/// Destination for encoded wire bytes (UART TX register, socket, buffer).
///
/// Called once per wire byte, in emission order. Whether the transport
/// accepted the byte is the sink's concern.
pub trait ByteSink {
    fn send_byte(&mut self, byte: u8);
}

impl ByteSink for Vec<u8> {
    fn send_byte(&mut self, byte: u8) {
        self.push(byte);
    }
}

impl ByteSink for BytesMut {
    fn send_byte(&mut self, byte: u8) {
        self.put_u8(byte);
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn send_byte(&mut self, byte: u8) {
        (**self).send_byte(byte);
    }
}

/// Adapter turning a closure into a [`ByteSink`].
pub struct FnSink<F>(F);

/// Wrap `f` so it can receive encoded bytes.
pub fn sink_fn<F: FnMut(u8)>(f: F) -> FnSink<F> {
    FnSink(f)
}

impl<F: FnMut(u8)> ByteSink for FnSink<F> {
    fn send_byte(&mut self, byte: u8) {
        (self.0)(byte);
    }
}

/// Wrap `payload` in a frame and emit it byte by byte.
///
/// Wire format:
/// ```text
/// ┌──────┬────────────────────┬──────────┬──────────┬──────┐
/// │ 0x7E │ payload (stuffed)  │ FCS high │ FCS low  │ 0x7E │
/// └──────┴────────────────────┴──────────┴──────────┴──────┘
/// ```
/// `0x7E` and `0x7D` inside the payload or FCS are sent as `0x7D` followed by
/// the byte XOR `0x20`. The FCS is computed over the unstuffed payload.
pub fn encode<S: ByteSink + ?Sized>(payload: &[u8], sink: &mut S) {
    let fcs = crc::compute(payload);

    sink.send_byte(FRAME_BOUNDARY);
    for &byte in payload {
        send_stuffed(sink, byte);
    }
    let [high, low] = fcs.to_be_bytes();
    send_stuffed(sink, high);
    send_stuffed(sink, low);
    sink.send_byte(FRAME_BOUNDARY);
}

/// Encode `payload` into `dst`, reserving the exact wire length first.
pub fn encode_into(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(encoded_len(payload));
    encode(payload, dst);
}

/// Encode `payload` into a freshly allocated buffer.
pub fn encode_to_vec(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(payload));
    encode(payload, &mut out);
    out
}

/// Exact number of wire bytes [`encode`] emits for `payload`.
pub fn encoded_len(payload: &[u8]) -> usize {
    let stuffed = |b: u8| if is_reserved(b) { 2 } else { 1 };
    let [high, low] = crc::compute(payload).to_be_bytes();
    2 + payload.iter().map(|&b| stuffed(b)).sum::<usize>() + stuffed(high) + stuffed(low)
}

#[inline]
fn send_stuffed<S: ByteSink + ?Sized>(sink: &mut S, byte: u8) {
    if is_reserved(byte) {
        sink.send_byte(CONTROL_ESCAPE);
        sink.send_byte(byte ^ ESCAPE_XOR);
    } else {
        sink.send_byte(byte);
    }
}
