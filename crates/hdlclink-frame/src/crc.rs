//! Frame check sequence: CRC-16/CCITT-FALSE.
//!
//! Polynomial 0x1021, initial value 0xFFFF, processed MSB-first with no
//! reflection and no final XOR. The same routine guards both directions of
//! the link, so encoder and decoder agree bit for bit.

/// CRC-16/CCITT generator polynomial.
pub const POLYNOMIAL: u16 = 0x1021;

/// Register value before the first byte is processed.
pub const INIT: u16 = 0xFFFF;

/// Expected checksum of the ASCII string `"123456789"`.
pub const CHECK: u16 = 0x29B1;

/// Advance a running checksum by one byte.
#[inline]
pub fn update(running: u16, byte: u8) -> u16 {
    let mut crc = running ^ (u16::from(byte) << 8);
    for _ in 0..8 {
        crc = if crc & 0x8000 != 0 {
            (crc << 1) ^ POLYNOMIAL
        } else {
            crc << 1
        };
    }
    crc
}

/// Compute the checksum of a complete buffer.
pub fn compute(buffer: &[u8]) -> u16 {
    buffer.iter().fold(INIT, |crc, &byte| update(crc, byte))
}
