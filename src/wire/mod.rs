//! Fixed 8-byte packet header (RTP-like) and media timestamp helpers.

use bytes::BufMut;

/// Constant type/flags field carried by every packet.
pub const FLAG_BITS: u16 = 0x4040;

/// Bytes of header preceding the payload on the wire.
pub const HEADER_LEN: usize = 8;

/// IP + UDP overhead, used when describing on-wire load in the session table.
pub const IP_UDP_OVERHEAD: usize = 20 + 8;

/// Header prepended to every generated packet, network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub flags: u16,
    pub seq: u16,
    pub tstamp: u32,
}

impl PacketHeader {
    pub fn new(seq: u16, tstamp: u32) -> Self {
        Self {
            flags: FLAG_BITS,
            seq,
            tstamp,
        }
    }

    /// Encode into the first [`HEADER_LEN`] bytes of `buf`.
    ///
    /// Panics if `buf` is shorter than [`HEADER_LEN`]; the dispatcher always
    /// hands in its pre-allocated packet buffer.
    pub fn encode_into(&self, mut buf: &mut [u8]) {
        buf.put_u16(self.flags);
        buf.put_u16(self.seq);
        buf.put_u32(self.tstamp);
    }

    /// Decode the header from the front of a received packet.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(Self {
            flags: u16::from_be_bytes([buf[0], buf[1]]),
            seq: u16::from_be_bytes([buf[2], buf[3]]),
            tstamp: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }
}

/// Media timestamp for a wall-clock instant: seconds in the upper 16 bits,
/// microseconds scaled by 0x431C/2^15 folded in below, truncated to 32 bits.
pub fn media_timestamp(secs: u64, micros: u32) -> u32 {
    let frac = ((micros as u64 * 0x431C) >> 15) as u32;
    frac.wrapping_add((secs as u32) << 16)
}
