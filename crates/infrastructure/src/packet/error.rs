use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Truncated {what}: needed {needed} bytes, {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Unsupported link type: {0}")]
    UnsupportedLinkType(i32),

    #[error("Not an IP packet (ethertype 0x{0:04x})")]
    NotIp(u16),

    #[error("Unsupported IP version: {0}")]
    UnsupportedIpVersion(u8),

    #[error("Malformed {what}: {reason}")]
    Malformed {
        what: &'static str,
        reason: &'static str,
    },

    #[error("Reassembled datagram too large: {0} bytes")]
    Oversized(usize),
}
