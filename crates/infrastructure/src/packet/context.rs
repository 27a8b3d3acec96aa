use super::ip::IpDatagram;
use super::transport::TransportSegment;
use ferrous_pdns_domain::{AddressFamily, Timestamp, TransportProtocol};
use std::net::IpAddr;

/// Position of a datagram within a fragmented original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentFlag {
    None,
    First,
    Middle,
    Last,
}

/// Everything the pipeline needs to know about one decoded packet.
///
/// Borrows the capture buffer (or the reassembled datagram) and lives for
/// the duration of a single event.
#[derive(Debug, Clone)]
pub struct PacketContext<'a> {
    pub timestamp: Timestamp,
    pub family: AddressFamily,
    pub protocol: TransportProtocol,
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub tcp_flags: u8,
    /// Transport payload; for TCP DNS the length prefix is already stripped.
    pub payload: &'a [u8],
    /// UDP or TCP; only these are decoded as DNS.
    pub carries_dns: bool,
    /// Bytes on the IP layer, used for flow byte counters.
    pub ip_len: usize,
    pub fragment: FragmentFlag,
}

impl<'a> PacketContext<'a> {
    pub fn new(
        timestamp: Timestamp,
        datagram: &IpDatagram<'a>,
        segment: &TransportSegment<'a>,
    ) -> Self {
        Self {
            timestamp,
            family: AddressFamily::of(&datagram.src),
            protocol: segment.protocol,
            src: datagram.src,
            dst: datagram.dst,
            src_port: segment.src_port,
            dst_port: segment.dst_port,
            tcp_flags: segment.tcp_flags,
            payload: segment.dns_payload(),
            carries_dns: segment.carries_dns(),
            ip_len: datagram.header.len() + datagram.payload.len(),
            fragment: datagram
                .fragment
                .map_or(FragmentFlag::None, |info| info.flag()),
        }
    }
}
