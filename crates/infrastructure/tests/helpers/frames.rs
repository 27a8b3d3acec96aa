use ferrous_pdns_domain::Timestamp;
use ferrous_pdns_infrastructure::pipeline::{CapturedPacket, PipelineEvent};
use std::net::{Ipv4Addr, Ipv6Addr};

pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;
pub const PROTO_ICMP: u8 = 1;

pub const CLIENT_V4: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);
pub const SERVER_V4: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);
pub const CLIENT_PORT: u16 = 51000;
pub const DNS_PORT: u16 = 53;

pub const IPV4_MF: u16 = 0x2000;

pub fn ethernet(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // destination MAC
        0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, // source MAC
    ];
    frame.extend_from_slice(&ethertype.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

pub fn ipv4_packet(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: u8,
    id: u16,
    flags_offset: u16,
    payload: &[u8],
) -> Vec<u8> {
    let total = (20 + payload.len()) as u16;
    let mut packet = vec![0x45, 0x00];
    packet.extend_from_slice(&total.to_be_bytes());
    packet.extend_from_slice(&id.to_be_bytes());
    packet.extend_from_slice(&flags_offset.to_be_bytes());
    packet.extend_from_slice(&[64, protocol, 0x00, 0x00]); // TTL, protocol, checksum
    packet.extend_from_slice(&src.octets());
    packet.extend_from_slice(&dst.octets());
    packet.extend_from_slice(payload);
    packet
}

pub fn ipv6_packet(src: Ipv6Addr, dst: Ipv6Addr, next_header: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0x60, 0x00, 0x00, 0x00];
    packet.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    packet.extend_from_slice(&[next_header, 64]);
    packet.extend_from_slice(&src.octets());
    packet.extend_from_slice(&dst.octets());
    packet.extend_from_slice(payload);
    packet
}

/// IPv6 packet carrying one fragment; `offset` is in 8-byte units.
pub fn ipv6_fragment(
    src: Ipv6Addr,
    dst: Ipv6Addr,
    next_header: u8,
    id: u32,
    offset: u16,
    more: bool,
    data: &[u8],
) -> Vec<u8> {
    let mut payload = vec![next_header, 0x00];
    let offset_flags = (offset << 3) | u16::from(more);
    payload.extend_from_slice(&offset_flags.to_be_bytes());
    payload.extend_from_slice(&id.to_be_bytes());
    payload.extend_from_slice(data);
    ipv6_packet(src, dst, 44, &payload)
}

pub fn udp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(8 + payload.len());
    segment.extend_from_slice(&src_port.to_be_bytes());
    segment.extend_from_slice(&dst_port.to_be_bytes());
    segment.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    segment.extend_from_slice(&[0x00, 0x00]); // checksum
    segment.extend_from_slice(payload);
    segment
}

pub fn tcp_segment(src_port: u16, dst_port: u16, flags: u8, payload: &[u8]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(20 + payload.len());
    segment.extend_from_slice(&src_port.to_be_bytes());
    segment.extend_from_slice(&dst_port.to_be_bytes());
    segment.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]); // sequence
    segment.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // acknowledgement
    segment.extend_from_slice(&[0x50, flags]); // data offset 5, flags
    segment.extend_from_slice(&[0xff, 0xff, 0x00, 0x00, 0x00, 0x00]); // window, checksum, urgent
    segment.extend_from_slice(payload);
    segment
}

/// DNS over TCP: two-byte length prefix before the message.
pub fn tcp_dns_payload(message: &[u8]) -> Vec<u8> {
    let mut payload = (message.len() as u16).to_be_bytes().to_vec();
    payload.extend_from_slice(message);
    payload
}

pub fn udp_v4_frame(
    src: Ipv4Addr,
    src_port: u16,
    dst: Ipv4Addr,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let segment = udp_segment(src_port, dst_port, payload);
    ethernet(0x0800, &ipv4_packet(src, dst, PROTO_UDP, 1, 0, &segment))
}

pub fn tcp_v4_frame(
    src: Ipv4Addr,
    src_port: u16,
    dst: Ipv4Addr,
    dst_port: u16,
    flags: u8,
    payload: &[u8],
) -> Vec<u8> {
    let segment = tcp_segment(src_port, dst_port, flags, payload);
    ethernet(0x0800, &ipv4_packet(src, dst, PROTO_TCP, 1, 0, &segment))
}

pub fn udp_v6_frame(
    src: Ipv6Addr,
    src_port: u16,
    dst: Ipv6Addr,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let segment = udp_segment(src_port, dst_port, payload);
    ethernet(0x86dd, &ipv6_packet(src, dst, PROTO_UDP, &segment))
}

pub fn ts(secs: u64) -> Timestamp {
    Timestamp::from_secs(secs)
}

pub fn captured(timestamp: Timestamp, frame: Vec<u8>) -> CapturedPacket {
    CapturedPacket {
        timestamp,
        wire_len: frame.len() as u32,
        data: frame,
    }
}

pub fn packet_event(timestamp: Timestamp, frame: Vec<u8>) -> PipelineEvent {
    PipelineEvent::Packet(captured(timestamp, frame))
}
