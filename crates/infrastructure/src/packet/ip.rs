use super::context::FragmentFlag;
use super::error::PacketError;
use super::reader::PacketReader;
use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const IPV4_MIN_HEADER: usize = 20;
const IPV6_HEADER: usize = 40;
const IPV4_MORE_FRAGMENTS: u16 = 0x2000;
const IPV4_DONT_FRAGMENT: u16 = 0x4000;
const IPV4_OFFSET_MASK: u16 = 0x1fff;
const MAX_DATAGRAM: usize = u16::MAX as usize;

const NH_HOP_BY_HOP: u8 = 0;
const NH_ROUTING: u8 = 43;
const NH_FRAGMENT: u8 = 44;
const NH_AUTH: u8 = 51;
const NH_DEST_OPTS: u8 = 60;

/// Fragmentation fields of a datagram that is part of a larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentInfo {
    /// IPv4 identification widened to 32 bits, or the IPv6 fragment id.
    pub id: u32,
    /// Offset in 8-byte units.
    pub offset: u16,
    pub more_fragments: bool,
}

impl FragmentInfo {
    pub fn flag(&self) -> FragmentFlag {
        match (self.offset, self.more_fragments) {
            (0, true) => FragmentFlag::First,
            (_, true) => FragmentFlag::Middle,
            (_, false) => FragmentFlag::Last,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IpDatagram<'a> {
    pub src: IpAddr,
    pub dst: IpAddr,
    /// Upper-layer protocol number (after any IPv6 extension headers).
    pub protocol: u8,
    /// Header bytes preceding the payload (IPv4 header with options, or the
    /// fixed IPv6 header).
    pub header: &'a [u8],
    pub payload: &'a [u8],
    pub fragment: Option<FragmentInfo>,
}

impl<'a> IpDatagram<'a> {
    pub fn parse(packet: &'a [u8]) -> Result<Self, PacketError> {
        let first = PacketReader::new(packet, "ip header").peek_u8()?;
        match first >> 4 {
            4 => parse_ipv4(packet),
            6 => parse_ipv6(packet),
            version => Err(PacketError::UnsupportedIpVersion(version)),
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment.is_some()
    }

    /// Header to keep for reassembly. IPv6 headers get their next-header
    /// field pointed at the upper-layer protocol, since the fragment
    /// extension header is not carried into the rebuilt datagram.
    pub fn reassembly_header(&self) -> Cow<'a, [u8]> {
        match self.src {
            IpAddr::V4(_) => Cow::Borrowed(self.header),
            IpAddr::V6(_) => {
                let mut header = self.header.to_vec();
                header[6] = self.protocol;
                Cow::Owned(header)
            }
        }
    }
}

fn parse_ipv4(packet: &[u8]) -> Result<IpDatagram<'_>, PacketError> {
    let mut reader = PacketReader::new(packet, "ipv4 header");
    let version_ihl = reader.read_u8()?;
    let header_len = usize::from(version_ihl & 0x0f) * 4;
    if header_len < IPV4_MIN_HEADER {
        return Err(PacketError::Malformed {
            what: "ipv4 header",
            reason: "header length below 20 bytes",
        });
    }

    reader.skip(1)?;
    let total_len = usize::from(reader.read_u16()?);
    let id = reader.read_u16()?;
    let flags_offset = reader.read_u16()?;
    reader.skip(1)?;
    let protocol = reader.read_u8()?;
    reader.skip(2)?;
    let src = Ipv4Addr::from(reader.read_array::<4>()?);
    let dst = Ipv4Addr::from(reader.read_array::<4>()?);
    reader.skip(header_len - IPV4_MIN_HEADER)?;

    if total_len < header_len {
        return Err(PacketError::Malformed {
            what: "ipv4 header",
            reason: "total length shorter than header",
        });
    }

    // Trailing link padding is not part of the datagram; a short capture
    // keeps whatever was captured.
    let end = total_len.min(packet.len());
    let more_fragments = flags_offset & IPV4_MORE_FRAGMENTS != 0;
    let offset = flags_offset & IPV4_OFFSET_MASK;

    let fragment = (more_fragments || offset != 0).then_some(FragmentInfo {
        id: u32::from(id),
        offset,
        more_fragments,
    });

    Ok(IpDatagram {
        src: IpAddr::V4(src),
        dst: IpAddr::V4(dst),
        protocol,
        header: &packet[..header_len],
        payload: &packet[header_len..end],
        fragment,
    })
}

fn parse_ipv6(packet: &[u8]) -> Result<IpDatagram<'_>, PacketError> {
    let mut reader = PacketReader::new(packet, "ipv6 header");
    reader.skip(4)?;
    let payload_len = usize::from(reader.read_u16()?);
    let mut next_header = reader.read_u8()?;
    reader.skip(1)?;
    let src = Ipv6Addr::from(reader.read_array::<16>()?);
    let dst = Ipv6Addr::from(reader.read_array::<16>()?);

    // A zero payload length means a jumbogram; take what was captured.
    let end = if payload_len == 0 {
        packet.len()
    } else {
        (IPV6_HEADER + payload_len).min(packet.len())
    };

    let mut ext = PacketReader::new(&packet[IPV6_HEADER..end], "ipv6 extension header");
    let mut fragment = None;

    loop {
        match next_header {
            NH_HOP_BY_HOP | NH_ROUTING | NH_DEST_OPTS => {
                let nh = ext.read_u8()?;
                let len = usize::from(ext.read_u8()?);
                ext.skip(len * 8 + 6)?;
                next_header = nh;
            }
            NH_AUTH => {
                let nh = ext.read_u8()?;
                let len = usize::from(ext.read_u8()?);
                ext.skip((len + 2) * 4 - 2)?;
                next_header = nh;
            }
            NH_FRAGMENT => {
                let nh = ext.read_u8()?;
                ext.skip(1)?;
                let offset_flags = ext.read_u16()?;
                let id = ext.read_u32()?;
                let info = FragmentInfo {
                    id,
                    offset: offset_flags >> 3,
                    more_fragments: offset_flags & 0x0001 != 0,
                };
                // Atomic fragments (offset 0, no more fragments) are whole datagrams.
                if info.offset != 0 || info.more_fragments {
                    fragment = Some(info);
                }
                next_header = nh;
                break;
            }
            _ => break,
        }
    }

    Ok(IpDatagram {
        src: IpAddr::V6(src),
        dst: IpAddr::V6(dst),
        protocol: next_header,
        header: &packet[..IPV6_HEADER],
        payload: ext.rest(),
        fragment,
    })
}

/// Builds an unfragmented datagram from a kept reassembly header and the
/// reassembled payload, so it can go back through [`IpDatagram::parse`].
pub fn rebuild_datagram(header: &[u8], payload: &[u8]) -> Result<Vec<u8>, PacketError> {
    let first = PacketReader::new(header, "reassembly header").peek_u8()?;
    match first >> 4 {
        4 => {
            let total = header.len() + payload.len();
            if total > MAX_DATAGRAM || header.len() < IPV4_MIN_HEADER {
                return Err(PacketError::Oversized(total));
            }
            let mut out = Vec::with_capacity(total);
            out.extend_from_slice(header);
            out[2..4].copy_from_slice(&(total as u16).to_be_bytes());
            let flags = u16::from_be_bytes([out[6], out[7]]) & IPV4_DONT_FRAGMENT;
            out[6..8].copy_from_slice(&flags.to_be_bytes());
            out[10..12].copy_from_slice(&[0, 0]);
            out.extend_from_slice(payload);
            Ok(out)
        }
        6 => {
            if payload.len() > MAX_DATAGRAM || header.len() < IPV6_HEADER {
                return Err(PacketError::Oversized(payload.len()));
            }
            let mut out = Vec::with_capacity(IPV6_HEADER + payload.len());
            out.extend_from_slice(&header[..IPV6_HEADER]);
            out[4..6].copy_from_slice(&(payload.len() as u16).to_be_bytes());
            out.extend_from_slice(payload);
            Ok(out)
        }
        version => Err(PacketError::UnsupportedIpVersion(version)),
    }
}
