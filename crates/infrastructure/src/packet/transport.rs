use super::error::PacketError;
use super::reader::PacketReader;
use ferrous_pdns_domain::TransportProtocol;

const UDP_HEADER: usize = 8;
const TCP_MIN_HEADER: usize = 20;

pub struct TcpFlags;

impl TcpFlags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
}

#[derive(Debug, Clone)]
pub struct TransportSegment<'a> {
    pub protocol: TransportProtocol,
    pub src_port: u16,
    pub dst_port: u16,
    pub tcp_flags: u8,
    pub payload: &'a [u8],
}

impl<'a> TransportSegment<'a> {
    /// Decodes the transport header of an unfragmented datagram payload.
    /// Protocols without ports are passed through with zeroed ports.
    pub fn parse(protocol: TransportProtocol, data: &'a [u8]) -> Result<Self, PacketError> {
        match protocol {
            TransportProtocol::Udp => parse_udp(data),
            TransportProtocol::Tcp => parse_tcp(data),
            other => Ok(Self {
                protocol: other,
                src_port: 0,
                dst_port: 0,
                tcp_flags: 0,
                payload: data,
            }),
        }
    }

    /// Payload to hand to the DNS decoder. TCP carries a two-byte length
    /// prefix before each message.
    pub fn dns_payload(&self) -> &'a [u8] {
        match self.protocol {
            TransportProtocol::Tcp if self.payload.len() >= 2 => {
                let declared = usize::from(u16::from_be_bytes([self.payload[0], self.payload[1]]));
                let body = &self.payload[2..];
                &body[..declared.min(body.len())]
            }
            TransportProtocol::Tcp => &[],
            _ => self.payload,
        }
    }

    pub fn carries_dns(&self) -> bool {
        matches!(self.protocol, TransportProtocol::Udp | TransportProtocol::Tcp)
    }
}

fn parse_udp(data: &[u8]) -> Result<TransportSegment<'_>, PacketError> {
    let mut reader = PacketReader::new(data, "udp header");
    let src_port = reader.read_u16()?;
    let dst_port = reader.read_u16()?;
    let length = usize::from(reader.read_u16()?);
    reader.skip(2)?;

    let rest = reader.rest();
    let payload = if length >= UDP_HEADER {
        &rest[..(length - UDP_HEADER).min(rest.len())]
    } else {
        rest
    };

    Ok(TransportSegment {
        protocol: TransportProtocol::Udp,
        src_port,
        dst_port,
        tcp_flags: 0,
        payload,
    })
}

fn parse_tcp(data: &[u8]) -> Result<TransportSegment<'_>, PacketError> {
    let mut reader = PacketReader::new(data, "tcp header");
    let src_port = reader.read_u16()?;
    let dst_port = reader.read_u16()?;
    reader.skip(8)?;
    let offset_flags = reader.read_u16()?;

    let header_len = usize::from(offset_flags >> 12) * 4;
    if header_len < TCP_MIN_HEADER {
        return Err(PacketError::Malformed {
            what: "tcp header",
            reason: "data offset below 20 bytes",
        });
    }
    reader.skip(header_len - reader.position())?;

    Ok(TransportSegment {
        protocol: TransportProtocol::Tcp,
        src_port,
        dst_port,
        tcp_flags: (offset_flags & 0x00ff) as u8,
        payload: reader.rest(),
    })
}
