use super::error::PacketError;
use super::reader::PacketReader;

const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_IPV6: u16 = 0x86dd;
const ETHERTYPE_VLAN: u16 = 0x8100;
const ETHERTYPE_QINQ: u16 = 0x88a8;
const ETHERTYPE_QINQ_OLD: u16 = 0x9100;

/// Link-layer framing reported by the capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    LinuxSll,
    Null,
    Raw,
}

impl LinkType {
    /// Maps a libpcap DLT / LINKTYPE value.
    pub fn from_dlt(dlt: i32) -> Result<Self, PacketError> {
        match dlt {
            1 => Ok(LinkType::Ethernet),
            113 => Ok(LinkType::LinuxSll),
            0 | 108 => Ok(LinkType::Null),
            12 | 14 | 101 | 228 | 229 => Ok(LinkType::Raw),
            other => Err(PacketError::UnsupportedLinkType(other)),
        }
    }

    /// Strips the link header and returns the IP packet it carries.
    pub fn strip<'a>(&self, frame: &'a [u8]) -> Result<&'a [u8], PacketError> {
        match self {
            LinkType::Ethernet => strip_ethernet(frame),
            LinkType::LinuxSll => strip_linux_sll(frame),
            LinkType::Null => {
                let mut reader = PacketReader::new(frame, "loopback header");
                reader.skip(4)?;
                Ok(reader.rest())
            }
            LinkType::Raw => Ok(frame),
        }
    }
}

fn strip_ethernet(frame: &[u8]) -> Result<&[u8], PacketError> {
    let mut reader = PacketReader::new(frame, "ethernet header");
    reader.skip(12)?;
    let mut ethertype = reader.read_u16()?;

    // Stacked 802.1Q / 802.1ad tags.
    while matches!(ethertype, ETHERTYPE_VLAN | ETHERTYPE_QINQ | ETHERTYPE_QINQ_OLD) {
        reader.skip(2)?;
        ethertype = reader.read_u16()?;
    }

    ip_payload(ethertype, reader.rest())
}

fn strip_linux_sll(frame: &[u8]) -> Result<&[u8], PacketError> {
    let mut reader = PacketReader::new(frame, "linux cooked header");
    reader.skip(14)?;
    let protocol = reader.read_u16()?;
    ip_payload(protocol, reader.rest())
}

fn ip_payload(ethertype: u16, rest: &[u8]) -> Result<&[u8], PacketError> {
    match ethertype {
        ETHERTYPE_IPV4 | ETHERTYPE_IPV6 => Ok(rest),
        other => Err(PacketError::NotIp(other)),
    }
}
