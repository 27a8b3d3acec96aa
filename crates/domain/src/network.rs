use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Inet,
    Inet6,
}

impl AddressFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Inet,
            IpAddr::V6(_) => AddressFamily::Inet6,
        }
    }
}

/// Transport protocol carried by an IP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Icmp,
    Tcp,
    Udp,
    Icmpv6,
    Other(u8),
}

impl TransportProtocol {
    pub fn from_ip_proto(proto: u8) -> Self {
        match proto {
            1 => TransportProtocol::Icmp,
            6 => TransportProtocol::Tcp,
            17 => TransportProtocol::Udp,
            58 => TransportProtocol::Icmpv6,
            other => TransportProtocol::Other(other),
        }
    }

    pub fn ip_proto(&self) -> u8 {
        match self {
            TransportProtocol::Icmp => 1,
            TransportProtocol::Tcp => 6,
            TransportProtocol::Udp => 17,
            TransportProtocol::Icmpv6 => 58,
            TransportProtocol::Other(proto) => *proto,
        }
    }

    pub fn is_icmp(&self) -> bool {
        matches!(self, TransportProtocol::Icmp | TransportProtocol::Icmpv6)
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportProtocol::Icmp => f.write_str("icmp"),
            TransportProtocol::Tcp => f.write_str("tcp"),
            TransportProtocol::Udp => f.write_str("udp"),
            TransportProtocol::Icmpv6 => f.write_str("icmpv6"),
            TransportProtocol::Other(proto) => write!(f, "proto-{}", proto),
        }
    }
}
