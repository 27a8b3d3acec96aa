use super::key::{Endpoint, Role};
use crate::packet::TcpFlags;
use ferrous_pdns_domain::{Timestamp, TransportProtocol};
use smallvec::SmallVec;

const MAX_PENDING_QUERIES: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionStats {
    pub packets: u64,
    pub bytes: u64,
    /// Union of every TCP flag seen in this direction.
    pub tcp_flags: u8,
}

/// Per-direction ceilings past which DNS inspection stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectLimits {
    pub max_packets: u64,
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowExpiry {
    Idle,
    Closed,
}

#[derive(Debug, Clone)]
pub struct Flow {
    pub id: u64,
    pub protocol: TransportProtocol,
    pub client: Endpoint,
    pub server: Endpoint,
    pub created: Timestamp,
    pub last_seen: Timestamp,
    pub client_stats: DirectionStats,
    pub server_stats: DirectionStats,
    limits: InspectLimits,
    pending_queries: SmallVec<[u16; 4]>,
}

impl Flow {
    pub(crate) fn new(
        id: u64,
        protocol: TransportProtocol,
        client: Endpoint,
        server: Endpoint,
        limits: InspectLimits,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            protocol,
            client,
            server,
            created: now,
            last_seen: now,
            client_stats: DirectionStats::default(),
            server_stats: DirectionStats::default(),
            limits,
            pending_queries: SmallVec::new(),
        }
    }

    pub fn stats(&self, role: Role) -> &DirectionStats {
        match role {
            Role::Client => &self.client_stats,
            Role::Server => &self.server_stats,
        }
    }

    pub(crate) fn update(&mut self, role: Role, bytes: usize, tcp_flags: u8, now: Timestamp) {
        let stats = match role {
            Role::Client => &mut self.client_stats,
            Role::Server => &mut self.server_stats,
        };
        stats.packets += 1;
        stats.bytes += bytes as u64;
        stats.tcp_flags |= tcp_flags;
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    /// False once this direction has carried more packets or bytes than
    /// the inspection ceilings allow. The flow is still tracked and aged.
    pub fn inspectable(&self, role: Role) -> bool {
        let stats = self.stats(role);
        stats.packets <= self.limits.max_packets && stats.bytes <= self.limits.max_bytes
    }

    /// Remembers a query transaction id sent by the client.
    pub fn record_query(&mut self, id: u16) {
        if self.pending_queries.contains(&id) {
            return;
        }
        if self.pending_queries.len() >= MAX_PENDING_QUERIES {
            self.pending_queries.remove(0);
        }
        self.pending_queries.push(id);
    }

    /// Consumes an outstanding query id; false when no such query was seen.
    pub fn take_query(&mut self, id: u16) -> bool {
        match self.pending_queries.iter().position(|&pending| pending == id) {
            Some(index) => {
                self.pending_queries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn pending_queries(&self) -> &[u16] {
        &self.pending_queries
    }

    pub fn fin_both(&self) -> bool {
        self.client_stats.tcp_flags & TcpFlags::FIN != 0
            && self.server_stats.tcp_flags & TcpFlags::FIN != 0
    }

    pub fn reset_seen(&self) -> bool {
        (self.client_stats.tcp_flags | self.server_stats.tcp_flags) & TcpFlags::RST != 0
    }

    pub fn expiry(&self, now: Timestamp, timeouts: &super::FlowTimeouts) -> Option<FlowExpiry> {
        let idle = now.secs_since(self.last_seen);
        let timeout = match self.protocol {
            TransportProtocol::Tcp => {
                if (self.fin_both() || self.reset_seen()) && idle >= timeouts.tcp_close_grace {
                    return Some(FlowExpiry::Closed);
                }
                timeouts.tcp
            }
            TransportProtocol::Udp => timeouts.udp,
            TransportProtocol::Icmp | TransportProtocol::Icmpv6 => timeouts.icmp,
            TransportProtocol::Other(_) => timeouts.other,
        };
        (idle >= timeout).then_some(FlowExpiry::Idle)
    }
}
