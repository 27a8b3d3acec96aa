use super::connection::{Flow, FlowExpiry, InspectLimits};
use super::key::{Endpoint, FlowKey, Role};
use ferrous_pdns_domain::config::FlowConfig;
use ferrous_pdns_domain::{Timestamp, TransportProtocol};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, trace};

/// Idle timeouts in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimeouts {
    pub tcp: u64,
    pub udp: u64,
    pub icmp: u64,
    pub other: u64,
    pub tcp_close_grace: u64,
}

impl From<&FlowConfig> for FlowTimeouts {
    fn from(config: &FlowConfig) -> Self {
        Self {
            tcp: config.tcp_timeout_secs,
            udp: config.udp_timeout_secs,
            icmp: config.icmp_timeout_secs,
            other: config.other_timeout_secs,
            tcp_close_grace: config.tcp_close_grace_secs,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowStats {
    pub created: u64,
    pub expired_idle: u64,
    pub closed: u64,
}

pub struct FlowTable {
    flows: FxHashMap<FlowKey, Flow>,
    next_id: u64,
    timeouts: FlowTimeouts,
    limits: InspectLimits,
    stats: FlowStats,
}

impl FlowTable {
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            flows: FxHashMap::default(),
            next_id: 1,
            timeouts: FlowTimeouts::from(config),
            limits: InspectLimits {
                max_packets: config.max_inspect_packets,
                max_bytes: config.max_inspect_bytes,
            },
            stats: FlowStats::default(),
        }
    }

    /// Finds or creates the flow for a packet and charges the packet to the
    /// side it came from.
    pub fn classify(
        &mut self,
        src: Endpoint,
        dst: Endpoint,
        protocol: TransportProtocol,
        bytes: usize,
        tcp_flags: u8,
        now: Timestamp,
    ) -> (Role, &mut Flow) {
        let key = FlowKey::new(src, dst, protocol);
        let (role, flow) = match self.flows.entry(key) {
            Entry::Occupied(entry) => {
                let flow = entry.into_mut();
                let role = if flow.client == src {
                    Role::Client
                } else {
                    Role::Server
                };
                (role, flow)
            }
            Entry::Vacant(entry) => {
                let id = self.next_id;
                self.next_id += 1;
                self.stats.created += 1;
                trace!(id, client = %src, server = %dst, %protocol, "New flow");
                let flow = entry.insert(Flow::new(id, protocol, src, dst, self.limits, now));
                (Role::Client, flow)
            }
        };
        flow.update(role, bytes, tcp_flags, now);
        (role, flow)
    }

    /// Removes flows past their protocol timeout, and TCP flows that closed
    /// more than the grace period ago.
    pub fn age(&mut self, now: Timestamp) -> usize {
        let timeouts = self.timeouts;
        let mut idle = 0u64;
        let mut closed = 0u64;
        self.flows.retain(|_, flow| match flow.expiry(now, &timeouts) {
            Some(FlowExpiry::Idle) => {
                idle += 1;
                false
            }
            Some(FlowExpiry::Closed) => {
                closed += 1;
                false
            }
            None => true,
        });
        self.stats.expired_idle += idle;
        self.stats.closed += closed;

        let removed = (idle + closed) as usize;
        if removed > 0 {
            debug!(idle, closed, remaining = self.flows.len(), "Aged flows");
        }
        removed
    }

    pub fn get(&self, key: &FlowKey) -> Option<&Flow> {
        self.flows.get(key)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn stats(&self) -> &FlowStats {
        &self.stats
    }
}
