use super::event::{CapturedPacket, PipelineEvent};
use super::stats::PipelineStats;
use crate::defrag::{DefragTable, FragmentInput, FragmentKey, FragmentOutcome};
use crate::dns::DnsDecoder;
use crate::flow::{Endpoint, FlowTable, Role};
use crate::output::PdnsOutput;
use crate::packet::{IpDatagram, LinkType, PacketContext, TransportSegment};
use crate::pdns::{PdnsCache, PdnsCacheConfig};
use ferrous_pdns_domain::config::ConfigError;
use ferrous_pdns_domain::{Config, Timestamp, TransportProtocol};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Which clock drives expiration during maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceClock {
    /// Timestamp of the last captured packet. Replaying a file expires
    /// entries exactly as a live run would have.
    CaptureTime,
    /// The later of wall-clock time and the last packet, so an idle live
    /// link still ages its tables.
    WallClock,
}

/// Owns every table and runs packets through them one at a time.
pub struct Pipeline {
    link: LinkType,
    defrag: DefragTable,
    flows: FlowTable,
    cache: PdnsCache,
    stats: PipelineStats,
    clock: MaintenanceClock,
    last_packet: Timestamp,
    maintenance_due: bool,
}

impl Pipeline {
    pub fn new(link: LinkType, config: &Config, output: PdnsOutput) -> Result<Self, ConfigError> {
        let cache_config = PdnsCacheConfig::from_config(&config.cache)?;
        Ok(Self::from_parts(
            link,
            DefragTable::new(&config.defrag),
            FlowTable::new(&config.flow),
            PdnsCache::new(cache_config, output),
        ))
    }

    pub fn from_parts(
        link: LinkType,
        defrag: DefragTable,
        flows: FlowTable,
        cache: PdnsCache,
    ) -> Self {
        Self {
            link,
            defrag,
            flows,
            cache,
            stats: PipelineStats::default(),
            clock: MaintenanceClock::CaptureTime,
            last_packet: Timestamp::ZERO,
            maintenance_due: false,
        }
    }

    pub fn with_clock(mut self, clock: MaintenanceClock) -> Self {
        self.clock = clock;
        self
    }

    /// Processes one event to completion, then runs maintenance if it was
    /// requested in the meantime.
    pub fn handle(&mut self, event: PipelineEvent) -> LoopControl {
        let control = match event {
            PipelineEvent::Packet(packet) => {
                self.process_packet(&packet);
                LoopControl::Continue
            }
            PipelineEvent::Maintenance => {
                self.maintenance_due = true;
                LoopControl::Continue
            }
            PipelineEvent::CaptureFinished => {
                info!(packets = self.stats.packets, "Capture finished");
                LoopControl::Stop
            }
        };

        if self.maintenance_due {
            self.run_maintenance();
        }
        control
    }

    pub fn process_packet(&mut self, packet: &CapturedPacket) {
        self.stats.packets += 1;
        self.stats.bytes += u64::from(packet.wire_len);
        if packet.timestamp > self.last_packet {
            self.last_packet = packet.timestamp;
        }

        match self.link.strip(&packet.data) {
            Ok(ip) => self.dispatch_ip(ip, packet.timestamp),
            Err(e) => {
                self.stats.link_errors += 1;
                debug!(error = %e, "Dropping frame");
            }
        }
    }

    fn dispatch_ip(&mut self, data: &[u8], timestamp: Timestamp) {
        let datagram = match IpDatagram::parse(data) {
            Ok(datagram) => datagram,
            Err(e) => {
                self.stats.ip_errors += 1;
                debug!(error = %e, "Dropping IP packet");
                return;
            }
        };

        if let Some(fragment) = datagram.fragment {
            self.stats.fragments += 1;
            let header = datagram.reassembly_header();
            let input = FragmentInput {
                key: FragmentKey {
                    src: datagram.src,
                    dst: datagram.dst,
                    id: fragment.id,
                },
                flag: fragment.flag(),
                offset: fragment.offset,
                header: &header,
                payload: datagram.payload,
            };

            if let FragmentOutcome::Reassembled(reassembled) =
                self.defrag.process_fragment(input, timestamp)
            {
                match reassembled.into_packet() {
                    Ok(whole) => {
                        self.stats.reassembled += 1;
                        trace!(len = whole.len(), "Dispatching reassembled datagram");
                        self.dispatch_ip(&whole, timestamp);
                    }
                    Err(e) => {
                        self.stats.ip_errors += 1;
                        debug!(error = %e, "Reassembled datagram rejected");
                    }
                }
            }
            return;
        }

        let protocol = TransportProtocol::from_ip_proto(datagram.protocol);
        let segment = match TransportSegment::parse(protocol, datagram.payload) {
            Ok(segment) => segment,
            Err(e) => {
                self.stats.transport_errors += 1;
                debug!(error = %e, src = %datagram.src, dst = %datagram.dst, "Dropping segment");
                return;
            }
        };

        let context = PacketContext::new(timestamp, &datagram, &segment);
        self.inspect(&context);
    }

    fn inspect(&mut self, packet: &PacketContext<'_>) {
        let (role, flow) = self.flows.classify(
            Endpoint::new(packet.src, packet.src_port),
            Endpoint::new(packet.dst, packet.dst_port),
            packet.protocol,
            packet.ip_len,
            packet.tcp_flags,
            packet.timestamp,
        );

        if !packet.carries_dns || packet.payload.is_empty() {
            self.stats.not_inspected += 1;
            return;
        }
        if !flow.inspectable(role) {
            self.stats.inspect_skipped += 1;
            return;
        }

        let message = match DnsDecoder::decode(packet.payload) {
            Ok(message) => message,
            Err(e) => {
                self.stats.malformed_dns += 1;
                debug!(error = %e, src = %packet.src, dst = %packet.dst, "Undecodable DNS payload");
                return;
            }
        };

        if !message.is_response {
            self.stats.queries += 1;
            if role == Role::Client {
                flow.record_query(message.id);
            }
            return;
        }

        self.stats.responses += 1;
        if message.truncated {
            self.stats.truncated_dropped += 1;
            debug!(id = message.id, flow = flow.id, "Truncated response dropped");
            return;
        }
        if role != Role::Server || !flow.take_query(message.id) {
            self.stats.unmatched_responses += 1;
            debug!(
                id = message.id,
                flow = flow.id,
                role = ?role,
                "Response without matching query dropped"
            );
            return;
        }

        let client = flow.client.addr;
        let server = flow.server.addr;
        self.cache
            .record_response(&message, client, server, packet.timestamp);
    }

    fn maintenance_now(&self) -> Timestamp {
        match self.clock {
            MaintenanceClock::CaptureTime => self.last_packet,
            MaintenanceClock::WallClock => self.last_packet.max(Timestamp::now()),
        }
    }

    /// Ages flows, expires fragment streams and cache entries, then flushes output.
    pub fn run_maintenance(&mut self) {
        self.maintenance_due = false;
        self.stats.maintenance_runs += 1;

        let now = self.maintenance_now();
        let flows_aged = self.flows.age(now);
        let streams_expired = self.defrag.expire(now);
        let report = self.cache.expire(now);

        if let Err(e) = self.cache.flush() {
            warn!(error = %e, "Failed to flush output");
        }

        info!(
            now = %now,
            packets = self.stats.packets,
            queries = self.stats.queries,
            responses = self.stats.responses,
            malformed = self.stats.malformed_dns,
            unmatched = self.stats.unmatched_responses,
            flows = self.flows.len(),
            flows_aged,
            fragment_streams = self.defrag.len(),
            streams_expired,
            records = self.cache.len(),
            records_expired = report.records_removed,
            memory_bytes = self.cache.memory_bytes(),
            "Maintenance complete"
        );
    }

    /// Flushes everything still cached and returns the final statistics.
    pub fn shutdown(&mut self) -> PipelineStats {
        let report = self.cache.expire_all();
        if let Err(e) = self.cache.flush() {
            warn!(error = %e, "Failed to flush output on shutdown");
        }

        let metrics = self.cache.metrics();
        info!(
            packets = self.stats.packets,
            bytes = self.stats.bytes,
            link_errors = self.stats.link_errors,
            ip_errors = self.stats.ip_errors,
            fragments = self.stats.fragments,
            reassembled = self.stats.reassembled,
            queries = self.stats.queries,
            responses = self.stats.responses,
            malformed = self.stats.malformed_dns,
            truncated = self.stats.truncated_dropped,
            unmatched = self.stats.unmatched_responses,
            lines_printed = metrics.lines_printed,
            errors_printed = metrics.errors_printed,
            lines_flushed = report.lines_flushed,
            "Pipeline stopped"
        );
        self.stats.clone()
    }

    pub fn maintenance_due(&self) -> bool {
        self.maintenance_due
    }

    pub fn last_packet(&self) -> Timestamp {
        self.last_packet
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn flows(&self) -> &FlowTable {
        &self.flows
    }

    pub fn defrag(&self) -> &DefragTable {
        &self.defrag
    }

    pub fn cache(&self) -> &PdnsCache {
        &self.cache
    }
}
