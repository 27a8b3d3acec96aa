use super::stream::{FragmentKey, FragmentStream, StreamState};
use crate::packet::{rebuild_datagram, FragmentFlag, PacketError};
use ferrous_pdns_domain::config::DefragConfig;
use ferrous_pdns_domain::Timestamp;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// One fragment as handed over by IP dispatch.
#[derive(Debug, Clone)]
pub struct FragmentInput<'a> {
    pub key: FragmentKey,
    pub flag: FragmentFlag,
    /// Offset in 8-byte units, as carried in the IP header.
    pub offset: u16,
    /// Header to reuse for the rebuilt datagram; only kept from the first fragment.
    pub header: &'a [u8],
    pub payload: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassembledDatagram {
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
}

impl ReassembledDatagram {
    /// Serialises the datagram with fragmentation cleared so it can be
    /// dispatched again as a whole packet.
    pub fn into_packet(self) -> Result<Vec<u8>, PacketError> {
        rebuild_datagram(&self.header, &self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// Stored; the datagram is not complete yet.
    Pending,
    /// A fragment at this offset was already held; nothing changed.
    Duplicate,
    /// More bytes arrived than the datagram can hold; the stream was dropped.
    Abandoned,
    Reassembled(ReassembledDatagram),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefragStats {
    pub fragments: u64,
    pub streams_created: u64,
    pub duplicates: u64,
    pub reassembled: u64,
    pub abandoned: u64,
    pub expired: u64,
}

pub struct DefragTable {
    streams: FxHashMap<FragmentKey, FragmentStream>,
    stream_timeout_secs: u64,
    stats: DefragStats,
}

impl DefragTable {
    pub fn new(config: &DefragConfig) -> Self {
        Self {
            streams: FxHashMap::default(),
            stream_timeout_secs: config.stream_timeout_secs,
            stats: DefragStats::default(),
        }
    }

    pub fn process_fragment(&mut self, input: FragmentInput<'_>, now: Timestamp) -> FragmentOutcome {
        self.stats.fragments += 1;

        let created = !self.streams.contains_key(&input.key);
        let stream = self
            .streams
            .entry(input.key)
            .or_insert_with(|| FragmentStream::new(now));
        if created {
            self.stats.streams_created += 1;
        }

        if input.flag == FragmentFlag::First {
            stream.capture_header(input.header);
        }

        let offset = usize::from(input.offset) * 8;
        if !stream.insert(offset, input.payload, now) {
            self.stats.duplicates += 1;
            trace!(id = input.key.id, offset, "Duplicate fragment offset ignored");
            return FragmentOutcome::Duplicate;
        }

        if input.flag == FragmentFlag::Last {
            stream.set_expected(offset + input.payload.len());
        }

        trace!(
            id = input.key.id,
            offset,
            len = input.payload.len(),
            received = stream.received_bytes(),
            expected = ?stream.expected_len(),
            "Fragment stored"
        );

        match stream.state() {
            StreamState::Incomplete => FragmentOutcome::Pending,
            StreamState::Overflowed { received, expected } => {
                self.streams.remove(&input.key);
                self.stats.abandoned += 1;
                debug!(
                    src = %input.key.src,
                    dst = %input.key.dst,
                    id = input.key.id,
                    received,
                    expected,
                    "Fragment stream overflowed, abandoned"
                );
                FragmentOutcome::Abandoned
            }
            StreamState::Complete(expected) => {
                let Some(stream) = self.streams.remove(&input.key) else {
                    return FragmentOutcome::Pending;
                };
                match stream.assemble(expected) {
                    Some((header, payload)) => {
                        self.stats.reassembled += 1;
                        FragmentOutcome::Reassembled(ReassembledDatagram { header, payload })
                    }
                    None => FragmentOutcome::Pending,
                }
            }
        }
    }

    /// Drops streams that have not received a fragment within the stream timeout.
    pub fn expire(&mut self, now: Timestamp) -> usize {
        let timeout = self.stream_timeout_secs;
        let before = self.streams.len();
        self.streams.retain(|_, stream| !stream.is_idle(now, timeout));
        let removed = before - self.streams.len();
        self.stats.expired += removed as u64;
        if removed > 0 {
            debug!(removed, remaining = self.streams.len(), "Expired fragment streams");
        }
        removed
    }

    pub fn stream(&self, key: &FragmentKey) -> Option<&FragmentStream> {
        self.streams.get(key)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn stats(&self) -> &DefragStats {
        &self.stats
    }
}
