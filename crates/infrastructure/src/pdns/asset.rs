use super::observation::AnswerObservation;
use compact_str::CompactString;
use ferrous_pdns_domain::{DnsClass, EntryKind, PdnsEntry, RecordType, Timestamp};
use std::net::IpAddr;

/// What observing an answer did to its asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetUpdate {
    /// First sighting; printed immediately.
    Inserted,
    /// Known answer seen again inside the print window.
    Suppressed,
    /// Known answer whose print window has elapsed; printed again.
    Reprinted,
}

/// One distinct `(type, answer)` pair observed for a record.
#[derive(Debug, Clone)]
pub struct PdnsAsset {
    pub record_type: RecordType,
    pub class: DnsClass,
    pub answer: CompactString,
    /// Highest TTL observed.
    pub ttl: u32,
    pub first_seen: Timestamp,
    pub last_seen: Timestamp,
    pub last_printed: Timestamp,
    pub client: IpAddr,
    pub server: IpAddr,
    /// Sightings since the last print.
    pub seen: u64,
}

impl PdnsAsset {
    pub(crate) fn new(observation: &AnswerObservation<'_>) -> Self {
        Self {
            record_type: observation.record_type,
            class: observation.class,
            answer: CompactString::from(observation.answer),
            ttl: observation.ttl,
            first_seen: observation.timestamp,
            last_seen: observation.timestamp,
            last_printed: observation.timestamp,
            client: observation.client,
            server: observation.server,
            seen: 1,
        }
    }

    pub fn matches(&self, record_type: RecordType, answer: &str) -> bool {
        self.record_type == record_type && self.answer == answer
    }

    pub(crate) fn observe(
        &mut self,
        observation: &AnswerObservation<'_>,
        print_interval_secs: u64,
    ) -> AssetUpdate {
        self.seen += 1;
        self.last_seen = self.last_seen.max(observation.timestamp);
        self.client = observation.client;
        self.server = observation.server;
        self.ttl = self.ttl.max(observation.ttl);

        if self.last_seen.secs_since(self.last_printed) >= print_interval_secs {
            AssetUpdate::Reprinted
        } else {
            AssetUpdate::Suppressed
        }
    }

    /// Updated since it was last printed.
    pub fn is_pending(&self) -> bool {
        self.last_seen > self.last_printed
    }

    pub(crate) fn mark_printed(&mut self) {
        self.last_printed = self.last_seen;
        self.seen = 0;
    }

    pub(crate) fn footprint(&self) -> usize {
        std::mem::size_of::<Self>() + self.answer.len()
    }

    pub fn to_entry(&self, query: &str) -> PdnsEntry {
        PdnsEntry {
            timestamp: self.last_seen,
            client: self.client,
            server: self.server,
            class: self.class.to_string(),
            query: query.to_string(),
            record_type: self.record_type.as_str().to_string(),
            answer: self.answer.to_string(),
            ttl: self.ttl,
            count: self.seen,
            kind: EntryKind::Answer,
        }
    }
}
