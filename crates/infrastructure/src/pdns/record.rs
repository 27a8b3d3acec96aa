use super::asset::PdnsAsset;
use compact_str::CompactString;
use ferrous_pdns_domain::{
    AddressFamily, DnsClass, EntryKind, ErrorCode, PdnsEntry, RecordType, Timestamp,
};
use std::collections::VecDeque;
use std::net::IpAddr;

/// Error observation held back by the record's print window, printed when
/// the record is flushed.
#[derive(Debug, Clone)]
pub struct PendingError {
    pub error: ErrorCode,
    pub class: DnsClass,
    pub query_type: CompactString,
    pub client: IpAddr,
    pub server: IpAddr,
    pub timestamp: Timestamp,
}

impl PendingError {
    pub fn to_entry(&self, query: &str) -> PdnsEntry {
        PdnsEntry {
            timestamp: self.timestamp,
            client: self.client,
            server: self.server,
            class: self.class.to_string(),
            query: query.to_string(),
            record_type: self.query_type.to_string(),
            answer: self.error.mnemonic().to_string(),
            ttl: 0,
            count: 1,
            kind: EntryKind::Error,
        }
    }

    /// Heap bytes beyond the inline slot in the owning record.
    pub(crate) fn footprint(&self) -> usize {
        self.query_type.len()
    }
}

/// Everything observed for one question name.
#[derive(Debug, Clone)]
pub struct PdnsRecord {
    pub name: CompactString,
    pub first_seen: Timestamp,
    pub last_seen: Timestamp,
    /// Last error line printed for this name.
    pub last_printed: Option<Timestamp>,
    pub client: IpAddr,
    pub server: IpAddr,
    pub family: AddressFamily,
    /// Newest first.
    pub assets: VecDeque<PdnsAsset>,
    pub pending_error: Option<PendingError>,
}

impl PdnsRecord {
    pub(crate) fn new(name: CompactString, client: IpAddr, server: IpAddr, now: Timestamp) -> Self {
        Self {
            name,
            first_seen: now,
            last_seen: now,
            last_printed: None,
            client,
            server,
            family: AddressFamily::of(&client),
            assets: VecDeque::new(),
            pending_error: None,
        }
    }

    pub(crate) fn touch(&mut self, client: IpAddr, server: IpAddr, now: Timestamp) {
        self.last_seen = self.last_seen.max(now);
        self.client = client;
        self.server = server;
        self.family = AddressFamily::of(&client);
    }

    pub fn asset(&self, record_type: RecordType, answer: &str) -> Option<&PdnsAsset> {
        self.assets.iter().find(|a| a.matches(record_type, answer))
    }

    pub(crate) fn error_window_open(&self, now: Timestamp, print_interval_secs: u64) -> bool {
        match self.last_printed {
            Some(printed) => now.secs_since(printed) >= print_interval_secs,
            None => true,
        }
    }

    /// Record, pending error and asset bytes held in memory.
    pub(crate) fn footprint(&self) -> usize {
        self.own_footprint()
            + self.pending_error_footprint()
            + self.assets.iter().map(PdnsAsset::footprint).sum::<usize>()
    }

    pub(crate) fn pending_error_footprint(&self) -> usize {
        self.pending_error.as_ref().map_or(0, PendingError::footprint)
    }

    pub(crate) fn own_footprint(&self) -> usize {
        std::mem::size_of::<Self>() + self.name.len()
    }
}
