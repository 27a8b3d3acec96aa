use crate::timestamp::Timestamp;
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Answer,
    Error,
}

/// One printed observation line.
///
/// Error entries carry the rcode mnemonic in `answer`, a zero TTL and a count of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdnsEntry {
    pub timestamp: Timestamp,
    pub client: IpAddr,
    pub server: IpAddr,
    pub class: String,
    pub query: String,
    pub record_type: String,
    pub answer: String,
    pub ttl: u32,
    pub count: u64,
    pub kind: EntryKind,
}

impl PdnsEntry {
    pub fn is_error(&self) -> bool {
        self.kind == EntryKind::Error
    }
}

impl fmt::Display for PdnsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}||{}||{}||{}||{}||{}||{}||{}||{}",
            self.timestamp,
            self.client,
            self.server,
            self.class,
            self.query,
            self.record_type,
            self.answer,
            self.ttl,
            self.count
        )
    }
}
