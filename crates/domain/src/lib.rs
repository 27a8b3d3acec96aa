//! Ferrous PDNS Domain Layer
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod network;
pub mod pdns_entry;
pub mod timestamp;

pub use config::{CliOverrides, Config};
pub use dns_record::{DnsClass, ErrorCode, ErrorCodeFilter, RecordType, RecordTypeFilter};
pub use errors::DomainError;
pub use network::{AddressFamily, TransportProtocol};
pub use pdns_entry::{EntryKind, PdnsEntry};
pub use timestamp::Timestamp;
