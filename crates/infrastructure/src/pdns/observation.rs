use ferrous_pdns_domain::{DnsClass, RecordType, Timestamp};
use std::net::IpAddr;

/// One answer resource record, already keyed under the name it is cached for.
#[derive(Debug, Clone, Copy)]
pub struct AnswerObservation<'a> {
    pub query: &'a str,
    pub class: DnsClass,
    pub record_type: RecordType,
    pub ttl: u32,
    pub answer: &'a str,
    pub client: IpAddr,
    pub server: IpAddr,
    pub timestamp: Timestamp,
}

/// A response that carried a non-zero rcode.
#[derive(Debug, Clone, Copy)]
pub struct ErrorObservation<'a> {
    pub query: &'a str,
    pub class: DnsClass,
    /// Mnemonic of the question type.
    pub query_type: &'a str,
    pub rcode: u16,
    pub client: IpAddr,
    pub server: IpAddr,
    pub timestamp: Timestamp,
}
