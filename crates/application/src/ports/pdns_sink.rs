use ferrous_pdns_domain::{DomainError, PdnsEntry};

/// Destination for printed passive-DNS observations.
///
/// Sinks are driven from the single packet-processing task, so they take
/// `&mut self` and need no internal locking.
pub trait PdnsSink: Send {
    fn emit(&mut self, entry: &PdnsEntry) -> Result<(), DomainError>;

    fn flush(&mut self) -> Result<(), DomainError>;
}
