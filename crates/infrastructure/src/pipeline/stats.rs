#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub packets: u64,
    pub bytes: u64,
    pub link_errors: u64,
    pub ip_errors: u64,
    pub transport_errors: u64,
    pub fragments: u64,
    pub reassembled: u64,
    /// Packets without a DNS payload (ICMP, bare TCP segments, ...).
    pub not_inspected: u64,
    /// Directions past the flow inspection ceilings.
    pub inspect_skipped: u64,
    pub malformed_dns: u64,
    pub queries: u64,
    pub responses: u64,
    pub truncated_dropped: u64,
    pub unmatched_responses: u64,
    pub maintenance_runs: u64,
}
