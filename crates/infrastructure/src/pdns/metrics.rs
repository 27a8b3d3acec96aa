/// Counters owned by the cache. The cache lives on a single task, so these
/// are plain integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub records_created: u64,
    pub assets_created: u64,
    pub asset_updates: u64,
    pub answers_filtered: u64,
    pub lines_printed: u64,
    pub errors_printed: u64,
    pub errors_suppressed: u64,
    pub records_expired: u64,
    pub assets_expired: u64,
    pub memory_sweeps: u64,
    pub sink_failures: u64,
}
