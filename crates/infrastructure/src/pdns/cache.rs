use super::asset::{AssetUpdate, PdnsAsset};
use super::metrics::CacheMetrics;
use super::observation::{AnswerObservation, ErrorObservation};
use super::record::{PdnsRecord, PendingError};
use crate::dns::DecodedMessage;
use crate::output::PdnsOutput;
use compact_str::CompactString;
use ferrous_pdns_domain::config::{CacheConfig, ConfigError};
use ferrous_pdns_domain::{
    DomainError, ErrorCodeFilter, PdnsEntry, RecordType, RecordTypeFilter, Timestamp,
};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// How far each memory-pressure pass moves the cutoff past the oldest record.
pub const MEMORY_STEP_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct PdnsCacheConfig {
    pub timeout_secs: u64,
    pub print_interval_secs: u64,
    pub memory_limit_bytes: usize,
    pub record_types: RecordTypeFilter,
    pub error_codes: ErrorCodeFilter,
    pub cname_chase: bool,
}

impl PdnsCacheConfig {
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            timeout_secs: config.timeout_secs,
            print_interval_secs: config.print_interval_secs,
            memory_limit_bytes: config.memory_limit_bytes(),
            record_types: config.record_type_filter()?,
            error_codes: config.error_code_filter()?,
            cname_chase: config.cname_chase,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorUpdate {
    /// The rcode is not selected for logging.
    Filtered,
    Printed,
    /// Held until the record's print window reopens or the record is flushed.
    Suppressed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpireReport {
    pub records_removed: usize,
    pub assets_removed: usize,
    pub lines_flushed: usize,
    pub passes: usize,
    pub cutoff_secs: u64,
}

/// Passive-DNS store: question name to the answers observed for it.
pub struct PdnsCache {
    records: FxHashMap<CompactString, PdnsRecord>,
    config: PdnsCacheConfig,
    output: PdnsOutput,
    metrics: CacheMetrics,
    memory_bytes: usize,
}

impl PdnsCache {
    pub fn new(config: PdnsCacheConfig, output: PdnsOutput) -> Self {
        info!(
            timeout_secs = config.timeout_secs,
            print_interval_secs = config.print_interval_secs,
            memory_limit_bytes = config.memory_limit_bytes,
            record_types = %config.record_types.flags(),
            error_codes = %config.error_codes.flags(),
            cname_chase = config.cname_chase,
            "Passive DNS cache initialized"
        );

        Self {
            records: FxHashMap::default(),
            config,
            output,
            metrics: CacheMetrics::default(),
            memory_bytes: 0,
        }
    }

    /// Caches every answer of a response, or its error code when the rcode
    /// is non-zero. Returns the number of answers that were cached.
    pub fn record_response(
        &mut self,
        message: &DecodedMessage,
        client: IpAddr,
        server: IpAddr,
        timestamp: Timestamp,
    ) -> usize {
        let Some(question) = &message.question else {
            debug!(id = message.id, "Response without question, skipped");
            return 0;
        };

        if message.rcode != 0 {
            self.record_error(&ErrorObservation {
                query: &question.name,
                class: question.qclass,
                query_type: &question.type_name,
                rcode: message.rcode,
                client,
                server,
                timestamp,
            });
            return 0;
        }

        let mut current = question.name.clone();
        let mut cached = 0;

        for answer in &message.answers {
            let Some(record_type) = answer.record_type() else {
                self.metrics.answers_filtered += 1;
                continue;
            };

            let update = self.record_answer(&AnswerObservation {
                query: &current,
                class: answer.class,
                record_type,
                ttl: answer.ttl,
                answer: &answer.rdata,
                client,
                server,
                timestamp,
            });
            if update.is_some() {
                cached += 1;
            }

            // Later answers in this message belong to the alias target.
            if record_type == RecordType::CNAME && self.config.cname_chase {
                current = CompactString::from(answer.rdata.as_str());
            }
        }

        cached
    }

    /// Returns `None` when the record type is not selected.
    pub fn record_answer(&mut self, observation: &AnswerObservation<'_>) -> Option<AssetUpdate> {
        if !self.config.record_types.contains(observation.record_type) {
            self.metrics.answers_filtered += 1;
            return None;
        }

        let print_interval = self.config.print_interval_secs;
        let record = upsert_record(
            &mut self.records,
            &mut self.metrics,
            &mut self.memory_bytes,
            observation.query,
            observation.client,
            observation.server,
            observation.timestamp,
        );

        let existing = record
            .assets
            .iter_mut()
            .find(|asset| asset.matches(observation.record_type, observation.answer));

        let update = match existing {
            Some(asset) => {
                self.metrics.asset_updates += 1;
                let update = asset.observe(observation, print_interval);
                if update == AssetUpdate::Reprinted {
                    emit(&mut self.output, &mut self.metrics, &asset.to_entry(&record.name));
                    asset.mark_printed();
                }
                update
            }
            None => {
                let asset = PdnsAsset::new(observation);
                self.metrics.assets_created += 1;
                self.memory_bytes += asset.footprint();
                emit(&mut self.output, &mut self.metrics, &asset.to_entry(&record.name));
                record.assets.push_front(asset);
                AssetUpdate::Inserted
            }
        };

        Some(update)
    }

    pub fn record_error(&mut self, observation: &ErrorObservation<'_>) -> ErrorUpdate {
        let Some(error) = self.config.error_codes.matches(observation.rcode) else {
            return ErrorUpdate::Filtered;
        };

        let print_interval = self.config.print_interval_secs;
        let record = upsert_record(
            &mut self.records,
            &mut self.metrics,
            &mut self.memory_bytes,
            observation.query,
            observation.client,
            observation.server,
            observation.timestamp,
        );

        let pending = PendingError {
            error,
            class: observation.class,
            query_type: CompactString::from(observation.query_type),
            client: observation.client,
            server: observation.server,
            timestamp: observation.timestamp,
        };

        self.memory_bytes = self.memory_bytes.saturating_sub(record.pending_error_footprint());
        if record.error_window_open(observation.timestamp, print_interval) {
            emit(&mut self.output, &mut self.metrics, &pending.to_entry(&record.name));
            record.last_printed = Some(observation.timestamp);
            record.pending_error = None;
            ErrorUpdate::Printed
        } else {
            self.metrics.errors_suppressed += 1;
            self.memory_bytes += pending.footprint();
            record.pending_error = Some(pending);
            ErrorUpdate::Suppressed
        }
    }

    /// Removes everything not seen within the cache timeout, then keeps
    /// tightening the cutoff while memory stays above the limit.
    pub fn expire(&mut self, now: Timestamp) -> ExpireReport {
        let mut report = ExpireReport::default();
        let mut cutoff = now.secs().saturating_sub(self.config.timeout_secs);
        self.sweep(cutoff, &mut report);

        while self.memory_bytes > self.config.memory_limit_bytes {
            let Some(oldest) = self.records.values().map(|r| r.last_seen.secs()).min() else {
                break;
            };
            cutoff = cutoff.max(oldest + MEMORY_STEP_SECS);
            self.metrics.memory_sweeps += 1;
            debug!(
                memory_bytes = self.memory_bytes,
                limit = self.config.memory_limit_bytes,
                cutoff,
                "Memory above limit, tightening expiration cutoff"
            );
            self.sweep(cutoff, &mut report);
        }

        report.cutoff_secs = cutoff;
        if report.records_removed > 0 || report.assets_removed > 0 {
            info!(
                records_removed = report.records_removed,
                assets_removed = report.assets_removed,
                lines_flushed = report.lines_flushed,
                passes = report.passes,
                remaining = self.records.len(),
                memory_bytes = self.memory_bytes,
                "Passive DNS cache expired"
            );
        }
        report
    }

    /// Prints whatever is still pending and empties the cache.
    pub fn expire_all(&mut self) -> ExpireReport {
        let mut report = ExpireReport {
            passes: 1,
            ..ExpireReport::default()
        };

        for (_, record) in std::mem::take(&mut self.records) {
            report.lines_flushed += flush_record(&record, &mut self.output, &mut self.metrics);
            report.records_removed += 1;
            report.assets_removed += record.assets.len();
        }
        self.metrics.records_expired += report.records_removed as u64;
        self.metrics.assets_expired += report.assets_removed as u64;
        self.memory_bytes = 0;

        info!(
            records = report.records_removed,
            assets = report.assets_removed,
            lines_flushed = report.lines_flushed,
            "Passive DNS cache flushed"
        );
        report
    }

    pub fn flush(&mut self) -> Result<(), DomainError> {
        self.output.flush()
    }

    pub fn record(&self, name: &str) -> Option<&PdnsRecord> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.records.values().map(|r| r.assets.len()).sum()
    }

    pub fn memory_bytes(&self) -> usize {
        self.memory_bytes
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &PdnsCacheConfig {
        &self.config
    }

    fn sweep(&mut self, cutoff: u64, report: &mut ExpireReport) {
        let Self {
            records,
            output,
            metrics,
            memory_bytes,
            ..
        } = self;

        records.retain(|_, record| {
            if record.last_seen.secs() <= cutoff {
                *memory_bytes = memory_bytes.saturating_sub(record.footprint());
                report.lines_flushed += flush_record(record, output, metrics);
                report.records_removed += 1;
                report.assets_removed += record.assets.len();
                metrics.records_expired += 1;
                metrics.assets_expired += record.assets.len() as u64;
                return false;
            }

            let name = &record.name;
            record.assets.retain(|asset| {
                if asset.last_seen.secs() > cutoff {
                    return true;
                }
                if asset.is_pending() {
                    emit(output, metrics, &asset.to_entry(name));
                    report.lines_flushed += 1;
                }
                *memory_bytes = memory_bytes.saturating_sub(asset.footprint());
                report.assets_removed += 1;
                metrics.assets_expired += 1;
                false
            });
            true
        });

        report.passes += 1;
    }
}

fn upsert_record<'a>(
    records: &'a mut FxHashMap<CompactString, PdnsRecord>,
    metrics: &mut CacheMetrics,
    memory_bytes: &mut usize,
    query: &str,
    client: IpAddr,
    server: IpAddr,
    timestamp: Timestamp,
) -> &'a mut PdnsRecord {
    match records.entry(CompactString::from(query)) {
        Entry::Occupied(entry) => {
            let record = entry.into_mut();
            record.touch(client, server, timestamp);
            record
        }
        Entry::Vacant(entry) => {
            let record = PdnsRecord::new(entry.key().clone(), client, server, timestamp);
            metrics.records_created += 1;
            *memory_bytes += record.own_footprint();
            entry.insert(record)
        }
    }
}

/// Prints the record's pending assets and pending error. Returns the number
/// of lines written.
fn flush_record(record: &PdnsRecord, output: &mut PdnsOutput, metrics: &mut CacheMetrics) -> usize {
    let mut lines = 0;
    for asset in record.assets.iter().filter(|asset| asset.is_pending()) {
        emit(output, metrics, &asset.to_entry(&record.name));
        lines += 1;
    }
    if let Some(pending) = &record.pending_error {
        emit(output, metrics, &pending.to_entry(&record.name));
        lines += 1;
    }
    lines
}

fn emit(output: &mut PdnsOutput, metrics: &mut CacheMetrics, entry: &PdnsEntry) {
    match output.emit(entry) {
        Ok(()) if entry.is_error() => metrics.errors_printed += 1,
        Ok(()) => metrics.lines_printed += 1,
        Err(e) => {
            metrics.sink_failures += 1;
            warn!(error = %e, query = %entry.query, "Failed to write passive DNS entry");
        }
    }
}
