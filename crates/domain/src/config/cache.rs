use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use crate::dns_record::{ErrorCodeFilter, RecordTypeFilter};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Seconds an observation stays in memory after it was last seen.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum seconds between two printed lines for the same observation.
    #[serde(default = "default_print_interval_secs")]
    pub print_interval_secs: u64,

    /// Soft memory ceiling in megabytes; the expiration sweep tightens its
    /// cutoff until usage is back under it.
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: u64,

    #[serde(default = "default_record_types")]
    pub record_types: String,

    #[serde(default)]
    pub error_codes: String,

    #[serde(default = "default_true")]
    pub cname_chase: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            print_interval_secs: default_print_interval_secs(),
            memory_limit_mb: default_memory_limit_mb(),
            record_types: default_record_types(),
            error_codes: String::new(),
            cname_chase: true,
        }
    }
}

impl CacheConfig {
    pub fn record_type_filter(&self) -> Result<RecordTypeFilter, ConfigError> {
        RecordTypeFilter::from_flags(&self.record_types)
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn error_code_filter(&self) -> Result<ErrorCodeFilter, ConfigError> {
        ErrorCodeFilter::from_flags(&self.error_codes)
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn memory_limit_bytes(&self) -> usize {
        (self.memory_limit_mb as usize).saturating_mul(1024 * 1024)
    }
}

fn default_timeout_secs() -> u64 {
    43_200
}

fn default_print_interval_secs() -> u64 {
    86_400
}

fn default_memory_limit_mb() -> u64 {
    256
}

fn default_record_types() -> String {
    "46CDNPRS".to_string()
}

fn default_true() -> bool {
    true
}
