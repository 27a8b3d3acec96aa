pub mod asset;
pub mod cache;
pub mod metrics;
pub mod observation;
pub mod record;

pub use asset::{AssetUpdate, PdnsAsset};
pub use cache::{ErrorUpdate, ExpireReport, PdnsCache, PdnsCacheConfig, MEMORY_STEP_SECS};
pub use metrics::CacheMetrics;
pub use observation::{AnswerObservation, ErrorObservation};
pub use record::{PdnsRecord, PendingError};
