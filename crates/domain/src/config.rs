pub mod cache;
pub mod capture;
pub mod daemon;
pub mod defrag;
pub mod errors;
pub mod flow;
pub mod logging;
pub mod maintenance;
pub mod output;
pub mod root;

pub use cache::CacheConfig;
pub use capture::CaptureConfig;
pub use daemon::DaemonConfig;
pub use defrag::DefragConfig;
pub use errors::ConfigError;
pub use flow::FlowConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use maintenance::MaintenanceConfig;
pub use output::{OutputConfig, OutputFormat};
pub use root::{CliOverrides, Config};
