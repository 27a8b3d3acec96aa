use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::capture::CaptureConfig;
use super::daemon::DaemonConfig;
use super::defrag::DefragConfig;
use super::errors::ConfigError;
use super::flow::FlowConfig;
use super::logging::LoggingConfig;
use super::maintenance::MaintenanceConfig;
use super::output::{OutputConfig, OutputFormat};

const LOCAL_CONFIG_PATH: &str = "ferrous-pdns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ferrous-pdns/config.toml";

/// Main configuration structure for Ferrous PDNS
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Packet source (interface or capture file, BPF filter)
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Passive-DNS cache retention and print dedup
    #[serde(default)]
    pub cache: CacheConfig,

    /// Connection tracking timeouts and inspection ceilings
    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub defrag: DefragConfig,

    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Where observation lines are written
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-pdns.toml in current directory
    /// 3. /etc/ferrous-pdns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(interface) = overrides.interface {
            self.capture.interface = Some(interface);
            self.capture.pcap_file = None;
        }
        if let Some(file) = overrides.pcap_file {
            self.capture.pcap_file = Some(file);
            self.capture.interface = None;
        }
        if let Some(bpf) = overrides.bpf {
            self.capture.bpf = bpf;
        }
        if let Some(path) = overrides.log_file {
            self.output.log_file = path;
        }
        if let Some(path) = overrides.error_log_file {
            self.output.error_log_file = Some(path);
        }
        if overrides.json {
            self.output.format = OutputFormat::Json;
        }
        if let Some(mb) = overrides.memory_limit_mb {
            self.cache.memory_limit_mb = mb;
        }
        if let Some(secs) = overrides.cache_timeout_secs {
            self.cache.timeout_secs = secs;
        }
        if let Some(secs) = overrides.print_interval_secs {
            self.cache.print_interval_secs = secs;
        }
        if let Some(flags) = overrides.record_types {
            self.cache.record_types = flags;
        }
        if let Some(flags) = overrides.error_codes {
            self.cache.error_codes = flags;
        }
        if overrides.daemon {
            self.daemon.enabled = true;
        }
        if let Some(pid_file) = overrides.pid_file {
            self.daemon.pid_file = Some(pid_file);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture.interface.is_some() && self.capture.pcap_file.is_some() {
            return Err(ConfigError::Validation(
                "Capture interface and capture file are mutually exclusive".to_string(),
            ));
        }

        if self.capture.snaplen <= 0 {
            return Err(ConfigError::Validation(
                "Capture snaplen must be positive".to_string(),
            ));
        }

        if self.capture.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "Capture channel capacity cannot be 0".to_string(),
            ));
        }

        if self.maintenance.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Maintenance interval cannot be 0".to_string(),
            ));
        }

        if self.cache.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Cache timeout cannot be 0".to_string(),
            ));
        }

        self.cache.record_type_filter()?;
        self.cache.error_code_filter()?;

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub interface: Option<String>,
    pub pcap_file: Option<String>,
    pub bpf: Option<String>,
    pub log_file: Option<String>,
    pub error_log_file: Option<String>,
    pub json: bool,
    pub memory_limit_mb: Option<u64>,
    pub cache_timeout_secs: Option<u64>,
    pub print_interval_secs: Option<u64>,
    pub record_types: Option<String>,
    pub error_codes: Option<String>,
    pub daemon: bool,
    pub pid_file: Option<String>,
    pub log_level: Option<String>,
}
