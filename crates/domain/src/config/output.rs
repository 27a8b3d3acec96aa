use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `ts||client||server||CLASS||query||TYPE||answer||ttl||count`
    #[default]
    Pipe,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Answer log path; `-` writes to stdout.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Error-code (NXDOMAIN, SERVFAIL, ...) log path. Errors share the
    /// answer log when unset.
    #[serde(default)]
    pub error_log_file: Option<String>,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            error_log_file: None,
            format: OutputFormat::Pipe,
        }
    }
}

fn default_log_file() -> String {
    "-".to_string()
}
