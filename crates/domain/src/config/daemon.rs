use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DaemonConfig {
    /// Detach from the terminal before capture starts.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub pid_file: Option<String>,
}
