use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefragConfig {
    /// Seconds a partially reassembled datagram may wait for its next fragment.
    #[serde(default = "default_stream_timeout_secs")]
    pub stream_timeout_secs: u64,
}

impl Default for DefragConfig {
    fn default() -> Self {
        Self {
            stream_timeout_secs: default_stream_timeout_secs(),
        }
    }
}

fn default_stream_timeout_secs() -> u64 {
    60
}
