use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Live capture interface. When neither this nor `pcap_file` is set the
    /// capture library's default device is used.
    #[serde(default)]
    pub interface: Option<String>,

    /// Read packets from a capture file instead of a live interface.
    #[serde(default)]
    pub pcap_file: Option<String>,

    #[serde(default = "default_bpf")]
    pub bpf: String,

    #[serde(default = "default_snaplen")]
    pub snaplen: i32,

    #[serde(default = "default_true")]
    pub promiscuous: bool,

    /// Read timeout for live captures, so the capture thread can notice shutdown.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: i32,

    /// Packets buffered between the capture thread and the pipeline.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: None,
            pcap_file: None,
            bpf: default_bpf(),
            snaplen: default_snaplen(),
            promiscuous: true,
            read_timeout_ms: default_read_timeout_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

// Non-first IPv4 fragments and IPv6 fragment headers carry no ports, so they
// are let through explicitly for reassembly.
fn default_bpf() -> String {
    "port 53 or (ip[6:2] & 0x3fff != 0) or (ip6 and ip6[6] == 44)".to_string()
}

fn default_snaplen() -> i32 {
    65535
}

fn default_true() -> bool {
    true
}

fn default_read_timeout_ms() -> i32 {
    500
}

fn default_channel_capacity() -> usize {
    10_000
}
