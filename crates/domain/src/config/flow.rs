use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowConfig {
    #[serde(default = "default_tcp_timeout_secs")]
    pub tcp_timeout_secs: u64,

    #[serde(default = "default_udp_timeout_secs")]
    pub udp_timeout_secs: u64,

    #[serde(default = "default_icmp_timeout_secs")]
    pub icmp_timeout_secs: u64,

    #[serde(default = "default_other_timeout_secs")]
    pub other_timeout_secs: u64,

    /// Idle seconds after FIN from both sides (or any RST) before a TCP flow
    /// is dropped ahead of its idle timeout.
    #[serde(default = "default_tcp_close_grace_secs")]
    pub tcp_close_grace_secs: u64,

    /// Per-direction packet ceiling after which DNS inspection stops.
    #[serde(default = "default_max_inspect_packets")]
    pub max_inspect_packets: u64,

    /// Per-direction byte ceiling after which DNS inspection stops.
    #[serde(default = "default_max_inspect_bytes")]
    pub max_inspect_bytes: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            tcp_timeout_secs: default_tcp_timeout_secs(),
            udp_timeout_secs: default_udp_timeout_secs(),
            icmp_timeout_secs: default_icmp_timeout_secs(),
            other_timeout_secs: default_other_timeout_secs(),
            tcp_close_grace_secs: default_tcp_close_grace_secs(),
            max_inspect_packets: default_max_inspect_packets(),
            max_inspect_bytes: default_max_inspect_bytes(),
        }
    }
}

fn default_tcp_timeout_secs() -> u64 {
    300
}

fn default_udp_timeout_secs() -> u64 {
    60
}

fn default_icmp_timeout_secs() -> u64 {
    60
}

fn default_other_timeout_secs() -> u64 {
    300
}

fn default_tcp_close_grace_secs() -> u64 {
    5
}

fn default_max_inspect_packets() -> u64 {
    1_000
}

fn default_max_inspect_bytes() -> u64 {
    1_000_000
}
