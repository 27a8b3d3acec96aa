use crate::packet::PacketError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No capture device available")]
    NoDevice,

    #[error("Failed to open capture device {device}: {source}")]
    OpenDevice {
        device: String,
        #[source]
        source: pcap::Error,
    },

    #[error("Failed to open capture file {path}: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: pcap::Error,
    },

    #[error("Invalid BPF filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: pcap::Error,
    },

    #[error(transparent)]
    LinkType(#[from] PacketError),

    #[error("Failed to start capture thread: {0}")]
    Thread(String),
}
