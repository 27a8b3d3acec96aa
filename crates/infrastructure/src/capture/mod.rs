pub mod error;
pub mod pcap_source;

pub use error::CaptureError;
pub use pcap_source::{CaptureHandle, CaptureSummary, PcapSource};
