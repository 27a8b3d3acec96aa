use super::error::CaptureError;
use crate::packet::LinkType;
use crate::pipeline::{CapturedPacket, PipelineEvent};
use ferrous_pdns_domain::config::CaptureConfig;
use ferrous_pdns_domain::Timestamp;
use pcap::{Activated, Active, Capture, Device, Offline};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const MAX_CONSECUTIVE_ERRORS: u32 = 100;

enum Source {
    Live(Capture<Active>),
    File(Capture<Offline>),
}

/// An opened, filtered capture that has not started delivering packets yet.
///
/// Opening happens on the caller's thread so device, file and filter errors
/// surface at startup.
pub struct PcapSource {
    source: Source,
    link: LinkType,
    description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub packets: u64,
    pub errors: u64,
    /// Packets the kernel dropped (live captures only).
    pub dropped: u64,
    pub reached_end: bool,
}

/// A running capture thread.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<CaptureSummary>,
}

impl CaptureHandle {
    /// Asks the capture thread to stop after its current read.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn join(self) -> Option<CaptureSummary> {
        self.stop();
        self.thread.join().ok()
    }
}

impl PcapSource {
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let (mut source, description) = match &config.pcap_file {
            Some(path) => {
                let capture =
                    Capture::from_file(path).map_err(|source| CaptureError::OpenFile {
                        path: path.clone(),
                        source,
                    })?;
                (Source::File(capture), format!("file {}", path))
            }
            None => {
                let device = match &config.interface {
                    Some(name) => name.clone(),
                    None => Device::lookup()
                        .ok()
                        .flatten()
                        .map(|device| device.name)
                        .ok_or(CaptureError::NoDevice)?,
                };
                let capture = Capture::from_device(device.as_str())
                    .and_then(|inactive| {
                        inactive
                            .promisc(config.promiscuous)
                            .snaplen(config.snaplen)
                            .timeout(config.read_timeout_ms)
                            .open()
                    })
                    .map_err(|source| CaptureError::OpenDevice {
                        device: device.clone(),
                        source,
                    })?;
                (Source::Live(capture), format!("interface {}", device))
            }
        };

        let filter_result = match &mut source {
            Source::Live(capture) => capture.filter(&config.bpf, true),
            Source::File(capture) => capture.filter(&config.bpf, true),
        };
        filter_result.map_err(|source| CaptureError::Filter {
            filter: config.bpf.clone(),
            source,
        })?;

        let dlt = match &source {
            Source::Live(capture) => capture.get_datalink().0,
            Source::File(capture) => capture.get_datalink().0,
        };
        let link = LinkType::from_dlt(dlt)?;

        info!(
            source = %description,
            bpf = %config.bpf,
            link = ?link,
            "Capture opened"
        );

        Ok(Self {
            source,
            link,
            description,
        })
    }

    pub fn link_type(&self) -> LinkType {
        self.link
    }

    pub fn is_live(&self) -> bool {
        matches!(self.source, Source::Live(_))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Moves the capture onto a dedicated thread that forwards every packet
    /// to `sender`, followed by [`PipelineEvent::CaptureFinished`] when a
    /// capture file runs out.
    pub fn spawn(self, sender: mpsc::Sender<PipelineEvent>) -> Result<CaptureHandle, CaptureError> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let description = self.description;

        let thread = std::thread::Builder::new()
            .name("pcap-capture".to_string())
            .spawn(move || {
                let summary = match self.source {
                    Source::Live(mut capture) => {
                        let mut summary = pump(&mut capture, &sender, &thread_stop);
                        if let Ok(stats) = capture.stats() {
                            summary.dropped = u64::from(stats.dropped);
                        }
                        summary
                    }
                    Source::File(mut capture) => pump(&mut capture, &sender, &thread_stop),
                };

                if summary.reached_end {
                    let _ = sender.blocking_send(PipelineEvent::CaptureFinished);
                }
                info!(
                    source = %description,
                    packets = summary.packets,
                    errors = summary.errors,
                    dropped = summary.dropped,
                    "Capture stopped"
                );
                summary
            })
            .map_err(|e| CaptureError::Thread(e.to_string()))?;

        Ok(CaptureHandle { stop, thread })
    }
}

fn pump<T: Activated + ?Sized>(
    capture: &mut Capture<T>,
    sender: &mpsc::Sender<PipelineEvent>,
    stop: &AtomicBool,
) -> CaptureSummary {
    let mut summary = CaptureSummary::default();
    let mut consecutive_errors = 0u32;

    while !stop.load(Ordering::SeqCst) {
        match capture.next_packet() {
            Ok(packet) => {
                consecutive_errors = 0;
                summary.packets += 1;
                let event = PipelineEvent::Packet(CapturedPacket {
                    timestamp: Timestamp::new(
                        packet.header.ts.tv_sec.max(0) as u64,
                        packet.header.ts.tv_usec.max(0) as u32,
                    ),
                    data: packet.data.to_vec(),
                    wire_len: packet.header.len,
                });
                if sender.blocking_send(event).is_err() {
                    debug!("Pipeline gone, capture thread exiting");
                    break;
                }
            }
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(pcap::Error::NoMorePackets) => {
                summary.reached_end = true;
                break;
            }
            Err(e) => {
                summary.errors += 1;
                consecutive_errors += 1;
                warn!(error = %e, "Capture read failed");
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    error!(error = %e, "Too many consecutive capture errors, giving up");
                    summary.reached_end = true;
                    break;
                }
            }
        }
    }

    summary
}
