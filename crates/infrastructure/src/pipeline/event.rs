use ferrous_pdns_domain::Timestamp;

/// One frame as delivered by the capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPacket {
    pub timestamp: Timestamp,
    pub data: Vec<u8>,
    /// Length on the wire, which may exceed `data.len()` when truncated by snaplen.
    pub wire_len: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Packet(CapturedPacket),
    /// Raised by the maintenance timer; handled once the current event is done.
    Maintenance,
    /// The capture source reached the end of its input.
    CaptureFinished,
}
