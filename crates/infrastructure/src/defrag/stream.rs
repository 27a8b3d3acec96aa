use ferrous_pdns_domain::Timestamp;
use std::net::IpAddr;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub src: IpAddr,
    pub dst: IpAddr,
    pub id: u32,
}

#[derive(Debug, Clone)]
struct Fragment {
    /// Byte offset into the original payload.
    offset: usize,
    data: Vec<u8>,
}

impl Fragment {
    fn end(&self) -> usize {
        self.offset + self.data.len()
    }
}

/// In-progress reassembly of one original datagram.
#[derive(Debug, Clone)]
pub struct FragmentStream {
    header: Option<Vec<u8>>,
    received: usize,
    expected: Option<usize>,
    fragments: Vec<Fragment>,
    first_seen: Timestamp,
    last_seen: Timestamp,
}

pub(crate) enum StreamState {
    Incomplete,
    Complete(usize),
    Overflowed { received: usize, expected: usize },
}

impl FragmentStream {
    pub(crate) fn new(now: Timestamp) -> Self {
        Self {
            header: None,
            received: 0,
            expected: None,
            fragments: Vec::new(),
            first_seen: now,
            last_seen: now,
        }
    }

    pub fn received_bytes(&self) -> usize {
        self.received
    }

    pub fn expected_len(&self) -> Option<usize> {
        self.expected
    }

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn first_seen(&self) -> Timestamp {
        self.first_seen
    }

    pub fn last_seen(&self) -> Timestamp {
        self.last_seen
    }

    pub(crate) fn capture_header(&mut self, header: &[u8]) {
        if self.header.is_none() {
            self.header = Some(header.to_vec());
        }
    }

    /// Returns false when a fragment at this offset is already held. A
    /// duplicate leaves the stream untouched, idle clock included.
    pub(crate) fn insert(&mut self, offset: usize, data: &[u8], now: Timestamp) -> bool {
        if self.fragments.iter().any(|f| f.offset == offset) {
            return false;
        }
        self.last_seen = now;
        self.received += data.len();
        self.fragments.push(Fragment {
            offset,
            data: data.to_vec(),
        });
        true
    }

    pub(crate) fn set_expected(&mut self, expected: usize) {
        self.expected = Some(expected);
    }

    pub(crate) fn state(&self) -> StreamState {
        match (&self.header, self.expected) {
            (Some(_), Some(expected)) if self.received > expected => StreamState::Overflowed {
                received: self.received,
                expected,
            },
            (Some(_), Some(expected)) if self.received == expected => {
                StreamState::Complete(expected)
            }
            _ => StreamState::Incomplete,
        }
    }

    /// Copies every fragment that fits within `expected` into place, in the
    /// order the fragments arrived. Overlapping bytes take the later copy.
    pub(crate) fn assemble(self, expected: usize) -> Option<(Vec<u8>, Vec<u8>)> {
        let header = self.header?;
        let mut payload = vec![0u8; expected];
        for fragment in &self.fragments {
            if fragment.end() > expected {
                trace!(
                    offset = fragment.offset,
                    len = fragment.data.len(),
                    expected,
                    "Fragment extends past datagram end, skipped"
                );
                continue;
            }
            payload[fragment.offset..fragment.end()].copy_from_slice(&fragment.data);
        }
        Some((header, payload))
    }

    pub(crate) fn is_idle(&self, now: Timestamp, timeout_secs: u64) -> bool {
        now.secs_since(self.last_seen) >= timeout_secs
    }
}
