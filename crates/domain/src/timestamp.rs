use serde::{Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const MICROS_PER_SEC: u64 = 1_000_000;

/// Capture time with microsecond resolution, as delivered by the packet source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    micros: u64,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { micros: 0 };

    pub fn new(secs: u64, subsec_micros: u32) -> Self {
        Self {
            micros: secs
                .saturating_mul(MICROS_PER_SEC)
                .saturating_add(u64::from(subsec_micros) % MICROS_PER_SEC),
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(secs, 0)
    }

    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::new(since_epoch.as_secs(), since_epoch.subsec_micros())
    }

    #[inline]
    pub fn secs(&self) -> u64 {
        self.micros / MICROS_PER_SEC
    }

    #[inline]
    pub fn subsec_micros(&self) -> u32 {
        (self.micros % MICROS_PER_SEC) as u32
    }

    /// Whole seconds elapsed since `earlier`, zero if `earlier` is later.
    #[inline]
    pub fn secs_since(&self, earlier: Timestamp) -> u64 {
        self.secs().saturating_sub(earlier.secs())
    }

    pub fn add_secs(&self, secs: u64) -> Self {
        Self {
            micros: self.micros.saturating_add(secs.saturating_mul(MICROS_PER_SEC)),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs(), self.subsec_micros())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
