#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_pdns_application::ports::MaintenanceTrigger;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub struct MockMaintenanceTrigger {
    requests: AtomicU64,
    closed: AtomicBool,
    /// Close after this many accepted requests; zero means never.
    close_after: u64,
}

impl MockMaintenanceTrigger {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            close_after: 0,
        }
    }

    pub fn closing_after(requests: u64) -> Self {
        Self {
            close_after: requests,
            ..Self::new()
        }
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MaintenanceTrigger for MockMaintenanceTrigger {
    async fn request_maintenance(&self) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        let count = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if self.close_after > 0 && count >= self.close_after {
            self.closed.store(true, Ordering::SeqCst);
        }
        true
    }
}
