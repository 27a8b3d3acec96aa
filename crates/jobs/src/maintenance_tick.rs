use ferrous_pdns_application::ports::MaintenanceTrigger;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Periodically asks the packet pipeline to run its maintenance pass.
///
/// The job holds no pipeline state. It stops when cancelled or when the
/// trigger reports that the pipeline is gone.
pub struct MaintenanceTickJob {
    trigger: Arc<dyn MaintenanceTrigger>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl MaintenanceTickJob {
    pub fn new(trigger: Arc<dyn MaintenanceTrigger>) -> Self {
        Self {
            trigger,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting maintenance tick job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; maintenance starts one period in.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("MaintenanceTickJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if !self.trigger.request_maintenance().await {
                            info!("MaintenanceTickJob: pipeline closed, stopping");
                            break;
                        }
                        debug!("Maintenance requested");
                    }
                }
            }
        })
    }
}
