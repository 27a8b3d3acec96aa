use super::event::PipelineEvent;
use async_trait::async_trait;
use ferrous_pdns_application::ports::MaintenanceTrigger;
use tokio::sync::mpsc;

/// Delivers maintenance requests through the pipeline's event channel, so
/// they queue behind packets already in flight.
#[derive(Clone)]
pub struct ChannelMaintenanceTrigger {
    sender: mpsc::Sender<PipelineEvent>,
}

impl ChannelMaintenanceTrigger {
    pub fn new(sender: mpsc::Sender<PipelineEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl MaintenanceTrigger for ChannelMaintenanceTrigger {
    async fn request_maintenance(&self) -> bool {
        self.sender.send(PipelineEvent::Maintenance).await.is_ok()
    }
}
