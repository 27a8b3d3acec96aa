use async_trait::async_trait;

/// Port used by the maintenance timer to ask the packet pipeline for a sweep.
///
/// The timer never touches pipeline state itself; it only raises the request.
#[async_trait]
pub trait MaintenanceTrigger: Send + Sync {
    /// Returns `false` once the pipeline is gone and no more requests can be delivered.
    async fn request_maintenance(&self) -> bool;
}
