use super::event::PipelineEvent;
use super::processor::{LoopControl, Pipeline};
use super::stats::PipelineStats;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Drives the pipeline from its event channel until the capture ends, every
/// sender is gone, or shutdown is requested. The pipeline is always flushed
/// before returning.
pub async fn run_event_loop(
    mut pipeline: Pipeline,
    mut events: mpsc::Receiver<PipelineEvent>,
    shutdown: CancellationToken,
) -> PipelineStats {
    info!("Pipeline event loop started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("Shutdown requested, stopping pipeline");
                break;
            }
            event = events.recv() => match event {
                Some(event) => {
                    if pipeline.handle(event) == LoopControl::Stop {
                        break;
                    }
                }
                None => {
                    info!("Event channel closed, stopping pipeline");
                    break;
                }
            }
        }
    }

    events.close();
    pipeline.shutdown()
}
