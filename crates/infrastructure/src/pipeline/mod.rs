pub mod event;
pub mod processor;
pub mod runner;
pub mod stats;
pub mod trigger;

pub use event::{CapturedPacket, PipelineEvent};
pub use processor::{LoopControl, MaintenanceClock, Pipeline};
pub use runner::run_event_loop;
pub use stats::PipelineStats;
pub use trigger::ChannelMaintenanceTrigger;
