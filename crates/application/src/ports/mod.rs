mod maintenance_trigger;
mod pdns_sink;

pub use maintenance_trigger::MaintenanceTrigger;
pub use pdns_sink::PdnsSink;
