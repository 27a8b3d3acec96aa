pub mod connection;
pub mod key;
pub mod table;

pub use connection::{DirectionStats, Flow, FlowExpiry, InspectLimits};
pub use key::{Endpoint, FlowKey, Role};
pub use table::{FlowStats, FlowTable, FlowTimeouts};
