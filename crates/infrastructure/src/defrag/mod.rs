pub mod stream;
pub mod table;

pub use stream::{FragmentKey, FragmentStream};
pub use table::{DefragStats, DefragTable, FragmentInput, FragmentOutcome, ReassembledDatagram};
