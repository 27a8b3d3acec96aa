pub mod file_sink;
pub mod format;
pub mod router;

pub use file_sink::FileSink;
pub use format::format_entry;
pub use router::{open_outputs, PdnsOutput};
