mod config;
mod daemon;
mod logging;

pub use config::load_config;
pub use daemon::{daemonize, detach_warnings, PidFile};
pub use logging::init_logging;
