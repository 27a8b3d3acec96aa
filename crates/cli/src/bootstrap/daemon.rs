use ferrous_pdns_domain::Config;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

/// Detaches from the controlling terminal. Must run before any thread is
/// started, the async runtime included.
pub fn daemonize() -> anyhow::Result<()> {
    // Keep the working directory so relative paths in the config stay valid.
    let rc = unsafe { libc::daemon(1, 0) };
    if rc != 0 {
        return Err(anyhow::anyhow!(
            "Failed to daemonize: {}",
            io::Error::last_os_error()
        ));
    }
    Ok(())
}

/// Output lost once daemonizing points stdout and stderr at /dev/null.
pub fn detach_warnings(config: &Config) -> Vec<&'static str> {
    let mut warnings = vec![
        "Daemon mode detaches stderr: later diagnostics are discarded unless run under a supervisor",
    ];
    if config.output.log_file == "-" {
        warnings.push("Daemon mode with stdout output: observation lines will be discarded");
    }
    warnings
}

/// Pid file removed again when dropped.
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn create(path: &str) -> anyhow::Result<Self> {
        let pid = std::process::id();
        fs::write(path, format!("{}\n", pid))
            .map_err(|e| anyhow::anyhow!("Failed to write pid file {}: {}", path, e))?;
        info!(path = %path, pid, "Pid file written");
        Ok(Self {
            path: PathBuf::from(path),
        })
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove pid file");
        }
    }
}
