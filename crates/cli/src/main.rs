use clap::Parser;
use ferrous_pdns_domain::{CliOverrides, Config};
use ferrous_pdns_infrastructure::capture::PcapSource;
use ferrous_pdns_infrastructure::output::{open_outputs, PdnsOutput};
use ferrous_pdns_infrastructure::pipeline::{
    run_event_loop, ChannelMaintenanceTrigger, MaintenanceClock, Pipeline, PipelineStats,
};
use ferrous_pdns_jobs::MaintenanceTickJob;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;

#[derive(Parser)]
#[command(name = "ferrous-pdns")]
#[command(version)]
#[command(about = "Ferrous PDNS - Passive DNS sensor")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Capture interface
    #[arg(short = 'i', long, conflicts_with = "read")]
    interface: Option<String>,

    /// Read packets from a pcap file
    #[arg(short = 'r', long, value_name = "FILE")]
    read: Option<String>,

    /// Answer log file, '-' for stdout
    #[arg(short = 'l', long, value_name = "FILE")]
    log_file: Option<String>,

    /// Error-code log file
    #[arg(short = 'L', long, value_name = "FILE")]
    error_log_file: Option<String>,

    /// BPF capture filter
    #[arg(short = 'b', long)]
    bpf: Option<String>,

    /// Cache memory limit in MB
    #[arg(short = 'M', long, value_name = "MB")]
    memory_limit: Option<u64>,

    /// Seconds an observation is kept after it was last seen
    #[arg(short = 'C', long, value_name = "SECS")]
    cache_timeout: Option<u64>,

    /// Minimum seconds between two lines for the same observation
    #[arg(short = 'P', long, value_name = "SECS")]
    print_interval: Option<u64>,

    /// Record types to log, e.g. 46CDNPRS
    #[arg(short = 'X', long, value_name = "FLAGS")]
    record_types: Option<String>,

    /// Error codes to log, e.g. xs for NXDOMAIN and SERVFAIL
    #[arg(short = 'E', long, value_name = "FLAGS")]
    error_codes: Option<String>,

    /// Write JSON lines instead of the pipe format
    #[arg(short = 'j', long)]
    json: bool,

    /// Run in the background. Stderr is detached, so diagnostics logged
    /// after startup are lost unless run under a supervisor
    #[arg(short = 'D', long)]
    daemon: bool,

    /// Pid file written after daemonizing
    #[arg(short = 'p', long, value_name = "FILE")]
    pid_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            interface: self.interface.clone(),
            pcap_file: self.read.clone(),
            bpf: self.bpf.clone(),
            log_file: self.log_file.clone(),
            error_log_file: self.error_log_file.clone(),
            json: self.json,
            memory_limit_mb: self.memory_limit,
            cache_timeout_secs: self.cache_timeout,
            print_interval_secs: self.print_interval,
            record_types: self.record_types.clone(),
            error_codes: self.error_codes.clone(),
            daemon: self.daemon,
            pid_file: self.pid_file.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;

    bootstrap::init_logging(&config.logging);
    info!("Starting Ferrous PDNS v{}", env!("CARGO_PKG_VERSION"));

    // Opened before daemonizing so capture and output failures reach the terminal.
    let source = PcapSource::open(&config.capture)?;
    let output = open_outputs(&config.output)?;

    if config.daemon.enabled {
        for warning in bootstrap::detach_warnings(&config) {
            warn!("{}", warning);
        }
        bootstrap::daemonize()?;
    }
    let _pid_file = match &config.daemon.pid_file {
        Some(path) => Some(bootstrap::PidFile::create(path)?),
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("ferrous-pdns")
        .build()?;

    let stats = runtime.block_on(run(config, source, output))?;
    info!(
        packets = stats.packets,
        queries = stats.queries,
        responses = stats.responses,
        "Ferrous PDNS stopped"
    );
    Ok(())
}

async fn run(
    config: Config,
    source: PcapSource,
    output: PdnsOutput,
) -> anyhow::Result<PipelineStats> {
    let clock = if source.is_live() {
        MaintenanceClock::WallClock
    } else {
        MaintenanceClock::CaptureTime
    };
    let pipeline = Pipeline::new(source.link_type(), &config, output)?.with_clock(clock);

    let (events_tx, events_rx) = mpsc::channel(config.capture.channel_capacity);
    let shutdown = CancellationToken::new();

    info!(source = %source.description(), link = ?source.link_type(), "Capture started");
    let capture = source.spawn(events_tx.clone())?;

    let tick = Arc::new(
        MaintenanceTickJob::new(Arc::new(ChannelMaintenanceTrigger::new(events_tx)))
            .with_interval(Duration::from_secs(config.maintenance.interval_secs))
            .with_cancellation(shutdown.clone()),
    );
    let tick_handle = tick.start();

    tokio::spawn(wait_for_signal(shutdown.clone()));

    let stats = run_event_loop(pipeline, events_rx, shutdown.clone()).await;

    shutdown.cancel();
    capture.stop();
    if let Err(e) = tick_handle.await {
        warn!(error = %e, "Maintenance tick job ended abnormally");
    }

    match tokio::task::spawn_blocking(move || capture.join()).await {
        Ok(Some(summary)) => info!(
            packets = summary.packets,
            errors = summary.errors,
            dropped = summary.dropped,
            reached_end = summary.reached_end,
            "Capture stopped"
        ),
        Ok(None) => error!("Capture thread panicked"),
        Err(e) => error!(error = %e, "Failed to join capture thread"),
    }

    Ok(stats)
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = shutdown.cancelled() => return,
        _ = ctrl_c => info!("SIGINT received"),
        _ = terminate => info!("SIGTERM received"),
    }
    shutdown.cancel();
}
