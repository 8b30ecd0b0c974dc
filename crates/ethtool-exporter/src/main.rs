//! ethtool-exporter - Prometheus exporter for ethtool statistics.
//!
//! Runs `ethtool` against every physical interface and exposes driver
//! statistics, link settings and optical transceiver diagnostics, either on an
//! HTTP endpoint or as a textfile for the node_exporter textfile collector.

mod server;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use ethtool_exporter_core::collector::{Collector, CommandRunner, EthtoolRunner, FileSystem, RealFs};
use ethtool_exporter_core::config::{ConfigError, ExporterConfig, FilterPolicy};
use ethtool_exporter_core::metrics::write_textfile;
use ethtool_exporter_core::{EXIT_FATAL, VERSION};

/// Default textfile refresh interval in seconds.
const DEFAULT_INTERVAL: u64 = 5;

/// Default address for `--port`.
const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";

/// Prometheus exporter for ethtool statistics.
#[derive(Parser, Debug)]
#[command(
    name = "ethtool-exporter",
    about = "Prometheus exporter for ethtool statistics",
    version
)]
#[command(group(
    ArgGroup::new("output")
        .required(true)
        .args(["textfile_name", "listen", "port"])
))]
struct Args {
    /// Full file path where to store data for node collector to pick up.
    #[arg(short = 'f', long, value_name = "PATH")]
    textfile_name: Option<PathBuf>,

    /// OBSOLETE. Use -L/-p instead. Listen host:port, i.e. 0.0.0.0:9417.
    #[arg(short = 'l', long, value_name = "HOST:PORT")]
    listen: Option<String>,

    /// Port to listen on, i.e. 9417.
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// IP address to listen on [default: 0.0.0.0].
    #[arg(short = 'L', long, conflicts_with_all = ["textfile_name", "listen"])]
    listen_address: Option<String>,

    /// Number of seconds between updates of the textfile [default: 5].
    #[arg(short = 'i', long, conflicts_with_all = ["listen", "port"])]
    interval: Option<u64>,

    /// Run only once and exit. Useful for running in a cronjob.
    #[arg(short = '1', long, conflicts_with_all = ["listen", "port"])]
    oneshot: bool,

    /// Only scrape interfaces whose name matches this regex.
    #[arg(short = 'I', long, default_value = ".*")]
    interface_regex: String,

    /// Only include values whose name matches this regex.
    #[arg(short = 'w', long, conflicts_with = "blacklist_regex")]
    whitelist_regex: Option<String>,

    /// Exclude values whose name matches this regex.
    #[arg(short = 'b', long)]
    blacklist_regex: Option<String>,

    /// Collect interface statistics from `ethtool -S <interface_name>`.
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    collect_interface_statistics: bool,

    /// Collect interface common info from `ethtool <interface_name>`.
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    collect_interface_info: bool,

    /// Collect interface SFP-module diagnostics from `ethtool -m <interface_name>` if possible.
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    collect_sfp_diagnostics: bool,

    /// Sum per-queue statistics like `[0]: rx_discards: 5, [1]: rx_discards: 10`
    /// to `rx_discards: 15`. Mostly met on Broadcom NICs.
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    summarize_queues: bool,

    /// Set logging level to DEBUG and see more.
    #[arg(long)]
    debug: bool,

    /// Silence any error messages and warnings.
    #[arg(short, long)]
    quiet: bool,

    /// Path to the ethtool binary. Searched on PATH, /usr/sbin and /sbin if omitted.
    #[arg(long, value_name = "PATH")]
    ethtool_path: Option<PathBuf>,

    /// Directory listing network devices (for testing/containers).
    #[arg(long, value_name = "PATH", default_value = "/sys/class/net")]
    discovery_dir: PathBuf,
}

/// Where metrics go.
#[derive(Debug, Clone, PartialEq)]
enum OutputMode {
    Textfile {
        path: PathBuf,
        interval: Duration,
        oneshot: bool,
    },
    Server {
        host: String,
        port: u16,
    },
}

impl Args {
    /// Resolves the output mode, including the legacy `--listen` form.
    fn output_mode(&self) -> Result<OutputMode, String> {
        if let Some(path) = &self.textfile_name {
            return Ok(OutputMode::Textfile {
                path: path.clone(),
                interval: Duration::from_secs(self.interval.unwrap_or(DEFAULT_INTERVAL)),
                oneshot: self.oneshot,
            });
        }

        let (host, port) = match (&self.listen, self.port) {
            (Some(listen), _) => parse_listen(listen)?,
            (None, Some(port)) => (
                self.listen_address
                    .as_deref()
                    .unwrap_or(DEFAULT_LISTEN_ADDRESS)
                    .to_string(),
                port,
            ),
            (None, None) => {
                return Err("one of --textfile-name, --port or --listen is required".into());
            }
        };

        Ok(OutputMode::Server {
            host: strip_ipv6_brackets(&host),
            port,
        })
    }

    /// Builds the immutable collector configuration.
    fn exporter_config(&self) -> Result<ExporterConfig, ConfigError> {
        let config = ExporterConfig {
            stat_filter: FilterPolicy::from_patterns(
                self.whitelist_regex.as_deref(),
                self.blacklist_regex.as_deref(),
            )?,
            collect_statistics: self.collect_interface_statistics,
            collect_basic_info: self.collect_interface_info,
            collect_sfp_diagnostics: self.collect_sfp_diagnostics,
            summarize_queues: self.summarize_queues,
            ..ExporterConfig::default()
        };
        Ok(config
            .with_interface_regex(&self.interface_regex)?
            .with_discovery_dir(&self.discovery_dir))
    }
}

/// Splits a legacy `host:port` value at the last colon.
fn parse_listen(listen: &str) -> Result<(String, u16), String> {
    let (host, port) = listen
        .rsplit_once(':')
        .ok_or_else(|| format!("invalid listen address '{}', expected host:port", listen))?;
    let port = port
        .parse()
        .map_err(|_| format!("invalid port '{}' in listen address '{}'", port, listen))?;
    Ok((host.to_string(), port))
}

/// Removes optional IPv6 brackets, i.e. `[::1]` => `::1`.
fn strip_ipv6_brackets(host: &str) -> String {
    host.replace(['[', ']'], "")
}

/// Levels for the binary and the core crate, in that order.
///
/// `--debug` wins over `--quiet`. Quiet drops the per-device reports of the
/// core crate and keeps the errors that stop the exporter or lose a pass.
fn log_levels(debug: bool, quiet: bool) -> (LevelFilter, LevelFilter) {
    if debug {
        (LevelFilter::DEBUG, LevelFilter::DEBUG)
    } else if quiet {
        (LevelFilter::ERROR, LevelFilter::OFF)
    } else {
        (LevelFilter::INFO, LevelFilter::INFO)
    }
}

fn init_logging(debug: bool, quiet: bool) {
    let (bin_level, core_level) = log_levels(debug, quiet);

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("ethtool_exporter={}", bin_level).parse().unwrap())
        .add_directive(format!("ethtool_exporter_core={}", core_level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug, args.quiet);

    let mode = match args.output_mode() {
        Ok(mode) => mode,
        Err(msg) => Args::command()
            .error(ErrorKind::ValueValidation, msg)
            .exit(),
    };
    let config = match args.exporter_config() {
        Ok(config) => config,
        Err(e) => Args::command()
            .error(ErrorKind::ValueValidation, e)
            .exit(),
    };

    if args.listen.is_some() {
        warn!("You are using obsolete argument -l. Please switch to -L and -p");
    }

    let runner = match &args.ethtool_path {
        Some(path) => EthtoolRunner::new(path),
        None => EthtoolRunner::locate(),
    };
    let runner = match runner {
        Ok(runner) => runner,
        Err(e) => {
            error!("Error: cannot find ethtool: {}", e);
            std::process::exit(EXIT_FATAL);
        }
    };

    info!("ethtool-exporter {} starting", VERSION);
    debug!(
        "Config: ethtool={}, discovery_dir={}, statistics={}, info={}, sfp={}, summarize_queues={}",
        runner.path().display(),
        config.discovery_dir.display(),
        config.collect_statistics,
        config.collect_basic_info,
        config.collect_sfp_diagnostics,
        config.summarize_queues
    );
    if config.all_collectors_disabled() {
        warn!("All collectors are disabled, no metrics will be produced");
    }

    let collector = Collector::new(RealFs::new(), runner, config);

    let code = match mode {
        OutputMode::Textfile {
            path,
            interval,
            oneshot,
        } => {
            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                info!("Received shutdown signal");
                r.store(false, Ordering::SeqCst);
            }) {
                warn!("Failed to set Ctrl-C handler: {}", e);
            }
            run_textfile(collector, &path, interval, oneshot, &running)
        }
        OutputMode::Server { host, port } => run_server(collector, &host, port),
    };

    std::process::exit(code);
}

/// Collects and writes the textfile until stopped. Returns the exit status.
fn run_textfile<F: FileSystem, R: CommandRunner>(
    mut collector: Collector<F, R>,
    path: &Path,
    interval: Duration,
    oneshot: bool,
    running: &AtomicBool,
) -> i32 {
    info!("Putting metrics into {}", path.display());

    while running.load(Ordering::SeqCst) {
        match collector.collect() {
            Ok(collection) => match write_textfile(path, &collection) {
                Ok(()) => debug!(series = collection.series_count(), "textfile written"),
                Err(e) => error!("Failed to write {}: {}", path.display(), e),
            },
            Err(e) if e.is_fatal() => {
                error!("{}", e);
                return EXIT_FATAL;
            }
            Err(e) => error!("Collection failed: {}", e),
        }

        if oneshot {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete");
    0
}

/// Serves scrapes on `host:port`. Returns the exit status.
fn run_server<F, R>(collector: Collector<F, R>, host: &str, port: u16) -> i32
where
    F: FileSystem + 'static,
    R: CommandRunner + 'static,
{
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return EXIT_FATAL;
        }
    };

    match runtime.block_on(server::serve(collector, host, port)) {
        Ok(()) => 0,
        Err(e) => {
            error!("Failed to serve on {}:{}: {}", host, port, e);
            EXIT_FATAL
        }
    }
}
