// LogWatch - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading (platform default or --config)
// 3. Logging initialisation (debug mode support)
// 4. Running the watcher on the main thread until interrupted

use clap::Parser;
use logwatch::app::options::{self, CliOverrides};
use logwatch::app::watcher::LogWatcher;
use logwatch::platform::config::{self, PlatformPaths};
use logwatch::util;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

/// LogWatch - wait for a log file to appear, then follow it.
///
/// Polls until a regular file exists at PATH, clears the screen, prints a
/// banner, and streams everything appended to the file. If the file goes
/// away, it goes back to waiting. Runs until interrupted with Ctrl+C.
#[derive(Parser, Debug)]
#[command(name = "logwatch", version, about)]
struct Cli {
    /// Log file to watch (default from config.toml, else logs/output.log).
    path: Option<PathBuf>,

    /// Seconds between existence checks while the file is absent.
    #[arg(short = 'i', long = "interval", value_name = "SECS")]
    interval: Option<f64>,

    /// Show the last N existing lines when the file is first found.
    #[arg(short = 'n', long = "lines", value_name = "N", conflicts_with = "from_start")]
    lines: Option<usize>,

    /// Show the whole existing file when it is first found.
    #[arg(long = "from-start")]
    from_start: bool,

    /// Do not clear the screen before the banner.
    #[arg(long = "no-clear")]
    no_clear: bool,

    /// Configuration file (default: platform config directory).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let explicit_config = cli.config.is_some();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "LogWatch starting"
    );

    if explicit_config && !config_path.exists() {
        tracing::warn!(
            path = %config_path.display(),
            "Config file given with --config does not exist; using defaults"
        );
    }
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let overrides = CliOverrides {
        path: cli.path,
        interval_secs: cli.interval,
        lines: cli.lines,
        from_start: cli.from_start,
        no_clear: cli.no_clear,
    };

    let watch_config = match options::resolve(&overrides, &app_config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let watcher = LogWatcher::new(watch_config);

    // Never set: the process ends via Ctrl+C and the default signal handling.
    let cancel = AtomicBool::new(false);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = watcher.run(&mut out, &cancel) {
        tracing::error!(error = %e, "Watcher stopped");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
