// LogWatch - app/options.rs
//
// Merges command-line overrides with the validated config file into the
// `WatchConfig` the watcher runs with.
//
// Priority: CLI flag > config.toml > built-in constant.
// Unlike config.toml problems, which only warn, an out-of-range CLI value is
// a usage error: the user typed it just now and should fix it.

use crate::core::model::{StartPosition, WatchConfig};
use crate::platform::config::AppConfig;
use crate::util::constants;
use crate::util::error::{ConfigError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub path: Option<PathBuf>,
    /// Poll interval in seconds; fractions allowed.
    pub interval_secs: Option<f64>,
    pub lines: Option<usize>,
    pub from_start: bool,
    pub no_clear: bool,
}

/// Build the run configuration from CLI overrides and the loaded config.
///
/// Out-of-range CLI values come back as `LogWatchError::Config`.
pub fn resolve(cli: &CliOverrides, config: &AppConfig) -> Result<WatchConfig> {
    let poll_interval_ms = match cli.interval_secs {
        Some(secs) => interval_secs_to_ms(secs)?,
        None => config.poll_interval_ms,
    };

    if let Some(lines) = cli.lines {
        if lines > constants::MAX_INITIAL_LINES {
            return Err(ConfigError::ValueOutOfRange {
                field: "--lines".to_string(),
                value: lines.to_string(),
                expected: format!("0-{}", constants::MAX_INITIAL_LINES),
            }
            .into());
        }
    }

    let start = match (cli.lines, cli.from_start) {
        (Some(0), _) => StartPosition::End,
        (Some(n), _) => StartPosition::LastLines(n),
        (None, true) => StartPosition::Beginning,
        (None, false) => match config.initial_lines {
            Some(n) => StartPosition::LastLines(n),
            None if config.from_beginning => StartPosition::Beginning,
            None => StartPosition::End,
        },
    };

    Ok(WatchConfig {
        path: cli.path.clone().unwrap_or_else(|| config.path.clone()),
        poll_interval: Duration::from_millis(poll_interval_ms),
        follow_interval: Duration::from_millis(constants::FOLLOW_POLL_INTERVAL_MS),
        start,
        clear_screen: config.clear_screen && !cli.no_clear,
    })
}

fn interval_secs_to_ms(secs: f64) -> std::result::Result<u64, ConfigError> {
    let ms = secs * 1_000.0;
    let range = constants::MIN_POLL_INTERVAL_MS as f64..=constants::MAX_POLL_INTERVAL_MS as f64;
    if !ms.is_finite() || !range.contains(&ms) {
        return Err(ConfigError::ValueOutOfRange {
            field: "--interval".to_string(),
            value: secs.to_string(),
            expected: format!(
                "{}-{} seconds",
                constants::MIN_POLL_INTERVAL_MS as f64 / 1_000.0,
                constants::MAX_POLL_INTERVAL_MS as f64 / 1_000.0
            ),
        });
    }
    Ok(ms.round() as u64)
}
