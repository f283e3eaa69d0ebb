// LogWatch - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Config and CLI values are validated against the bounds defined here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogWatch";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogWatch";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Watch target
// =============================================================================

/// Log file watched when neither the CLI nor config.toml names one.
/// Relative paths are resolved against the working directory.
pub const DEFAULT_LOG_PATH: &str = "logs/output.log";

// =============================================================================
// Wait loop
// =============================================================================

/// Delay between existence checks while the target file is absent (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Minimum user-configurable poll interval (ms).
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Maximum user-configurable poll interval (ms).
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000; // 60 s

// =============================================================================
// Follow mode
// =============================================================================

/// How often the followed file is checked for appended content (ms).
pub const FOLLOW_POLL_INTERVAL_MS: u64 = 200;

/// How often the cancel flag is checked while sleeping (ms).
/// Every sleep in the watcher is sliced into pieces of this length.
pub const CANCEL_CHECK_INTERVAL_MS: u64 = 50;

/// Maximum bytes read from the followed file in one tick.
/// A larger backlog is drained over consecutive ticks without gaps.
pub const MAX_FOLLOW_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Upper bound on `--lines` / `[watch] initial_lines`.
pub const MAX_INITIAL_LINES: usize = 100_000;

/// Chunk size used when scanning backwards for the last N lines.
pub const LAST_LINES_SCAN_CHUNK: usize = 8 * 1_024; // 8 KiB

// =============================================================================
// Terminal output
// =============================================================================

/// ANSI sequence: erase the whole display, then move the cursor home.
pub const CLEAR_SCREEN_SEQUENCE: &str = "\x1b[2J\x1b[H";

/// Printed after the monitored path when follow mode begins.
pub const EXIT_HINT: &str = "Press Ctrl+C to exit.";

/// Width of the separator rule under the banner.
pub const BANNER_RULE_WIDTH: usize = 60;

// =============================================================================
// Logging
// =============================================================================

/// Default log level. Stdout carries the followed file, so diagnostics stay
/// quiet unless asked for.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
