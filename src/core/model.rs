// LogWatch - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. Shared vocabulary across the core, platform and app layers.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::util::constants;

// =============================================================================
// Start position
// =============================================================================

/// Where follow mode begins reading when a file is first picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPosition {
    /// Only content appended after follow mode begins (`tail -f`).
    #[default]
    End,
    /// The whole existing file, then everything appended.
    Beginning,
    /// The last `n` lines already in the file, then everything appended.
    LastLines(usize),
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => write!(f, "end"),
            Self::Beginning => write!(f, "beginning"),
            Self::LastLines(n) => write!(f, "last {n} lines"),
        }
    }
}

// =============================================================================
// Watch configuration
// =============================================================================

/// Validated parameters for one watcher run.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// File to wait for and follow.
    pub path: PathBuf,
    /// Delay between existence checks while the file is absent.
    pub poll_interval: Duration,
    /// Delay between reads while following.
    pub follow_interval: Duration,
    /// Where the first follow session starts reading.
    pub start: StartPosition,
    /// Emit the clear-screen sequence before the banner.
    pub clear_screen: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_LOG_PATH),
            poll_interval: Duration::from_millis(constants::DEFAULT_POLL_INTERVAL_MS),
            follow_interval: Duration::from_millis(constants::FOLLOW_POLL_INTERVAL_MS),
            start: StartPosition::End,
            clear_screen: true,
        }
    }
}

// =============================================================================
// Watcher phases and follow outcomes
// =============================================================================

/// Which half of the outer loop the watcher is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    Waiting,
    Following,
}

impl fmt::Display for WatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Following => write!(f, "following"),
        }
    }
}

/// Result of a single follow poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowTick {
    /// New bytes were appended since the last poll, in file order.
    Data(Vec<u8>),
    /// Nothing new.
    Idle,
    /// The file shrank below the follow offset; reading restarts at 0.
    Truncated { old_offset: u64, new_size: u64 },
    /// A different file now lives at the path; reading restarts at 0.
    Replaced,
    /// No regular file exists at the path any more.
    Vanished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_constants() {
        let config = WatchConfig::default();
        assert_eq!(config.path, PathBuf::from(constants::DEFAULT_LOG_PATH));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.start, StartPosition::End);
        assert!(config.clear_screen);
    }

    #[test]
    fn test_start_position_display() {
        assert_eq!(StartPosition::End.to_string(), "end");
        assert_eq!(StartPosition::LastLines(3).to_string(), "last 3 lines");
    }
}
