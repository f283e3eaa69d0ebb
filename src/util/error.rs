// LogWatch - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// A missing target file is not an error anywhere in this hierarchy: it is
// the normal "waiting" state of the watcher.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogWatch operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogWatchError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Writing to the output stream failed (closed pipe, full disk, ...).
    Output { source: io::Error },
}

impl fmt::Display for LogWatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Output { source } => write!(f, "Cannot write output: {source}"),
        }
    }
}

impl std::error::Error for LogWatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Output { source } => Some(source),
        }
    }
}

impl LogWatchError {
    /// Wrap an I/O error raised while writing to the output stream.
    pub fn output(source: io::Error) -> Self {
        Self::Output { source }
    }
}

// ---------------------------------------------------------------------------
// Follow errors
// ---------------------------------------------------------------------------

/// Errors raised while reading the followed file.
///
/// Never fatal: the watcher logs them and retries, so they stay out of
/// `LogWatchError`.
#[derive(Debug)]
pub enum FollowError {
    /// File metadata could not be read (other than "not found").
    Stat { path: PathBuf, source: io::Error },

    /// The file exists but could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// Seeking to the follow offset failed.
    Seek {
        path: PathBuf,
        offset: u64,
        source: io::Error,
    },

    /// Reading appended bytes failed.
    Read { path: PathBuf, source: io::Error },
}

impl fmt::Display for FollowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stat { path, source } => {
                write!(f, "Cannot stat '{}': {source}", path.display())
            }
            Self::Open { path, source } => {
                write!(f, "Cannot open '{}': {source}", path.display())
            }
            Self::Seek {
                path,
                offset,
                source,
            } => write!(
                f,
                "Cannot seek '{}' to byte {offset}: {source}",
                path.display()
            ),
            Self::Read { path, source } => {
                write!(f, "Read error on '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FollowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stat { source, .. } => Some(source),
            Self::Open { source, .. } => Some(source),
            Self::Seek { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogWatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogWatch results.
pub type Result<T> = std::result::Result<T, LogWatchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_follow_error_preserves_source_chain() {
        let err = FollowError::Read {
            path: PathBuf::from("app.log"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let text = err.to_string();
        assert!(text.contains("app.log"), "got: {text}");
        let io_err = err.source().expect("io error");
        assert_eq!(io_err.to_string(), "denied");
    }

    #[test]
    fn test_config_error_wraps_into_top_level() {
        let err: LogWatchError = ConfigError::ValueOutOfRange {
            field: "--lines".to_string(),
            value: "7".to_string(),
            expected: "0-5".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Configuration error: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_out_of_range_display_names_field() {
        let err = ConfigError::ValueOutOfRange {
            field: "[watch] poll_interval_ms".to_string(),
            value: "5".to_string(),
            expected: "50-60000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Config '[watch] poll_interval_ms' = '5' is out of range. Expected: 50-60000"
        );
        assert!(err.source().is_none());
    }
}
