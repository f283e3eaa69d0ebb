// LogWatch - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogWatch configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logwatch/ or %APPDATA%\LogWatch\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[watch]` section.
    pub watch: WatchSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[watch]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// File to watch.
    pub path: Option<String>,
    /// Existence-check interval while the file is absent (ms).
    pub poll_interval_ms: Option<u64>,
    /// "end" or "beginning".
    pub start: Option<String>,
    /// Show this many existing lines on first entry (overrides `start`).
    pub initial_lines: Option<usize>,
    /// Clear the screen before the banner.
    pub clear_screen: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Watch --
    pub path: PathBuf,
    pub poll_interval_ms: u64,
    /// Stream the whole existing file on first entry instead of only new content.
    pub from_beginning: bool,
    /// Show the last N existing lines on first entry.
    pub initial_lines: Option<usize>,
    pub clear_screen: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_LOG_PATH),
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            from_beginning: false,
            initial_lines: None,
            clear_screen: true,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning;
/// the watcher still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            warnings.push(format!(
                "{err}. Using defaults. See config.example.toml for the expected format."
            ));
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Watch: path --
    if let Some(path) = raw.watch.path {
        if path.trim().is_empty() {
            warnings.push(format!(
                "[watch] path is empty. Using default ({}).",
                constants::DEFAULT_LOG_PATH
            ));
        } else {
            config.path = PathBuf::from(path);
        }
    }

    // -- Watch: poll_interval_ms --
    if let Some(ms) = raw.watch.poll_interval_ms {
        if (constants::MIN_POLL_INTERVAL_MS..=constants::MAX_POLL_INTERVAL_MS).contains(&ms) {
            config.poll_interval_ms = ms;
        } else {
            let err = ConfigError::ValueOutOfRange {
                field: "[watch] poll_interval_ms".to_string(),
                value: ms.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_POLL_INTERVAL_MS,
                    constants::MAX_POLL_INTERVAL_MS
                ),
            };
            warnings.push(format!(
                "{err}. Using default ({}).",
                constants::DEFAULT_POLL_INTERVAL_MS
            ));
        }
    }

    // -- Watch: start --
    if let Some(ref start) = raw.watch.start {
        match start.to_lowercase().as_str() {
            "end" => config.from_beginning = false,
            "beginning" => config.from_beginning = true,
            other => warnings.push(format!(
                "[watch] start = \"{other}\" is not recognised. \
                 Expected \"end\" or \"beginning\". Using default (end).",
            )),
        }
    }

    // -- Watch: initial_lines --
    if let Some(lines) = raw.watch.initial_lines {
        if lines > constants::MAX_INITIAL_LINES {
            let err = ConfigError::ValueOutOfRange {
                field: "[watch] initial_lines".to_string(),
                value: lines.to_string(),
                expected: format!("0-{}", constants::MAX_INITIAL_LINES),
            };
            warnings.push(format!("{err}. Ignoring."));
        } else if lines > 0 {
            // Zero means no backlog, same as start = "end".
            config.initial_lines = Some(lines);
        }
    }

    // -- Watch: clear_screen --
    if let Some(clear) = raw.watch.clear_screen {
        config.clear_screen = clear;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: {}. Using default ({}).",
                constants::VALID_LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    config
}
