// LogWatch - app/watcher.rs
//
// The LogWatcher loop: wait for the target file to appear, then follow it.
//
// Architecture:
//   - `LogWatcher::run` is a blocking loop on the caller's thread. The binary
//     calls it on the main thread with a cancel flag that is never set, so
//     the process runs until Ctrl+C terminates it.
//   - `LogWatcher::spawn` runs the same loop on a background thread and
//     returns a `WatchHandle` with an `Arc<AtomicBool>` cancel flag, for
//     embedding and for tests.
//
// Loop:
//   1. A regular file exists at the path: clear the screen (unless disabled),
//      print the banner, then follow until the file vanishes.
//   2. Otherwise: print the waiting line and sleep one poll interval.
//
// Failure handling:
//   - A file that exists but cannot be opened is retried every poll interval
//     with the configured start position kept; no waiting line is printed
//     because the file is there.
//   - Follow read/stat errors are non-fatal and retried on the next follow
//     tick.
//   - Repeated failures are logged at warn once when they start and once
//     when they clear, and at debug in between.
//   - The configured start position only applies to a file that is already
//     present when the watcher starts. A file that appears after a waiting
//     line was printed is new, so it is streamed from its beginning.
//   - A file that vanishes mid-follow sends the loop back to waiting, and
//     from there the rule above applies when it reappears.
//   - Output write errors are fatal and end `run` with `LogWatchError::Output`.
//   - Every sleep is sliced into CANCEL_CHECK_INTERVAL_MS pieces so the
//     cancel flag is honoured promptly.

use crate::core::follow::Follower;
use crate::core::model::{FollowTick, StartPosition, WatchConfig, WatchPhase};
use crate::platform::terminal;
use crate::util::constants::CANCEL_CHECK_INTERVAL_MS;
use crate::util::error::{LogWatchError, Result};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Why a follow session ended.
enum FollowExit {
    Cancelled,
    Vanished,
}

/// Consecutive failures of one operation, for rate-limited logging.
#[derive(Debug, Default)]
struct ErrorStreak {
    failures: u64,
}

impl ErrorStreak {
    /// Record a failure. Returns `true` if it started a new streak.
    fn fail(&mut self, path: &Path, error: &dyn std::fmt::Display, what: &'static str) -> bool {
        self.failures += 1;
        if self.failures == 1 {
            tracing::warn!(file = %path.display(), error = %error, "{what} failed; retrying");
            true
        } else {
            tracing::debug!(
                file = %path.display(),
                error = %error,
                failures = self.failures,
                "{what} still failing"
            );
            false
        }
    }

    /// Record a success. Returns `true` if it ended a streak.
    fn succeed(&mut self, path: &Path, what: &'static str) -> bool {
        if self.failures == 0 {
            return false;
        }
        tracing::warn!(
            file = %path.display(),
            failures = self.failures,
            "{what} recovered"
        );
        self.failures = 0;
        true
    }
}

/// Waits for a single log file and streams what is appended to it.
#[derive(Debug, Clone)]
pub struct LogWatcher {
    config: WatchConfig,
}

impl LogWatcher {
    pub fn new(config: WatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Run the wait/follow loop until `cancel` is set.
    ///
    /// Only returns `Ok` after cancellation; returns `Err` if the output
    /// stream can no longer be written.
    pub fn run<W: Write + ?Sized>(&self, out: &mut W, cancel: &AtomicBool) -> Result<()> {
        let path = self.config.path.as_path();
        let mut start = self.config.start;
        let mut sessions: u64 = 0;
        let mut phase = WatchPhase::Waiting;
        let mut open_errors = ErrorStreak::default();

        tracing::info!(
            file = %path.display(),
            poll_ms = self.config.poll_interval.as_millis() as u64,
            start = %start,
            "Watcher started"
        );

        loop {
            if cancel.load(Ordering::SeqCst) {
                tracing::info!(sessions, "Watcher cancelled");
                return Ok(());
            }

            if is_regular_file(path) {
                match Follower::open(path, start) {
                    Ok(follower) => {
                        open_errors.succeed(path, "Opening log file");
                        sessions += 1;
                        phase = transition(phase, WatchPhase::Following, path);
                        self.announce(out)?;

                        match self.follow(follower, out, cancel)? {
                            FollowExit::Cancelled => {
                                tracing::info!(sessions, "Watcher cancelled");
                                return Ok(());
                            }
                            FollowExit::Vanished => {
                                phase = transition(phase, WatchPhase::Waiting, path);
                                continue;
                            }
                        }
                    }
                    Err(e) => {
                        // The file is present, so this is not "waiting", and
                        // the retry keeps the configured start position.
                        open_errors.fail(path, &e, "Opening log file");
                    }
                }
            } else {
                terminal::write_waiting(out, path).map_err(LogWatchError::output)?;
                // Whatever appears at the path from now on is entirely new content.
                start = StartPosition::Beginning;
            }

            if !sleep_interruptible(self.config.poll_interval, cancel) {
                tracing::info!(sessions, "Watcher cancelled");
                return Ok(());
            }
        }
    }

    /// Run the loop on a background thread, writing to `out`.
    pub fn spawn<W>(self, mut out: W) -> WatchHandle
    where
        W: Write + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let thread_cancel = Arc::clone(&cancel);
        let thread = std::thread::spawn(move || self.run(&mut out, &thread_cancel));
        WatchHandle { cancel, thread }
    }

    /// Clear the screen and print the banner for a new follow session.
    fn announce<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        if self.config.clear_screen {
            terminal::clear_screen(out).map_err(LogWatchError::output)?;
        }
        terminal::write_banner(out, &self.config.path).map_err(LogWatchError::output)
    }

    /// Stream appended bytes until the file vanishes or `cancel` is set.
    fn follow<W: Write + ?Sized>(
        &self,
        mut follower: Follower,
        out: &mut W,
        cancel: &AtomicBool,
    ) -> Result<FollowExit> {
        let mut bytes_emitted: u64 = 0;
        let mut read_errors = ErrorStreak::default();

        loop {
            if cancel.load(Ordering::SeqCst) {
                return Ok(FollowExit::Cancelled);
            }

            let tick = follower.poll();
            if tick.is_ok() {
                read_errors.succeed(follower.path(), "Reading log file");
            }

            match tick {
                Ok(FollowTick::Data(bytes)) => {
                    out.write_all(&bytes)
                        .and_then(|()| out.flush())
                        .map_err(LogWatchError::output)?;
                    bytes_emitted += bytes.len() as u64;
                    // More may be waiting beyond the per-tick cap.
                    continue;
                }
                Ok(FollowTick::Idle) => {}
                Ok(FollowTick::Truncated {
                    old_offset,
                    new_size,
                }) => {
                    tracing::info!(
                        file = %follower.path().display(),
                        old_offset,
                        new_size,
                        "File truncated; reading from start"
                    );
                    continue;
                }
                Ok(FollowTick::Replaced) => {
                    tracing::info!(
                        file = %follower.path().display(),
                        "File replaced; reading new file from start"
                    );
                    continue;
                }
                Ok(FollowTick::Vanished) => {
                    tracing::info!(
                        file = %follower.path().display(),
                        bytes_emitted,
                        "File vanished"
                    );
                    return Ok(FollowExit::Vanished);
                }
                Err(e) => {
                    read_errors.fail(follower.path(), &e, "Reading log file");
                }
            }

            if !sleep_interruptible(self.config.follow_interval, cancel) {
                return Ok(FollowExit::Cancelled);
            }
        }
    }
}

/// Handle to a watcher running on a background thread.
pub struct WatchHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<Result<()>>,
}

impl WatchHandle {
    /// Returns `true` while the background loop is still running.
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Request the loop to stop and wait for it.
    ///
    /// The loop exits within `CANCEL_CHECK_INTERVAL_MS` unless it is blocked
    /// writing output. Returns the loop's own result.
    pub fn stop(self) -> Result<()> {
        self.cancel.store(true, Ordering::SeqCst);
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

fn transition(from: WatchPhase, to: WatchPhase, path: &Path) -> WatchPhase {
    if from != to {
        tracing::info!(file = %path.display(), from = %from, to = %to, "Watcher phase change");
    }
    to
}

/// Sleep for `total`, waking every CANCEL_CHECK_INTERVAL_MS to check `cancel`.
///
/// Returns `false` if cancelled before the full duration elapsed.
fn sleep_interruptible(total: Duration, cancel: &AtomicBool) -> bool {
    let slice = Duration::from_millis(CANCEL_CHECK_INTERVAL_MS);
    let mut remaining = total;
    while !remaining.is_zero() {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining -= step;
    }
    !cancel.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn quick_config(path: &Path) -> WatchConfig {
        WatchConfig {
            path: path.to_path_buf(),
            poll_interval: Duration::from_millis(50),
            follow_interval: Duration::from_millis(50),
            start: StartPosition::End,
            clear_screen: true,
        }
    }

    #[test]
    fn test_sleep_interruptible_returns_early_on_cancel() {
        let cancel = AtomicBool::new(true);
        let started = Instant::now();
        assert!(!sleep_interruptible(Duration::from_secs(5), &cancel));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_sleep_interruptible_completes() {
        let cancel = AtomicBool::new(false);
        assert!(sleep_interruptible(Duration::from_millis(20), &cancel));
    }

    #[test]
    fn test_run_returns_immediately_when_already_cancelled() {
        let dir = TempDir::new().expect("tmpdir");
        let watcher = LogWatcher::new(quick_config(&dir.path().join("absent.log")));
        let cancel = AtomicBool::new(true);
        let mut out = Vec::new();
        watcher.run(&mut out, &cancel).expect("run");
        assert!(out.is_empty());
    }

    #[test]
    fn test_error_streak_warns_only_at_edges() {
        let path = Path::new("app.log");
        let mut streak = ErrorStreak::default();
        assert!(!streak.succeed(path, "Reading"));
        assert!(streak.fail(path, &"denied", "Reading"));
        assert!(!streak.fail(path, &"denied", "Reading"));
        assert!(!streak.fail(path, &"denied", "Reading"));
        assert!(streak.succeed(path, "Reading"));
        assert!(!streak.succeed(path, "Reading"));
        assert!(streak.fail(path, &"denied", "Reading"));
    }

    #[test]
    fn test_directory_is_not_a_log_file() {
        let dir = TempDir::new().expect("tmpdir");
        let sub = dir.path().join("logs");
        fs::create_dir(&sub).expect("mkdir");
        assert!(!is_regular_file(&sub));
    }

    #[test]
    fn test_announce_respects_clear_setting() {
        let dir = TempDir::new().expect("tmpdir");
        let mut config = quick_config(&dir.path().join("a.log"));
        config.clear_screen = false;
        let mut out = Vec::new();
        LogWatcher::new(config).announce(&mut out).expect("announce");
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains('\x1b'));
        assert!(text.starts_with("Monitoring "));
    }
}
