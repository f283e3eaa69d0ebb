// LogWatch - platform/terminal.rs
//
// Terminal-facing text: the clear-screen sequence, the follow banner and the
// waiting line. Everything is written to a caller-supplied `Write` so the
// watcher can target stdout in the binary and a buffer in tests.

use crate::util::constants::{BANNER_RULE_WIDTH, CLEAR_SCREEN_SEQUENCE, EXIT_HINT};
use std::io::{self, Write};
use std::path::Path;

/// Erase the display and move the cursor to the top-left corner.
pub fn clear_screen<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    out.write_all(CLEAR_SCREEN_SEQUENCE.as_bytes())?;
    out.flush()
}

/// Banner printed once each time follow mode begins.
pub fn banner_text(path: &Path) -> String {
    format!(
        "Monitoring {}\n{EXIT_HINT}\n{}\n",
        path.display(),
        "-".repeat(BANNER_RULE_WIDTH)
    )
}

pub fn write_banner<W: Write + ?Sized>(out: &mut W, path: &Path) -> io::Result<()> {
    out.write_all(banner_text(path).as_bytes())?;
    out.flush()
}

/// Line printed on every poll while the file is absent.
pub fn waiting_text(path: &Path) -> String {
    format!("Waiting for {} to appear...\n", path.display())
}

pub fn write_waiting<W: Write + ?Sized>(out: &mut W, path: &Path) -> io::Result<()> {
    out.write_all(waiting_text(path).as_bytes())?;
    out.flush()
}
