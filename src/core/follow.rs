// LogWatch - core/follow.rs
//
// Follow state for a single file: tracks the byte offset already emitted and
// turns each poll into a `FollowTick`.
//
// Behaviour:
//   - The file is opened once and the handle is kept across polls, so an
//     unreadable file fails at `open` and bytes written to a file after it
//     was renamed away are still read before switching to its replacement.
//   - The offset always advances by exactly the number of bytes read, so
//     appended content is surfaced in order with nothing skipped or repeated.
//   - Bytes are passed through undecoded; partial lines and multi-byte UTF-8
//     sequences split across reads reach the output exactly as written.
//   - size < offset means the file was truncated: the offset resets to 0.
//   - A changed (device, inode) pair on Unix means the path now names a
//     different file: the old handle is drained, then the new file is
//     opened and read from 0.
//   - A missing path, or one that is no longer a regular file, is reported
//     as `Vanished` (after draining the old handle) rather than as an error.
//   - At most MAX_FOLLOW_READ_BYTES_PER_TICK bytes are read per poll.

use crate::core::model::{FollowTick, StartPosition};
use crate::util::constants::{LAST_LINES_SCAN_CHUNK, MAX_FOLLOW_READ_BYTES_PER_TICK};
use crate::util::error::FollowError;
use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Identifies the file behind a path across polls.
type FileIdentity = (u64, u64);

#[cfg(unix)]
fn file_identity(meta: &Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn file_identity(_meta: &Metadata) -> Option<FileIdentity> {
    None
}

/// Follows one file by polling its size and reading whatever was appended.
#[derive(Debug)]
pub struct Follower {
    path: PathBuf,
    file: File,
    /// Byte position of the next byte to emit.
    offset: u64,
    identity: Option<FileIdentity>,
}

impl Follower {
    /// Open `path` and seed the offset from `start`.
    ///
    /// Fails if the file cannot be opened for reading.
    pub fn open(path: &Path, start: StartPosition) -> Result<Self, FollowError> {
        let file = open_file(path)?;
        let meta = file.metadata().map_err(|source| FollowError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

        let offset = match start {
            StartPosition::End => meta.len(),
            StartPosition::Beginning => 0,
            StartPosition::LastLines(n) => last_lines_offset(&file, path, meta.len(), n)?,
        };

        tracing::debug!(
            file = %path.display(),
            size = meta.len(),
            offset,
            start = %start,
            "Follow: seeding initial offset"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            offset,
            identity: file_identity(&meta),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Check the file once and return whatever changed since the last poll.
    pub fn poll(&mut self) -> Result<FollowTick, FollowError> {
        let current = match std::fs::metadata(&self.path) {
            Ok(m) if m.is_file() => Some(m),
            Ok(_) => None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(FollowError::Stat {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let same_file = match &current {
            Some(meta) => match (file_identity(meta), self.identity) {
                (Some(now), Some(held)) => now == held,
                _ => true,
            },
            None => false,
        };

        if !same_file {
            // Finish the file we hold before leaving it.
            let held_size = self
                .file
                .metadata()
                .map_err(|source| FollowError::Stat {
                    path: self.path.clone(),
                    source,
                })?
                .len();
            if held_size > self.offset {
                return self.read_from_handle(held_size);
            }

            let Some(meta) = current else {
                return Ok(FollowTick::Vanished);
            };
            self.file = open_file(&self.path)?;
            self.identity = file_identity(&meta);
            self.offset = 0;
            return Ok(FollowTick::Replaced);
        }

        // `current` is Some whenever `same_file` holds.
        let size = current.map(|m| m.len()).unwrap_or(0);
        if size < self.offset {
            let old_offset = self.offset;
            self.offset = 0;
            return Ok(FollowTick::Truncated {
                old_offset,
                new_size: size,
            });
        }

        if size == self.offset {
            return Ok(FollowTick::Idle);
        }

        self.read_from_handle(size)
    }

    /// Read up to MAX_FOLLOW_READ_BYTES_PER_TICK bytes between the offset and `size`.
    fn read_from_handle(&mut self, size: u64) -> Result<FollowTick, FollowError> {
        let available = usize::try_from(size - self.offset).unwrap_or(usize::MAX);
        let limit = available.min(MAX_FOLLOW_READ_BYTES_PER_TICK);

        self.file
            .seek(SeekFrom::Start(self.offset))
            .map_err(|source| FollowError::Seek {
                path: self.path.clone(),
                offset: self.offset,
                source,
            })?;

        let mut bytes = Vec::with_capacity(limit);
        (&self.file)
            .take(limit as u64)
            .read_to_end(&mut bytes)
            .map_err(|source| FollowError::Read {
                path: self.path.clone(),
                source,
            })?;

        if bytes.is_empty() {
            return Ok(FollowTick::Idle);
        }

        self.offset += bytes.len() as u64;
        Ok(FollowTick::Data(bytes))
    }
}

fn open_file(path: &Path) -> Result<File, FollowError> {
    File::open(path).map_err(|source| FollowError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Byte offset at which the last `n` lines of `path` begin.
///
/// The terminator of the final line is not counted as the start of another
/// line, and an unterminated trailing line counts as a line. Returns the file
/// length for `n == 0` and 0 when the file has `n` lines or fewer.
pub fn seek_last_lines(path: &Path, n: usize) -> Result<u64, FollowError> {
    let file = open_file(path)?;
    let len = file
        .metadata()
        .map_err(|source| FollowError::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    last_lines_offset(&file, path, len, n)
}

fn last_lines_offset(
    mut file: &File,
    path: &Path,
    len: u64,
    n: usize,
) -> Result<u64, FollowError> {
    if n == 0 || len == 0 {
        return Ok(len);
    }

    let mut buf = vec![0u8; LAST_LINES_SCAN_CHUNK];
    let mut end = len;
    let mut newlines = 0usize;
    let mut skip_final_terminator = true;

    while end > 0 {
        let start = end.saturating_sub(LAST_LINES_SCAN_CHUNK as u64);
        let size = (end - start) as usize;

        file.seek(SeekFrom::Start(start))
            .map_err(|source| FollowError::Seek {
                path: path.to_path_buf(),
                offset: start,
                source,
            })?;
        file.read_exact(&mut buf[..size])
            .map_err(|source| FollowError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        for (i, &byte) in buf[..size].iter().enumerate().rev() {
            if byte != b'\n' {
                skip_final_terminator = false;
                continue;
            }
            if skip_final_terminator {
                skip_final_terminator = false;
                continue;
            }
            newlines += 1;
            if newlines == n {
                return Ok(start + i as u64 + 1);
            }
        }

        end = start;
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use tempfile::TempDir;

    fn append(path: &Path, bytes: &[u8]) {
        let mut f = OpenOptions::new()
            .append(true)
            .open(path)
            .expect("open for append");
        f.write_all(bytes).expect("append");
    }

    #[test]
    fn test_end_start_skips_existing_content() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"a\nb\n").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        assert_eq!(follower.offset(), 4);
        assert_eq!(follower.poll().expect("poll"), FollowTick::Idle);

        append(&path, b"c\n");
        assert_eq!(follower.poll().expect("poll"), FollowTick::Data(b"c\n".to_vec()));
        assert_eq!(follower.poll().expect("poll"), FollowTick::Idle);
    }

    #[test]
    fn test_beginning_start_emits_existing_content() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"a\nb\n").expect("write");

        let mut follower = Follower::open(&path, StartPosition::Beginning).expect("open");
        assert_eq!(
            follower.poll().expect("poll"),
            FollowTick::Data(b"a\nb\n".to_vec())
        );
    }

    /// A line without its newline yet is emitted as-is; the rest follows
    /// on the next poll with nothing lost or repeated.
    #[test]
    fn test_partial_line_passes_through() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        append(&path, b"hel");
        assert_eq!(follower.poll().expect("poll"), FollowTick::Data(b"hel".to_vec()));
        append(&path, b"lo\n");
        assert_eq!(follower.poll().expect("poll"), FollowTick::Data(b"lo\n".to_vec()));
    }

    #[test]
    fn test_truncation_resets_offset() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"first line\n").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        fs::write(&path, b"new\n").expect("truncate");

        assert_eq!(
            follower.poll().expect("poll"),
            FollowTick::Truncated {
                old_offset: 11,
                new_size: 4
            }
        );
        assert_eq!(follower.poll().expect("poll"), FollowTick::Data(b"new\n".to_vec()));
    }

    #[test]
    fn test_removed_file_reports_vanished() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"x\n").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        fs::remove_file(&path).expect("remove");
        assert_eq!(follower.poll().expect("poll"), FollowTick::Vanished);
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_file_is_read_from_start() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        let rotated = dir.path().join("app.log.1");
        fs::write(&path, b"old content\n").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        fs::rename(&path, &rotated).expect("rotate");
        fs::write(&path, b"fresh, and longer than before\n").expect("recreate");

        assert_eq!(follower.poll().expect("poll"), FollowTick::Replaced);
        assert_eq!(
            follower.poll().expect("poll"),
            FollowTick::Data(b"fresh, and longer than before\n".to_vec())
        );
    }

    /// Bytes written to the old file after it was renamed away are read
    /// before the follower switches to the new file.
    #[cfg(unix)]
    #[test]
    fn test_rotation_drains_old_file_first() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        let rotated = dir.path().join("app.log.1");
        fs::write(&path, b"").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        fs::rename(&path, &rotated).expect("rotate");
        append(&rotated, b"late write\n");
        fs::write(&path, b"new file\n").expect("recreate");

        assert_eq!(
            follower.poll().expect("poll"),
            FollowTick::Data(b"late write\n".to_vec())
        );
        assert_eq!(follower.poll().expect("poll"), FollowTick::Replaced);
        assert_eq!(
            follower.poll().expect("poll"),
            FollowTick::Data(b"new file\n".to_vec())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_removed_file_is_drained_before_vanishing() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        append(&path, b"last words\n");
        fs::remove_file(&path).expect("remove");

        assert_eq!(
            follower.poll().expect("poll"),
            FollowTick::Data(b"last words\n".to_vec())
        );
        assert_eq!(follower.poll().expect("poll"), FollowTick::Vanished);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().expect("tmpdir");
        let err = Follower::open(&dir.path().join("absent.log"), StartPosition::End).unwrap_err();
        assert!(matches!(err, FollowError::Open { .. }), "got {err:?}");
    }

    #[test]
    fn test_large_backlog_drains_in_capped_chunks() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"").expect("write");

        let mut follower = Follower::open(&path, StartPosition::End).expect("open");
        let total = MAX_FOLLOW_READ_BYTES_PER_TICK + 10;
        append(&path, &vec![b'x'; total]);

        let mut received = 0;
        while let FollowTick::Data(bytes) = follower.poll().expect("poll") {
            assert!(bytes.len() <= MAX_FOLLOW_READ_BYTES_PER_TICK);
            received += bytes.len();
        }
        assert_eq!(received, total);
    }

    #[test]
    fn test_seek_last_lines() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"a\nb\nc\n").expect("write");

        assert_eq!(seek_last_lines(&path, 0).expect("seek"), 6);
        assert_eq!(seek_last_lines(&path, 1).expect("seek"), 4);
        assert_eq!(seek_last_lines(&path, 2).expect("seek"), 2);
        assert_eq!(seek_last_lines(&path, 3).expect("seek"), 0);
        assert_eq!(seek_last_lines(&path, 10).expect("seek"), 0);
    }

    #[test]
    fn test_seek_last_lines_unterminated_tail() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        fs::write(&path, b"a\nb\npartial").expect("write");

        assert_eq!(seek_last_lines(&path, 1).expect("seek"), 4);
        assert_eq!(seek_last_lines(&path, 2).expect("seek"), 2);
    }

    /// Lines spanning the backwards-scan chunk boundary are counted once.
    #[test]
    fn test_seek_last_lines_across_chunks() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("app.log");
        let long_line = vec![b'z'; LAST_LINES_SCAN_CHUNK * 2];
        let mut content = Vec::new();
        content.extend_from_slice(b"head\n");
        content.extend_from_slice(&long_line);
        content.extend_from_slice(b"\ntail\n");
        fs::write(&path, &content).expect("write");

        assert_eq!(seek_last_lines(&path, 2).expect("seek"), 5);
        let mut follower = Follower::open(&path, StartPosition::LastLines(1)).expect("open");
        assert_eq!(follower.poll().expect("poll"), FollowTick::Data(b"tail\n".to_vec()));
    }
}
