//! Directory iteration.
//!
//! [`DirIter`] owns exactly one open OS directory stream. It is opened with
//! [`DirIter::open`], advanced with [`DirIter::next_entry`] and released by
//! [`DirIter::close`] or by dropping it.
//!
//! End of stream is its own outcome (`Ok(None)`), distinct from failure:
//!
//! | Result | Meaning |
//! |--------|---------|
//! | `Ok(Some(entry))` | Next entry |
//! | `Ok(None)` | Stream exhausted (or iterator already closed) |
//! | `Err(e)` | Reading the stream failed |
//!
//! `.` and `..` are never yielded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use regislex_core::{PalError, PalResult};
use serde::Serialize;
use tracing::debug;

/// One entry yielded by [`DirIter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    /// File name, without any directory component.
    ///
    /// Non-UTF-8 names are converted lossily; use [`DirEntry::path`] to
    /// address the entry itself.
    pub name: String,

    /// True if the entry itself is a directory (symlinks are not followed).
    pub is_directory: bool,

    /// Size in bytes (0 for directories).
    pub size: u64,

    /// Last modification time, seconds since the Unix epoch.
    pub modified_time: i64,

    #[serde(skip)]
    path: PathBuf,
}

impl DirEntry {
    /// Full path of the entry (directory path joined with the name).
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn from_std(entry: fs::DirEntry) -> PalResult<Self> {
        let file_type = entry
            .file_type()
            .map_err(|e| PalError::from_io("dir_next", e))?;
        // DirEntry::metadata does not traverse symlinks
        let metadata = entry
            .metadata()
            .map_err(|e| PalError::from_io("dir_next", e))?;

        let is_directory = file_type.is_dir();
        Ok(Self {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_directory,
            size: if is_directory { 0 } else { metadata.len() },
            modified_time: metadata.modified().map(unix_seconds).unwrap_or(0),
            path: entry.path(),
        })
    }
}

/// Seconds since the Unix epoch, negative before it.
pub(crate) fn unix_seconds(time: std::time::SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_secs()).unwrap_or(i64::MAX),
    }
}

/// Cursor over one open directory stream.
#[derive(Debug)]
pub struct DirIter {
    inner: Option<fs::ReadDir>,
    path: PathBuf,
}

impl DirIter {
    /// Open a directory for iteration.
    ///
    /// # Errors
    ///
    /// `NotFound` if `path` does not exist, is not a directory, or cannot be
    /// read for any reason (including permissions). The underlying OS error
    /// is logged at debug level.
    pub fn open(path: impl AsRef<Path>) -> PalResult<Self> {
        let path = path.as_ref();

        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(PalError::not_found("dir_open")),
            Err(e) => return Err(map_open_error(e)),
        }

        let inner = fs::read_dir(path).map_err(map_open_error)?;
        debug!(path = %path.display(), "directory stream opened");

        Ok(Self {
            inner: Some(inner),
            path: path.to_path_buf(),
        })
    }

    /// Directory this iterator was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Advance to the next entry.
    ///
    /// Returns `Ok(None)` once the stream is exhausted; further calls keep
    /// returning `Ok(None)`.
    pub fn next_entry(&mut self) -> PalResult<Option<DirEntry>> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };

        match inner.next() {
            None => {
                self.inner = None;
                Ok(None)
            }
            Some(Err(e)) => Err(PalError::from_io("dir_next", e)),
            Some(Ok(entry)) => DirEntry::from_std(entry).map(Some),
        }
    }

    /// Release the native directory handle.
    pub fn close(mut self) {
        if self.inner.take().is_some() {
            debug!(path = %self.path.display(), "directory stream closed");
        }
    }
}

impl Iterator for DirIter {
    type Item = PalResult<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

fn map_open_error(e: io::Error) -> PalError {
    debug!(error = %e, kind = ?e.kind(), "directory open failed");
    PalError::not_found("dir_open")
}
