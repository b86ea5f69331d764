//! regislex-fs: Filesystem operations and directory iteration.
//!
//! This crate provides:
//! - Pure queries ([`exists`], [`is_directory`], [`is_file`], [`is_symlink`],
//!   [`file_size`], [`modified_time`])
//! - Create/remove with recursive variants ([`mkdir`], [`rmdir`],
//!   [`remove_file`])
//! - [`rename`] with destination overwrite and streaming [`copy_file`]
//! - Whole-file helpers ([`read_file`], [`read_to_string`], [`write_file`],
//!   [`append_file`])
//! - Well-known directories ([`current_dir`], [`temp_dir`], [`home_dir`])
//! - A directory cursor ([`DirIter`]) and string path utilities ([`path`])
//!
//! Errors use the canonical [`regislex_core::PalError`] type. Unless a
//! function documents otherwise, OS errors map as: missing target ->
//! `NotFound`, access refused -> `PermissionDenied`, target present ->
//! `AlreadyExists`, anything else -> `Io`. [`DirIter::open`] is the
//! exception: every open failure there is `NotFound`.
//!
//! # Recursive Removal
//!
//! [`rmdir`] with `recursive = true` is best-effort: a failure on one entry
//! is logged and the walk continues. Only the final removal of the root
//! decides the returned result. Symbolic links met during the walk are
//! unlinked, never followed, and a link passed as the root is rejected.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use regislex_core::{PalError, PalResult};
use tracing::{debug, warn};

mod dir;
pub mod path;

pub use dir::{DirEntry, DirIter};
pub use path::{get_dirname, get_extension, get_filename, normalize_path, path_join};

/// Size of the buffer [`copy_file`] streams through.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

// ============================================================================
// Queries
// ============================================================================

/// True if anything exists at `path` (symlinks are followed).
pub fn exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).is_ok()
}

/// True if `path` exists and is a directory.
pub fn is_directory(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// True if `path` itself is a symbolic link (the link is not followed).
pub fn is_symlink(path: impl AsRef<Path>) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// True if `path` exists and is a regular file.
pub fn is_file(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Size of the file at `path` in bytes.
///
/// # Errors
///
/// Returns `NotFound` if `path` is absent.
pub fn file_size(path: impl AsRef<Path>) -> PalResult<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| PalError::from_io("file_size", e))
}

/// Last modification time of `path`, seconds since the Unix epoch.
pub fn modified_time(path: impl AsRef<Path>) -> PalResult<i64> {
    let meta = fs::metadata(path).map_err(|e| PalError::from_io("modified_time", e))?;
    let modified = meta
        .modified()
        .map_err(|e| PalError::from_io("modified_time", e))?;
    Ok(dir::unix_seconds(modified))
}

// ============================================================================
// Create / Remove
// ============================================================================

/// Create a directory.
///
/// Non-recursive creates exactly `path` and fails with `AlreadyExists` if
/// anything is already there. Recursive creates every missing ancestor in
/// order from the root down, tolerating directories that already exist at
/// any level (including `path` itself), and returns the first other error.
pub fn mkdir(path: impl AsRef<Path>, recursive: bool) -> PalResult<()> {
    let path = path.as_ref();

    if !recursive {
        fs::create_dir(path).map_err(|e| PalError::from_io("mkdir", e))?;
        debug!(path = %path.display(), "directory created");
        return Ok(());
    }

    let mut missing: Vec<&Path> = path
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .take_while(|p| !p.is_dir())
        .collect();
    missing.reverse();

    for dir in missing {
        match fs::create_dir(dir) {
            Ok(()) => debug!(path = %dir.display(), "directory created"),
            // Lost a race with another creator; fine as long as it is a directory
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(e) => return Err(PalError::from_io("mkdir", e)),
        }
    }
    Ok(())
}

/// Remove a directory.
///
/// Non-recursive requires `path` to be empty (a non-empty directory is an
/// `Io` error). Recursive walks the tree depth-first in pre-order, deleting
/// each file and descending into each subdirectory before removing the
/// directory itself. Failures below the root are logged and skipped; the
/// returned result reflects only the removal of `path`.
///
/// A symbolic link is never walked through: if `path` is a link (even one
/// pointing at a directory) the call fails with `InvalidArgument` and
/// neither the link nor its target is touched. Remove links with
/// [`remove_file`].
pub fn rmdir(path: impl AsRef<Path>, recursive: bool) -> PalResult<()> {
    let path = path.as_ref();

    if is_symlink(path) {
        return Err(PalError::invalid_argument("rmdir target is a symbolic link"));
    }

    if recursive {
        remove_children(path);
    }

    fs::remove_dir(path).map_err(|e| PalError::from_io("rmdir", e))?;
    debug!(path = %path.display(), recursive, "directory removed");
    Ok(())
}

fn remove_children(dir: &Path) {
    let mut iter = match DirIter::open(dir) {
        Ok(iter) => iter,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "cannot list directory, skipping");
            return;
        }
    };

    loop {
        let entry = match iter.next_entry() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "directory read failed, stopping walk");
                break;
            }
        };

        let result = if entry.is_directory {
            remove_children(entry.path());
            fs::remove_dir(entry.path())
        } else {
            // Directory symlinks on Windows need remove_dir
            fs::remove_file(entry.path()).or_else(|e| {
                if cfg!(windows) {
                    fs::remove_dir(entry.path())
                } else {
                    Err(e)
                }
            })
        };

        if let Err(e) = result {
            warn!(path = %entry.path().display(), error = %e, "entry removal failed, continuing");
        }
    }
    iter.close();
}

/// Remove a single file.
pub fn remove_file(path: impl AsRef<Path>) -> PalResult<()> {
    fs::remove_file(path).map_err(|e| PalError::from_io("remove_file", e))
}

// ============================================================================
// Rename / Copy
// ============================================================================

/// Rename `from` to `to`, replacing an existing file at `to`.
pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> PalResult<()> {
    fs::rename(from, to).map_err(|e| PalError::from_io("rename", e))
}

/// Copy the contents of `from` into `to`, returning the number of bytes.
///
/// Data streams through a [`COPY_BUFFER_SIZE`] buffer. An existing `to` is
/// truncated. If anything fails after `to` was created, the partially
/// written destination is deleted before the error is returned; this holds
/// on every platform.
///
/// # Errors
///
/// - `NotFound` if `from` is absent
/// - `InvalidArgument` if `from` and `to` are the same file
pub fn copy_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> PalResult<u64> {
    let (from, to) = (from.as_ref(), to.as_ref());

    let mut source = File::open(from).map_err(|e| PalError::from_io("copy_file", e))?;
    if let (Ok(a), Ok(b)) = (fs::canonicalize(from), fs::canonicalize(to)) {
        if a == b {
            return Err(PalError::invalid_argument(
                "copy_file source and destination are the same file",
            ));
        }
    }

    let mut dest = File::create(to).map_err(|e| PalError::from_io("copy_file", e))?;

    match stream(&mut source, &mut dest) {
        Ok(copied) => Ok(copied),
        Err(e) => {
            drop(dest);
            if let Err(cleanup) = fs::remove_file(to) {
                warn!(path = %to.display(), error = %cleanup, "partial copy not removed");
            }
            Err(PalError::from_io("copy_file", e))
        }
    }
}

fn stream(source: &mut impl Read, dest: &mut impl Write) -> io::Result<u64> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dest.write_all(&buf[..n])?;
        copied += n as u64;
    }
    dest.flush()?;
    Ok(copied)
}

// ============================================================================
// Whole-file helpers
// ============================================================================

/// Read an entire file into memory.
pub fn read_file(path: impl AsRef<Path>) -> PalResult<Vec<u8>> {
    fs::read(path).map_err(|e| PalError::from_io("read_file", e))
}

/// Read an entire file as UTF-8.
///
/// Invalid UTF-8 is `InvalidArgument`.
pub fn read_to_string(path: impl AsRef<Path>) -> PalResult<String> {
    fs::read_to_string(path).map_err(|e| PalError::from_io("read_to_string", e))
}

/// Create or truncate `path` and write `contents`.
pub fn write_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PalResult<()> {
    fs::write(path, contents).map_err(|e| PalError::from_io("write_file", e))
}

/// Append `contents` to `path`, creating it if needed.
pub fn append_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PalResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PalError::from_io("append_file", e))?;
    file.write_all(contents.as_ref())
        .map_err(|e| PalError::from_io("append_file", e))
}

// ============================================================================
// Well-known directories
// ============================================================================

/// Current working directory of the process.
pub fn current_dir() -> PalResult<PathBuf> {
    std::env::current_dir().map_err(|e| PalError::from_io("current_dir", e))
}

/// Change the current working directory of the process.
pub fn set_current_dir(path: impl AsRef<Path>) -> PalResult<()> {
    std::env::set_current_dir(path).map_err(|e| PalError::from_io("set_current_dir", e))
}

/// Directory for temporary files.
pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Home directory of the current user.
///
/// Read from `HOME` on POSIX and `USERPROFILE` on Windows.
///
/// # Errors
///
/// Returns `NotFound` if the variable is unset or empty.
pub fn home_dir() -> PalResult<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    match std::env::var_os(var) {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => Err(PalError::not_found("home_dir")),
    }
}
