//! File system, path and directory iteration exports.

use std::os::raw::c_char;
use std::path::Path;

use regislex_fs::DirIter;

use crate::args::{str_arg, try_arg, try_pal, write_out, write_str};
use crate::error::{status, RegislexErrorCode};

/// Write a path into a caller buffer; non-UTF-8 paths are rejected.
unsafe fn write_path(path: &Path, buf: *mut c_char, size: usize) -> RegislexErrorCode {
    match path.to_str() {
        Some(text) => write_str(text, buf, size),
        None => RegislexErrorCode::InvalidArgument,
    }
}

// ============================================================================
// Queries
// ============================================================================

/// True if `path` names an existing file or directory. Null is false.
///
/// # Safety
///
/// `path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_exists(path: *const c_char) -> bool {
    str_arg(path).map(regislex_fs::exists).unwrap_or(false)
}

/// True if `path` is an existing directory. Null is false.
///
/// # Safety
///
/// `path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_is_directory(path: *const c_char) -> bool {
    str_arg(path).map(regislex_fs::is_directory).unwrap_or(false)
}

/// True if `path` is an existing regular file. Null is false.
///
/// # Safety
///
/// `path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_is_file(path: *const c_char) -> bool {
    str_arg(path).map(regislex_fs::is_file).unwrap_or(false)
}

/// Size of a file in bytes.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `size_out` valid for
/// writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_file_size(
    path: *const c_char,
    size_out: *mut u64,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    if size_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(size_out, try_pal!(regislex_fs::file_size(path)))
}

/// Last modification time in Unix seconds.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `time_out` valid for
/// writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_modified_time(
    path: *const c_char,
    time_out: *mut i64,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    if time_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(time_out, try_pal!(regislex_fs::modified_time(path)))
}

// ============================================================================
// Mutations
// ============================================================================

/// Create a directory. With `recursive`, missing parents are created and an
/// existing directory is not an error.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_mkdir(path: *const c_char, recursive: bool) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    status(regislex_fs::mkdir(path, recursive))
}

/// Remove a directory. With `recursive`, its contents go first.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_rmdir(path: *const c_char, recursive: bool) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    status(regislex_fs::rmdir(path, recursive))
}

/// Remove a file.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_remove_file(path: *const c_char) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    status(regislex_fs::remove_file(path))
}

/// Rename or move a file or directory.
///
/// # Safety
///
/// `from` and `to` must be valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn regislex_rename(
    from: *const c_char,
    to: *const c_char,
) -> RegislexErrorCode {
    let from = try_arg!(str_arg(from));
    let to = try_arg!(str_arg(to));
    status(regislex_fs::rename(from, to))
}

/// Copy a file, replacing `to`. A partial destination is removed on failure.
///
/// # Safety
///
/// `from` and `to` must be valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn regislex_copy_file(
    from: *const c_char,
    to: *const c_char,
) -> RegislexErrorCode {
    let from = try_arg!(str_arg(from));
    let to = try_arg!(str_arg(to));
    status(regislex_fs::copy_file(from, to).map(drop))
}

// ============================================================================
// Well-known directories
// ============================================================================

/// Write the current working directory into `buf`.
///
/// # Safety
///
/// `buf` must be writable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_current_dir(buf: *mut c_char, size: usize) -> RegislexErrorCode {
    let dir = try_pal!(regislex_fs::current_dir());
    write_path(&dir, buf, size)
}

/// Write the temporary directory into `buf`.
///
/// # Safety
///
/// `buf` must be writable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_temp_dir(buf: *mut c_char, size: usize) -> RegislexErrorCode {
    write_path(&regislex_fs::temp_dir(), buf, size)
}

/// Write the user's home directory into `buf`.
///
/// # Safety
///
/// `buf` must be writable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_home_dir(buf: *mut c_char, size: usize) -> RegislexErrorCode {
    let dir = try_pal!(regislex_fs::home_dir());
    write_path(&dir, buf, size)
}

// ============================================================================
// Path strings
// ============================================================================

/// Join `base` and `name` with the platform separator.
///
/// # Safety
///
/// `base` and `name` must be valid NUL-terminated strings and `buf`
/// writable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_path_join(
    base: *const c_char,
    name: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> RegislexErrorCode {
    let base = try_arg!(str_arg(base));
    let name = try_arg!(str_arg(name));
    write_str(&regislex_fs::path_join(base, name), buf, size)
}

/// Final component of `path`.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `buf` writable for
/// `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_get_filename(
    path: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    write_str(regislex_fs::get_filename(path), buf, size)
}

/// Extension of the final component, without the dot.
///
/// A path with no extension yields an empty string.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `buf` writable for
/// `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_get_extension(
    path: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    write_str(regislex_fs::get_extension(path).unwrap_or(""), buf, size)
}

/// Everything before the final component.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `buf` writable for
/// `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_get_dirname(
    path: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    write_str(&regislex_fs::get_dirname(path), buf, size)
}

/// Lexically normalize `path` (collapse separators, `.` and `..`).
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `buf` writable for
/// `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_normalize_path(
    path: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    write_str(&regislex_fs::normalize_path(path), buf, size)
}

// ============================================================================
// Directory iteration
// ============================================================================

/// Opaque directory iterator.
pub struct RegislexDirIter {
    inner: DirIter,
}

/// Capacity of `RegislexDirEntry::name`, terminator included.
///
/// Fixed on every platform and large enough for the UTF-8 form of any
/// single name component: 255 bytes on Unix filesystems, 255 UTF-16 units
/// (at most 765 bytes) on Windows.
pub const REGISLEX_DIR_NAME_MAX: usize = 1024;

/// One directory entry, filled in by `regislex_dir_next`.
#[repr(C)]
pub struct RegislexDirEntry {
    /// Entry name (no directory part), NUL-terminated.
    pub name: [c_char; REGISLEX_DIR_NAME_MAX],
    pub is_directory: bool,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time in Unix seconds.
    pub modified_time: i64,
}

/// Open `path` for iteration. `.` and `..` are never reported.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `iter_out` valid for
/// writes. Release the iterator with `regislex_dir_close`.
///
/// # Example (C)
///
/// ```c
/// RegislexDirIter* it;
/// RegislexDirEntry entry;
/// bool has_entry;
/// if (regislex_dir_open("/var/cases", &it) == REGISLEX_OK) {
///     while (regislex_dir_next(it, &entry, &has_entry) == REGISLEX_OK && has_entry) {
///         printf("%s\n", entry.name);
///     }
///     regislex_dir_close(it);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn regislex_dir_open(
    path: *const c_char,
    iter_out: *mut *mut RegislexDirIter,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    if iter_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let inner = try_pal!(DirIter::open(path));
    write_out(iter_out, Box::into_raw(Box::new(RegislexDirIter { inner })))
}

/// Advance the iterator.
///
/// On success `*has_entry_out` tells whether `*entry_out` was filled; false
/// means the listing is exhausted.
///
/// # Safety
///
/// `iter` must come from `regislex_dir_open`; `entry_out` and
/// `has_entry_out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_dir_next(
    iter: *mut RegislexDirIter,
    entry_out: *mut RegislexDirEntry,
    has_entry_out: *mut bool,
) -> RegislexErrorCode {
    if iter.is_null() || entry_out.is_null() || has_entry_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let iter = &mut *iter;
    let Some(entry) = try_pal!(iter.inner.next_entry()) else {
        *has_entry_out = false;
        return RegislexErrorCode::Ok;
    };

    let out = &mut *entry_out;
    let code = write_str(&entry.name, out.name.as_mut_ptr(), REGISLEX_DIR_NAME_MAX);
    if code != RegislexErrorCode::Ok {
        return code;
    }
    out.is_directory = entry.is_directory;
    out.size = entry.size;
    out.modified_time = entry.modified_time;
    *has_entry_out = true;
    RegislexErrorCode::Ok
}

/// Release an iterator. Null is a no-op.
///
/// # Safety
///
/// `iter` must be null or come from `regislex_dir_open`, closed once.
#[no_mangle]
pub unsafe extern "C" fn regislex_dir_close(iter: *mut RegislexDirIter) {
    if !iter.is_null() {
        Box::from_raw(iter).inner.close();
    }
}

impl Default for RegislexDirEntry {
    fn default() -> Self {
        Self {
            name: [0; REGISLEX_DIR_NAME_MAX],
            is_directory: false,
            size: 0,
            modified_time: 0,
        }
    }
}
