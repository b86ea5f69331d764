//! regislex-ffi: C-ABI exports for the RegisLex platform abstraction layer
//!
//! One `extern "C"` function per operation, each prefixed `regislex_`.
//!
//! # Memory Management
//!
//! String outputs are written into caller-owned `(buf, size)` pairs and are
//! always NUL-terminated. A buffer that cannot hold the result and its
//! terminator yields `REGISLEX_ERR_INVALID_ARGUMENT`.
//!
//! Opaque handles (`RegislexDirIter`, `RegislexThread`, `RegislexMutex`,
//! `RegislexCond`, `RegislexRwLock`, `RegislexNetContext`,
//! `RegislexSocket`, `RegislexLibrary`) are heap-allocated by their
//! create/open function and released by the matching destroy/close
//! function.
//!
//! Raw blocks come from `regislex_malloc` and friends and go back through
//! `regislex_free`.
//!
//! # Error Handling
//!
//! Functions return `RegislexErrorCode`. The code is the whole report:
//! there is no thread-local error state to query afterwards.
//!
//! # ABI Version
//!
//! Check `regislex_abi_version()` for ABI compatibility. The ABI version
//! increments when breaking changes are made to the FFI interface.

use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::OnceLock;

use regislex_core::get_platform;

mod args;
mod error;
mod fs;
mod memory;
mod net;
mod sync;
mod sys;
mod time;

pub use error::RegislexErrorCode;

pub use fs::{
    regislex_copy_file, regislex_current_dir, regislex_dir_close, regislex_dir_next,
    regislex_dir_open, regislex_exists, regislex_file_size, regislex_get_dirname,
    regislex_get_extension, regislex_get_filename, regislex_home_dir, regislex_is_directory,
    regislex_is_file, regislex_mkdir, regislex_modified_time, regislex_normalize_path,
    regislex_path_join, regislex_remove_file, regislex_rename, regislex_rmdir,
    regislex_temp_dir, RegislexDirEntry, RegislexDirIter, REGISLEX_DIR_NAME_MAX,
};
pub use memory::{
    regislex_calloc, regislex_free, regislex_malloc, regislex_realloc, regislex_strdup,
};
pub use net::{
    regislex_net_cleanup, regislex_net_init, regislex_socket_accept, regislex_socket_bind,
    regislex_socket_close, regislex_socket_connect, regislex_socket_create,
    regislex_socket_listen, regislex_socket_local_port, regislex_socket_recv,
    regislex_socket_send, regislex_socket_set_nonblocking, regislex_socket_set_timeout,
    RegislexNetContext, RegislexSocket, REGISLEX_SOCK_TCP, REGISLEX_SOCK_UDP,
};
pub use sync::{
    regislex_atomic_add32, regislex_atomic_add64, regislex_atomic_cas32, regislex_atomic_cas64,
    regislex_atomic_cas_ptr, regislex_atomic_load32, regislex_atomic_load64,
    regislex_atomic_load_ptr, regislex_atomic_store32, regislex_atomic_store64,
    regislex_atomic_store_ptr, regislex_atomic_sub32, regislex_atomic_sub64,
    regislex_cond_broadcast, regislex_cond_create, regislex_cond_destroy, regislex_cond_signal,
    regislex_cond_timedwait, regislex_cond_wait, regislex_mutex_create, regislex_mutex_destroy,
    regislex_mutex_lock, regislex_mutex_trylock, regislex_mutex_unlock,
    regislex_rwlock_create, regislex_rwlock_destroy, regislex_rwlock_rdlock,
    regislex_rwlock_tryrdlock, regislex_rwlock_trywrlock, regislex_rwlock_unlock,
    regislex_rwlock_wrlock, regislex_thread_create, regislex_thread_detach,
    regislex_thread_join, regislex_thread_yield, RegislexCond, RegislexMutex, RegislexRwLock,
    RegislexThread, RegislexThreadFn,
};
pub use sys::{
    regislex_available_memory, regislex_cpu_count, regislex_get_env, regislex_hostname,
    regislex_library_load, regislex_library_symbol, regislex_library_unload,
    regislex_process_id, regislex_random_bytes, regislex_random_u32, regislex_random_u64,
    regislex_set_env, regislex_total_memory, RegislexLibrary,
};
pub use time::{
    regislex_format_iso8601, regislex_monotonic_ns, regislex_now_ms, regislex_now_secs,
    regislex_now_us, regislex_parse_iso8601, regislex_sleep_ms, REGISLEX_TZ_LOCAL,
    REGISLEX_TZ_UTC,
};

// ============================================================================
// Version Constants
// ============================================================================

/// Library version string, NUL-terminated for C.
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// ABI version number.
///
/// Incremented when breaking changes are made to the FFI interface:
/// - Function signatures change
/// - Struct layouts change
/// - Enum values change
/// - Error code semantics change
///
/// Minor additions (new functions) do not increment the ABI version.
const ABI_VERSION: u32 = 1;

// ============================================================================
// Platform Constants
// ============================================================================

#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_PATH_SEPARATOR: c_char = regislex_core::PATH_SEPARATOR as c_char;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_PATH_LIST_SEPARATOR: c_char = regislex_core::PATH_LIST_SEPARATOR as c_char;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_MAX_PATH: usize = regislex_core::MAX_PATH;

// ============================================================================
// Version Functions
// ============================================================================

/// Get the library version string.
///
/// Returns a static string like "0.1.0". The pointer is valid for the
/// lifetime of the library and must NOT be freed.
///
/// # Example (C)
///
/// ```c
/// printf("regislex version: %s\n", regislex_version());
/// ```
#[no_mangle]
pub extern "C" fn regislex_version() -> *const c_char {
    VERSION.as_ptr().cast()
}

/// Get the ABI version number.
///
/// # Example (C)
///
/// ```c
/// if (regislex_abi_version() != EXPECTED_ABI_VERSION) {
///     fprintf(stderr, "ABI mismatch\n");
/// }
/// ```
#[no_mangle]
pub extern "C" fn regislex_abi_version() -> u32 {
    ABI_VERSION
}

// ============================================================================
// Platform Detection
// ============================================================================

/// Returns the current platform name ("linux", "macos", "windows", ...).
///
/// The pointer is static and must NOT be freed.
#[no_mangle]
pub extern "C" fn regislex_get_platform() -> *const c_char {
    static PLATFORM_CSTR: OnceLock<CString> = OnceLock::new();
    PLATFORM_CSTR
        .get_or_init(|| CString::new(get_platform()).unwrap_or_default())
        .as_ptr()
}

/// True when the build targets a POSIX system.
#[no_mangle]
pub extern "C" fn regislex_is_posix() -> bool {
    regislex_core::is_posix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_version() {
        let ver = unsafe { CStr::from_ptr(regislex_version()) };
        assert_eq!(ver.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_abi_version() {
        assert_eq!(regislex_abi_version(), 1);
    }

    #[test]
    fn test_get_platform_is_stable() {
        let first = regislex_get_platform();
        let second = regislex_get_platform();
        assert_eq!(first, second);
        let name = unsafe { CStr::from_ptr(first) };
        assert_eq!(name.to_str().unwrap(), get_platform());
    }

    #[test]
    fn test_platform_constants() {
        assert_eq!(REGISLEX_PATH_SEPARATOR as u8 as char, regislex_core::PATH_SEPARATOR);
        assert_eq!(REGISLEX_MAX_PATH, regislex_core::MAX_PATH);
        assert_eq!(regislex_is_posix(), !cfg!(windows));
    }
}
