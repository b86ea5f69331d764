//! Process, host, randomness and dynamic library exports.

use std::os::raw::{c_char, c_void};
use std::slice;

use regislex_sys::Library;

use crate::args::{opt_str_arg, str_arg, try_arg, try_pal, write_out, write_str};
use crate::error::{status, RegislexErrorCode};

// ============================================================================
// Process and environment
// ============================================================================

/// Identifier of the calling process.
#[no_mangle]
pub extern "C" fn regislex_process_id() -> u32 {
    regislex_sys::process_id()
}

/// Copy the value of environment variable `name` into `buf`.
///
/// An unset variable is `REGISLEX_ERR_NOT_FOUND`.
///
/// # Safety
///
/// `name` must be a valid NUL-terminated string and `buf` writable for
/// `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_get_env(
    name: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> RegislexErrorCode {
    let name = try_arg!(str_arg(name));
    match regislex_sys::get_env(name) {
        Some(value) => write_str(&value, buf, size),
        None => RegislexErrorCode::NotFound,
    }
}

/// Set environment variable `name`, or remove it when `value` is null.
///
/// # Safety
///
/// `name` must be a valid NUL-terminated string; `value` null or one.
#[no_mangle]
pub unsafe extern "C" fn regislex_set_env(
    name: *const c_char,
    value: *const c_char,
) -> RegislexErrorCode {
    let name = try_arg!(str_arg(name));
    let value = try_arg!(opt_str_arg(value));
    status(regislex_sys::set_env(name, value))
}

// ============================================================================
// Host
// ============================================================================

/// Copy the host name into `buf`.
///
/// # Safety
///
/// `buf` must be writable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn regislex_hostname(buf: *mut c_char, size: usize) -> RegislexErrorCode {
    let name = try_pal!(regislex_sys::hostname());
    write_str(&name, buf, size)
}

/// Number of logical CPUs available to the process (at least 1).
#[no_mangle]
pub extern "C" fn regislex_cpu_count() -> u32 {
    u32::try_from(regislex_sys::cpu_count()).unwrap_or(u32::MAX)
}

/// Total physical memory in bytes.
///
/// # Safety
///
/// `bytes_out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_total_memory(bytes_out: *mut u64) -> RegislexErrorCode {
    if bytes_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(bytes_out, try_pal!(regislex_sys::total_memory()))
}

/// Memory currently available to new allocations, in bytes.
///
/// # Safety
///
/// `bytes_out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_available_memory(bytes_out: *mut u64) -> RegislexErrorCode {
    if bytes_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(bytes_out, try_pal!(regislex_sys::available_memory()))
}

// ============================================================================
// Randomness
// ============================================================================

/// Fill `buf` with `len` bytes from the OS CSPRNG. `len == 0` is a no-op.
///
/// # Safety
///
/// `buf` must be writable for `len` bytes (may be null when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn regislex_random_bytes(buf: *mut u8, len: usize) -> RegislexErrorCode {
    if len == 0 {
        return RegislexErrorCode::Ok;
    }
    if buf.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    status(regislex_sys::random_bytes(slice::from_raw_parts_mut(buf, len)))
}

/// Draw a uniformly distributed `u32` from the OS CSPRNG.
///
/// # Safety
///
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_random_u32(out: *mut u32) -> RegislexErrorCode {
    if out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(out, try_pal!(regislex_sys::random_u32()))
}

/// Draw a uniformly distributed `u64` from the OS CSPRNG.
///
/// # Safety
///
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_random_u64(out: *mut u64) -> RegislexErrorCode {
    if out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(out, try_pal!(regislex_sys::random_u64()))
}

// ============================================================================
// Dynamic libraries
// ============================================================================

/// Opaque handle to a loaded shared library.
pub struct RegislexLibrary {
    inner: Library,
}

/// Load a shared library.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string and `lib_out` valid for
/// writes. Loading runs the library's initializers. Release with
/// `regislex_library_unload`.
///
/// # Example (C)
///
/// ```c
/// RegislexLibrary* lib;
/// void* sym;
/// if (regislex_library_load("libcasefmt.so", &lib) == REGISLEX_OK) {
///     regislex_library_symbol(lib, "casefmt_render", &sym);
///     /* ... */
///     regislex_library_unload(lib);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn regislex_library_load(
    path: *const c_char,
    lib_out: *mut *mut RegislexLibrary,
) -> RegislexErrorCode {
    let path = try_arg!(str_arg(path));
    if lib_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    let inner = try_pal!(Library::load(path));
    write_out(lib_out, Box::into_raw(Box::new(RegislexLibrary { inner })))
}

/// Look up `name` in a loaded library.
///
/// # Safety
///
/// `lib` must be live, `name` a valid NUL-terminated string and `sym_out`
/// valid for writes. The address is only valid until the library is
/// unloaded.
#[no_mangle]
pub unsafe extern "C" fn regislex_library_symbol(
    lib: *mut RegislexLibrary,
    name: *const c_char,
    sym_out: *mut *mut c_void,
) -> RegislexErrorCode {
    let Some(lib) = lib.as_ref() else {
        return RegislexErrorCode::InvalidArgument;
    };
    let name = try_arg!(str_arg(name));
    if sym_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(sym_out, try_pal!(lib.inner.symbol_address(name)))
}

/// Unload a library and release its handle, even if unloading fails.
///
/// # Safety
///
/// `lib` must come from `regislex_library_load`, unloaded once.
#[no_mangle]
pub unsafe extern "C" fn regislex_library_unload(lib: *mut RegislexLibrary) -> RegislexErrorCode {
    if lib.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    status(Box::from_raw(lib).inner.unload())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    #[test]
    fn env_round_trip() {
        let name = c"REGISLEX_FFI_TEST_MATTER";
        let mut buf = [0 as c_char; 32];
        unsafe {
            assert_eq!(
                regislex_set_env(name.as_ptr(), c"2024-CV-0117".as_ptr()),
                RegislexErrorCode::Ok
            );
            assert_eq!(
                regislex_get_env(name.as_ptr(), buf.as_mut_ptr(), buf.len()),
                RegislexErrorCode::Ok
            );
            assert_eq!(CStr::from_ptr(buf.as_ptr()), c"2024-CV-0117");

            assert_eq!(
                regislex_set_env(name.as_ptr(), ptr::null()),
                RegislexErrorCode::Ok
            );
            assert_eq!(
                regislex_get_env(name.as_ptr(), buf.as_mut_ptr(), buf.len()),
                RegislexErrorCode::NotFound
            );
            assert_eq!(
                regislex_set_env(c"BAD=NAME".as_ptr(), c"x".as_ptr()),
                RegislexErrorCode::InvalidArgument
            );
        }
    }

    #[test]
    fn host_queries() {
        assert!(regislex_process_id() > 0);
        assert!(regislex_cpu_count() >= 1);
        let mut total = 0u64;
        assert_eq!(
            unsafe { regislex_total_memory(&mut total) },
            RegislexErrorCode::Ok
        );
        assert!(total > 0);

        let mut buf = [0 as c_char; 256];
        assert_eq!(
            unsafe { regislex_hostname(buf.as_mut_ptr(), buf.len()) },
            RegislexErrorCode::Ok
        );
        assert!(!unsafe { CStr::from_ptr(buf.as_ptr()) }.is_empty());
    }

    #[test]
    fn random_bytes_fills_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        unsafe {
            assert_eq!(regislex_random_bytes(a.as_mut_ptr(), a.len()), RegislexErrorCode::Ok);
            assert_eq!(regislex_random_bytes(b.as_mut_ptr(), b.len()), RegislexErrorCode::Ok);
            assert_eq!(regislex_random_bytes(ptr::null_mut(), 0), RegislexErrorCode::Ok);
            assert_eq!(
                regislex_random_bytes(ptr::null_mut(), 4),
                RegislexErrorCode::InvalidArgument
            );
        }
        assert_ne!(a, b);
    }

    #[test]
    fn random_integers() {
        let mut draws = [0u64; 8];
        for slot in draws.iter_mut() {
            assert_eq!(unsafe { regislex_random_u64(slot) }, RegislexErrorCode::Ok);
        }
        assert!(draws.windows(2).any(|w| w[0] != w[1]));

        let mut small = 0u32;
        assert_eq!(unsafe { regislex_random_u32(&mut small) }, RegislexErrorCode::Ok);
        assert_eq!(
            unsafe { regislex_random_u32(ptr::null_mut()) },
            RegislexErrorCode::InvalidArgument
        );
        assert_eq!(
            unsafe { regislex_random_u64(ptr::null_mut()) },
            RegislexErrorCode::InvalidArgument
        );
    }

    #[test]
    fn missing_library_is_not_found() {
        let mut lib = ptr::null_mut();
        let code =
            unsafe { regislex_library_load(c"libregislex-does-not-exist.so".as_ptr(), &mut lib) };
        assert_eq!(code, RegislexErrorCode::NotFound);
        assert!(lib.is_null());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn loads_libc_symbol() {
        let mut lib = ptr::null_mut();
        unsafe {
            assert_eq!(
                regislex_library_load(c"libc.so.6".as_ptr(), &mut lib),
                RegislexErrorCode::Ok
            );
            let mut sym = ptr::null_mut();
            assert_eq!(
                regislex_library_symbol(lib, c"strlen".as_ptr(), &mut sym),
                RegislexErrorCode::Ok
            );
            assert!(!sym.is_null());
            assert_eq!(
                regislex_library_symbol(lib, c"regislex_no_such_symbol".as_ptr(), &mut sym),
                RegislexErrorCode::NotFound
            );
            assert_eq!(regislex_library_unload(lib), RegislexErrorCode::Ok);
        }
    }
}
