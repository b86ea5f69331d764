//! Memory facade over the C allocator.
//!
//! Blocks from these functions may be passed to C code that calls `free`
//! directly, and vice versa.

use std::os::raw::{c_char, c_void};
use std::ptr;

/// Allocate `size` bytes. Returns null on failure or when `size` is 0.
#[no_mangle]
pub extern "C" fn regislex_malloc(size: usize) -> *mut c_void {
    if size == 0 {
        return ptr::null_mut();
    }
    // SAFETY: malloc has no preconditions.
    unsafe { libc::malloc(size) }
}

/// Allocate zeroed storage for `count` items of `size` bytes.
///
/// Returns null on failure, on overflow of `count * size`, or when the
/// product is 0.
#[no_mangle]
pub extern "C" fn regislex_calloc(count: usize, size: usize) -> *mut c_void {
    match count.checked_mul(size) {
        Some(0) | None => ptr::null_mut(),
        // SAFETY: calloc has no preconditions.
        Some(_) => unsafe { libc::calloc(count, size) },
    }
}

/// Resize a block. A null `ptr` behaves like `regislex_malloc`.
///
/// On failure the original block is left untouched and null is returned.
///
/// # Safety
///
/// `ptr` must be null or a live block from this allocator.
#[no_mangle]
pub unsafe extern "C" fn regislex_realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    if ptr.is_null() {
        return regislex_malloc(size);
    }
    if size == 0 {
        // Never hand out a zero-sized block; keep the caller's block alive.
        return ptr::null_mut();
    }
    libc::realloc(ptr, size)
}

/// Release a block. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a live block from this allocator, freed once.
#[no_mangle]
pub unsafe extern "C" fn regislex_free(ptr: *mut c_void) {
    if !ptr.is_null() {
        libc::free(ptr);
    }
}

/// Duplicate a NUL-terminated string into a new block.
///
/// Returns null when `s` is null or allocation fails. Release the copy
/// with `regislex_free`.
///
/// # Safety
///
/// `s` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn regislex_strdup(s: *const c_char) -> *mut c_char {
    if s.is_null() {
        return ptr::null_mut();
    }
    let len = libc::strlen(s);
    let copy = regislex_malloc(len + 1).cast::<c_char>();
    if copy.is_null() {
        return ptr::null_mut();
    }
    ptr::copy_nonoverlapping(s, copy, len + 1);
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn calloc_zeroes_and_guards_overflow() {
        let p = regislex_calloc(16, 4).cast::<u8>();
        assert!(!p.is_null());
        let bytes = unsafe { std::slice::from_raw_parts(p, 64) };
        assert!(bytes.iter().all(|&b| b == 0));
        unsafe { regislex_free(p.cast()) };

        assert!(regislex_calloc(usize::MAX, 2).is_null());
        assert!(regislex_calloc(0, 8).is_null());
    }

    #[test]
    fn realloc_preserves_prefix() {
        let p = regislex_malloc(4).cast::<u8>();
        assert!(!p.is_null());
        unsafe {
            p.copy_from_nonoverlapping(b"abcd".as_ptr(), 4);
            let q = regislex_realloc(p.cast(), 1024).cast::<u8>();
            assert!(!q.is_null());
            assert_eq!(std::slice::from_raw_parts(q, 4), b"abcd");
            regislex_free(q.cast());
        }
    }

    #[test]
    fn strdup_copies() {
        let original = c"case-2024-001";
        let copy = unsafe { regislex_strdup(original.as_ptr()) };
        assert!(!copy.is_null());
        assert_ne!(copy.cast_const(), original.as_ptr());
        assert_eq!(unsafe { CStr::from_ptr(copy) }, original);
        unsafe { regislex_free(copy.cast()) };

        assert!(unsafe { regislex_strdup(ptr::null()) }.is_null());
    }

    #[test]
    fn free_null_is_safe() {
        unsafe { regislex_free(ptr::null_mut()) };
        assert!(regislex_malloc(0).is_null());
    }
}
