//! Argument marshalling shared by the exported functions.
//!
//! Inputs arrive as NUL-terminated UTF-8 strings; string outputs go to a
//! caller-owned `(buf, size)` pair and are always NUL-terminated.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use crate::error::RegislexErrorCode;

/// Borrow a required C string argument.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char) -> Result<&'a str, RegislexErrorCode> {
    if ptr.is_null() {
        return Err(RegislexErrorCode::InvalidArgument);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| RegislexErrorCode::InvalidArgument)
}

/// Borrow an optional C string argument (null means absent).
///
/// # Safety
///
/// Same contract as [`str_arg`].
pub(crate) unsafe fn opt_str_arg<'a>(
    ptr: *const c_char,
) -> Result<Option<&'a str>, RegislexErrorCode> {
    if ptr.is_null() {
        Ok(None)
    } else {
        str_arg(ptr).map(Some)
    }
}

/// Copy `value` plus a terminating NUL into `buf`.
///
/// Fails with `InvalidArgument` (leaving `buf` untouched) if `buf` is null
/// or `size` cannot hold the string and its terminator.
///
/// # Safety
///
/// `buf` must be null or writable for `size` bytes.
pub(crate) unsafe fn write_str(value: &str, buf: *mut c_char, size: usize) -> RegislexErrorCode {
    if buf.is_null() || value.len() >= size || value.as_bytes().contains(&0) {
        return RegislexErrorCode::InvalidArgument;
    }
    ptr::copy_nonoverlapping(value.as_ptr(), buf.cast::<u8>(), value.len());
    *buf.add(value.len()) = 0;
    RegislexErrorCode::Ok
}

/// Store `value` through a required out-pointer.
///
/// # Safety
///
/// `out` must be null or valid for writes.
pub(crate) unsafe fn write_out<T>(out: *mut T, value: T) -> RegislexErrorCode {
    if out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    out.write(value);
    RegislexErrorCode::Ok
}

/// Unwrap a `Result<T, RegislexErrorCode>` or return its code.
macro_rules! try_arg {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(code) => return code,
        }
    };
}

/// Unwrap a `PalResult<T>` or return its code.
macro_rules! try_pal {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(e) => return $crate::error::RegislexErrorCode::from(&e),
        }
    };
}

pub(crate) use {try_arg, try_pal};
