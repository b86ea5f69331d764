//! Unix host queries shared by every Unix target, plus the `sysconf`
//! memory fallback for Unix systems without a dedicated backend.

use regislex_core::{PalError, PalResult};

/// POSIX upper bound on host name length, excluding the terminator.
const HOST_NAME_MAX: usize = 255;

pub fn hostname_impl() -> PalResult<String> {
    let mut buf = vec![0u8; HOST_NAME_MAX + 1];

    // SAFETY: buf is writable for buf.len() bytes.
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if ret != 0 {
        return Err(PalError::last_os_error("hostname"));
    }

    // POSIX does not promise termination on truncation
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    buf.truncate(len);
    String::from_utf8(buf)
        .map_err(|_| PalError::failed("hostname", "host name is not valid UTF-8"))
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
pub fn total_memory_impl() -> PalResult<u64> {
    // SAFETY: sysconf has no memory-safety preconditions.
    let (pages, page_size) =
        unsafe { (libc::sysconf(libc::_SC_PHYS_PAGES), libc::sysconf(libc::_SC_PAGESIZE)) };
    if pages <= 0 || page_size <= 0 {
        return Err(PalError::last_os_error("total_memory"));
    }
    Ok(pages as u64 * page_size as u64)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
pub fn available_memory_impl() -> PalResult<u64> {
    Err(PalError::not_supported(
        "available_memory",
        regislex_core::get_platform(),
    ))
}
