//! macOS/iOS memory figures.
//!
//! - `sysctlbyname("hw.memsize")` - installed physical memory
//! - `host_statistics64(HOST_VM_INFO64)` - free and inactive page counts

use std::ffi::CStr;
use std::mem;

use libc::{c_int, c_uint, c_void, mach_port_t};
use regislex_core::{PalError, PalResult};

const HOST_VM_INFO64: c_int = 4;
const KERN_SUCCESS: c_int = 0;

extern "C" {
    fn mach_host_self() -> mach_port_t;
    fn host_statistics64(
        host: mach_port_t,
        flavor: c_int,
        info: *mut c_int,
        count: *mut c_uint,
    ) -> c_int;
}

pub fn total_memory_impl() -> PalResult<u64> {
    let name: &CStr = c"hw.memsize";
    let mut value: u64 = 0;
    let mut len = mem::size_of::<u64>();

    // SAFETY: value/len describe a valid u64 out-buffer.
    let ret = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            &mut value as *mut u64 as *mut c_void,
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    if ret != 0 {
        return Err(PalError::last_os_error("total_memory"));
    }
    Ok(value)
}

pub fn available_memory_impl() -> PalResult<u64> {
    // SAFETY: vm_statistics64 is plain old data.
    let mut stats: libc::vm_statistics64 = unsafe { mem::zeroed() };
    let mut count = (mem::size_of::<libc::vm_statistics64>() / mem::size_of::<c_int>()) as c_uint;

    // SAFETY: stats/count describe a buffer of `count` integers.
    let kr = unsafe {
        host_statistics64(
            mach_host_self(),
            HOST_VM_INFO64,
            &mut stats as *mut libc::vm_statistics64 as *mut c_int,
            &mut count,
        )
    };
    if kr != KERN_SUCCESS {
        return Err(PalError::failed(
            "available_memory",
            format!("host_statistics64 returned {kr}"),
        ));
    }

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return Err(PalError::last_os_error("available_memory"));
    }

    let pages = u64::from(stats.free_count) + u64::from(stats.inactive_count);
    Ok(pages * page_size as u64)
}
