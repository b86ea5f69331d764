//! Windows host queries.
//!
//! - `GlobalMemoryStatusEx` - physical memory totals
//! - `GetComputerNameExW(ComputerNameDnsHostname)` - host name

use std::mem;

use regislex_core::{PalError, PalResult};
use windows_sys::Win32::System::SystemInformation::{
    ComputerNameDnsHostname, GetComputerNameExW, GlobalMemoryStatusEx, MEMORYSTATUSEX,
};

fn memory_status(operation: &str) -> PalResult<MEMORYSTATUSEX> {
    // SAFETY: MEMORYSTATUSEX is plain old data; dwLength is set as required.
    let mut status: MEMORYSTATUSEX = unsafe { mem::zeroed() };
    status.dwLength = mem::size_of::<MEMORYSTATUSEX>() as u32;
    if unsafe { GlobalMemoryStatusEx(&mut status) } == 0 {
        return Err(PalError::last_os_error(operation));
    }
    Ok(status)
}

pub fn total_memory_impl() -> PalResult<u64> {
    memory_status("total_memory").map(|s| s.ullTotalPhys)
}

pub fn available_memory_impl() -> PalResult<u64> {
    memory_status("available_memory").map(|s| s.ullAvailPhys)
}

pub fn hostname_impl() -> PalResult<String> {
    let mut size: u32 = 0;
    // First call reports the required size, including the terminator.
    unsafe { GetComputerNameExW(ComputerNameDnsHostname, std::ptr::null_mut(), &mut size) };
    if size == 0 {
        return Err(PalError::last_os_error("hostname"));
    }

    let mut buf = vec![0u16; size as usize];
    // SAFETY: buf holds `size` UTF-16 units.
    let ok = unsafe { GetComputerNameExW(ComputerNameDnsHostname, buf.as_mut_ptr(), &mut size) };
    if ok == 0 {
        return Err(PalError::last_os_error("hostname"));
    }
    buf.truncate(size as usize);
    String::from_utf16(&buf)
        .map_err(|_| PalError::failed("hostname", "host name is not valid UTF-16"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_values_are_consistent() {
        let total = total_memory_impl().unwrap();
        let available = available_memory_impl().unwrap();
        assert!(total > 0);
        assert!(available <= total);
        assert!(!hostname_impl().unwrap().is_empty());
    }
}
