//! Winsock lifetime.
//!
//! `WSAStartup` is reference counted by Winsock itself, so every
//! successful call is balanced by exactly one `WSACleanup`.

use std::mem::MaybeUninit;

use regislex_core::{PalError, PalResult};
use windows_sys::Win32::Networking::WinSock::{WSACleanup, WSAStartup, WSADATA};

/// Winsock 2.2
const WINSOCK_VERSION: u16 = 0x0202;

pub(crate) fn startup() -> PalResult<()> {
    let mut data = MaybeUninit::<WSADATA>::uninit();
    // SAFETY: WSAStartup fills `data`; we never read it.
    let rc = unsafe { WSAStartup(WINSOCK_VERSION, data.as_mut_ptr()) };
    if rc != 0 {
        return Err(PalError::from_raw_os_error("net_init", rc));
    }
    Ok(())
}

pub(crate) fn cleanup() {
    // SAFETY: only called once per successful startup().
    unsafe {
        WSACleanup();
    }
}
