//! Cryptographically secure random bytes.
//!
//! Every byte comes from the operating system CSPRNG (`getrandom(2)`,
//! `getentropy`, `ProcessPrng`/`BCryptGenRandom`). There is no fallback to a
//! weaker generator: if the OS source fails, the call fails.

use regislex_core::{PalError, PalResult};

/// Fill `buf` with random bytes. An empty buffer is a no-op.
pub fn random_bytes(buf: &mut [u8]) -> PalResult<()> {
    if buf.is_empty() {
        return Ok(());
    }
    getrandom::getrandom(buf).map_err(map_error)
}

pub fn random_u32() -> PalResult<u32> {
    let mut bytes = [0u8; 4];
    random_bytes(&mut bytes)?;
    Ok(u32::from_ne_bytes(bytes))
}

pub fn random_u64() -> PalResult<u64> {
    let mut bytes = [0u8; 8];
    random_bytes(&mut bytes)?;
    Ok(u64::from_ne_bytes(bytes))
}

fn map_error(e: getrandom::Error) -> PalError {
    match e.raw_os_error() {
        Some(code) => PalError::from_raw_os_error("random_bytes", code),
        None => PalError::failed("random_bytes", e.to_string()),
    }
}
