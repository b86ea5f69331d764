//! Result codes for the C boundary.
//!
//! Every exported function reports its outcome through its return value
//! alone. There is no per-thread "last error" state to query afterwards.

use regislex_core::{ErrorCode, PalError, PalResult};

/// FFI result codes.
///
/// These mirror `regislex_core::ErrorCode` value for value. `Ok` is zero and
/// every failure is negative.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegislexErrorCode {
    /// Operation succeeded.
    Ok = 0,
    /// Generic failure.
    Error = -1,
    /// Invalid argument (including null pointers and short buffers).
    InvalidArgument = -2,
    /// Allocation failed.
    OutOfMemory = -3,
    /// Target does not exist.
    NotFound = -4,
    /// Target already exists.
    AlreadyExists = -5,
    /// Caller lacks permission.
    PermissionDenied = -6,
    /// Underlying I/O failure.
    Io = -7,
    /// Deadline elapsed.
    Timeout = -8,
    /// Operation would block.
    WouldBlock = -9,
    /// Not supported on this platform.
    NotSupported = -10,
}

// ----------------------------------------------------------------------------
// C-friendly constants
// ----------------------------------------------------------------------------
//
// Stable `REGISLEX_*` names for the generated header, independent of how the
// header generator spells enum variants.

#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_OK: RegislexErrorCode = RegislexErrorCode::Ok;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERROR: RegislexErrorCode = RegislexErrorCode::Error;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_INVALID_ARGUMENT: RegislexErrorCode = RegislexErrorCode::InvalidArgument;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_OUT_OF_MEMORY: RegislexErrorCode = RegislexErrorCode::OutOfMemory;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_NOT_FOUND: RegislexErrorCode = RegislexErrorCode::NotFound;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_ALREADY_EXISTS: RegislexErrorCode = RegislexErrorCode::AlreadyExists;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_PERMISSION_DENIED: RegislexErrorCode = RegislexErrorCode::PermissionDenied;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_IO: RegislexErrorCode = RegislexErrorCode::Io;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_TIMEOUT: RegislexErrorCode = RegislexErrorCode::Timeout;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_WOULD_BLOCK: RegislexErrorCode = RegislexErrorCode::WouldBlock;
#[allow(dead_code)] // exported for the generated C header
pub const REGISLEX_ERR_NOT_SUPPORTED: RegislexErrorCode = RegislexErrorCode::NotSupported;

impl From<ErrorCode> for RegislexErrorCode {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Ok => RegislexErrorCode::Ok,
            ErrorCode::Error => RegislexErrorCode::Error,
            ErrorCode::InvalidArgument => RegislexErrorCode::InvalidArgument,
            ErrorCode::OutOfMemory => RegislexErrorCode::OutOfMemory,
            ErrorCode::NotFound => RegislexErrorCode::NotFound,
            ErrorCode::AlreadyExists => RegislexErrorCode::AlreadyExists,
            ErrorCode::PermissionDenied => RegislexErrorCode::PermissionDenied,
            ErrorCode::Io => RegislexErrorCode::Io,
            ErrorCode::Timeout => RegislexErrorCode::Timeout,
            ErrorCode::WouldBlock => RegislexErrorCode::WouldBlock,
            ErrorCode::NotSupported => RegislexErrorCode::NotSupported,
        }
    }
}

impl From<&PalError> for RegislexErrorCode {
    fn from(err: &PalError) -> Self {
        err.code().into()
    }
}

/// Collapse a unit result into its code.
pub(crate) fn status(result: PalResult<()>) -> RegislexErrorCode {
    match result {
        Ok(()) => RegislexErrorCode::Ok,
        Err(e) => RegislexErrorCode::from(&e),
    }
}
