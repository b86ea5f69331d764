//! Error types for PAL operations.
//!
//! This module defines the error taxonomy shared by every RegisLex PAL crate:
//! - [`ErrorCode`] - The closed, C-compatible result-code vocabulary
//! - [`PalError`] - Structured error carried by the Rust APIs
//!
//! ## Design Principles
//!
//! - **Closed**: Every native error (`errno`, `GetLastError`, WSA codes) maps
//!   onto exactly one [`ErrorCode`]; nothing else crosses the API boundary
//! - **Structured**: Errors carry the operation name, not just a message
//! - **Return-value only**: No thread-local "last error" side channel
//! - **Secure**: No paths or credentials in error messages

use std::io;
use thiserror::Error;

// ============================================================================
// Result Codes
// ============================================================================

/// Result code returned across the C boundary.
///
/// `Ok` is zero; every failure is negative and distinct.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Operation succeeded.
    Ok = 0,
    /// Generic failure with no better classification.
    Error = -1,
    /// Caller supplied an invalid argument.
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
    /// Operation would block and was not attempted.
    WouldBlock = -9,
    /// Operation not supported on this platform.
    NotSupported = -10,
}

impl ErrorCode {
    /// All codes, in declaration order.
    pub const ALL: [ErrorCode; 11] = [
        ErrorCode::Ok,
        ErrorCode::Error,
        ErrorCode::InvalidArgument,
        ErrorCode::OutOfMemory,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::PermissionDenied,
        ErrorCode::Io,
        ErrorCode::Timeout,
        ErrorCode::WouldBlock,
        ErrorCode::NotSupported,
    ];

    /// Integer value of this code.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Convert an integer back into a code.
    ///
    /// Returns `None` for values outside the closed set.
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_i32() == value)
    }

    /// Stable upper-case name (e.g., `"NOT_FOUND"`).
    pub const fn name(self) -> &'static str {
        match self {
            ErrorCode::Ok => "OK",
            ErrorCode::Error => "ERROR",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::OutOfMemory => "OUT_OF_MEMORY",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::Io => "IO",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::WouldBlock => "WOULD_BLOCK",
            ErrorCode::NotSupported => "NOT_SUPPORTED",
        }
    }
}

// ============================================================================
// Canonical Error Type
// ============================================================================

/// Canonical error type for all PAL operations.
///
/// ## Code Mapping
///
/// | Variant | Code |
/// |---------|------|
/// | `Failed` | `ERROR` (-1) |
/// | `InvalidArgument` | `INVALID_ARGUMENT` (-2) |
/// | `OutOfMemory` | `OUT_OF_MEMORY` (-3) |
/// | `NotFound` | `NOT_FOUND` (-4) |
/// | `AlreadyExists` | `ALREADY_EXISTS` (-5) |
/// | `PermissionDenied` | `PERMISSION_DENIED` (-6) |
/// | `Io` | `IO` (-7) |
/// | `Timeout` | `TIMEOUT` (-8) |
/// | `WouldBlock` | `WOULD_BLOCK` (-9) |
/// | `NotSupported` | `NOT_SUPPORTED` (-10) |
#[derive(Debug, Error)]
pub enum PalError {
    /// Generic failure.
    ///
    /// Used for failures with no native counterpart (e.g., a panicked thread).
    #[error("Operation '{operation}' failed: {message}")]
    Failed {
        /// The operation that failed.
        operation: String,
        /// Description of the failure.
        message: String,
    },

    /// Invalid argument provided.
    ///
    /// Returned when input validation fails (empty name, interior NUL, bad
    /// timestamp text, undersized output buffer).
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was invalid.
        message: String,
    },

    /// Allocation failed.
    #[error("Out of memory")]
    OutOfMemory,

    /// Target does not exist.
    #[error("Not found during '{operation}'")]
    NotFound {
        /// The operation that looked for the target.
        operation: String,
    },

    /// Target already exists.
    #[error("Already exists during '{operation}'")]
    AlreadyExists {
        /// The operation that attempted creation.
        operation: String,
    },

    /// Permission denied.
    #[error("Permission denied for '{operation}'")]
    PermissionDenied {
        /// The operation that was denied.
        operation: String,
    },

    /// I/O error that maps to no narrower code.
    #[error("I/O error during '{operation}': {source}")]
    Io {
        /// The operation that failed.
        operation: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Deadline elapsed before the awaited event.
    #[error("Operation timed out")]
    Timeout,

    /// Operation could not complete without blocking.
    #[error("Operation would block")]
    WouldBlock,

    /// Operation not supported on the current platform.
    #[error("Operation '{feature}' not supported on {platform}")]
    NotSupported {
        /// The feature that is not supported.
        feature: String,
        /// The platform where it's not supported.
        platform: String,
    },
}

impl PalError {
    /// Get the result code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PalError::Failed { .. } => ErrorCode::Error,
            PalError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            PalError::OutOfMemory => ErrorCode::OutOfMemory,
            PalError::NotFound { .. } => ErrorCode::NotFound,
            PalError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            PalError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            PalError::Io { .. } => ErrorCode::Io,
            PalError::Timeout => ErrorCode::Timeout,
            PalError::WouldBlock => ErrorCode::WouldBlock,
            PalError::NotSupported { .. } => ErrorCode::NotSupported,
        }
    }

    /// Integer form of [`PalError::code`].
    #[inline]
    pub fn error_code(&self) -> i32 {
        self.code().as_i32()
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl PalError {
    /// Create a `Failed` error.
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        PalError::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        PalError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a `NotFound` error.
    pub fn not_found(operation: impl Into<String>) -> Self {
        PalError::NotFound {
            operation: operation.into(),
        }
    }

    /// Create an `AlreadyExists` error.
    pub fn already_exists(operation: impl Into<String>) -> Self {
        PalError::AlreadyExists {
            operation: operation.into(),
        }
    }

    /// Create a `PermissionDenied` error.
    pub fn permission_denied(operation: impl Into<String>) -> Self {
        PalError::PermissionDenied {
            operation: operation.into(),
        }
    }

    /// Create an `Io` error.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        PalError::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a `NotSupported` error.
    pub fn not_supported(feature: impl Into<String>, platform: impl Into<String>) -> Self {
        PalError::NotSupported {
            feature: feature.into(),
            platform: platform.into(),
        }
    }

    /// Map an IO error onto the closed taxonomy.
    ///
    /// | `io::ErrorKind` | Variant |
    /// |-----------------|---------|
    /// | `NotFound` | `NotFound` |
    /// | `PermissionDenied` | `PermissionDenied` |
    /// | `AlreadyExists` | `AlreadyExists` |
    /// | `WouldBlock` | `WouldBlock` |
    /// | `TimedOut` | `Timeout` |
    /// | `InvalidInput`, `InvalidData` | `InvalidArgument` |
    /// | `OutOfMemory` | `OutOfMemory` |
    /// | `Unsupported` | `NotSupported` |
    /// | anything else | `Io` |
    pub fn from_io(operation: impl Into<String>, source: io::Error) -> Self {
        let operation = operation.into();
        match source.kind() {
            io::ErrorKind::NotFound => PalError::NotFound { operation },
            io::ErrorKind::PermissionDenied => PalError::PermissionDenied { operation },
            io::ErrorKind::AlreadyExists => PalError::AlreadyExists { operation },
            io::ErrorKind::WouldBlock => PalError::WouldBlock,
            io::ErrorKind::TimedOut => PalError::Timeout,
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                PalError::InvalidArgument {
                    message: format!("{operation}: {source}"),
                }
            }
            io::ErrorKind::OutOfMemory => PalError::OutOfMemory,
            io::ErrorKind::Unsupported => PalError::NotSupported {
                feature: operation,
                platform: crate::get_platform().to_string(),
            },
            _ => PalError::Io { operation, source },
        }
    }

    /// Map a raw OS error (`errno` on Unix, `GetLastError`/WSA on Windows).
    pub fn from_raw_os_error(operation: impl Into<String>, code: i32) -> Self {
        Self::from_io(operation, io::Error::from_raw_os_error(code))
    }

    /// Map the calling thread's most recent OS error.
    pub fn last_os_error(operation: impl Into<String>) -> Self {
        Self::from_io(operation, io::Error::last_os_error())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<io::Error> for PalError {
    fn from(source: io::Error) -> Self {
        PalError::from_io("io", source)
    }
}

impl From<&PalError> for ErrorCode {
    fn from(err: &PalError) -> Self {
        err.code()
    }
}

impl<T> From<&PalResult<T>> for ErrorCode {
    fn from(result: &PalResult<T>) -> Self {
        match result {
            Ok(_) => ErrorCode::Ok,
            Err(err) => err.code(),
        }
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for PAL operations.
pub type PalResult<T> = Result<T, PalError>;

// ============================================================================
// Tests
// ============================================================================
