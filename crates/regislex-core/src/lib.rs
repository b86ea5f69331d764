//! regislex-core: Error model and platform constants
//!
//! This crate provides the foundational types used across all PAL crates:
//! - The shared result-code vocabulary ([`ErrorCode`]) and structured error
//!   ([`PalError`])
//! - Compile-time platform selection ([`Platform`], [`PLATFORM`])
//! - Path constants derived from the active platform
//! - Schema ID constants for JSON output contracts
//!
//! ## Error Handling
//!
//! Every PAL operation returns [`PalResult`]. Errors propagate purely by
//! return value; there is no per-thread "last error". Each error maps onto
//! exactly one [`ErrorCode`], which is what the C boundary returns.
//!
//! ## Platform Selection
//!
//! Backends are chosen at build time with `cfg` attributes. The constants in
//! this crate describe the active selection so downstream code never needs to
//! inspect the target itself.

use std::env::consts::OS;

pub mod error;
pub mod schema;

// Re-export canonical error type at crate root
pub use error::{ErrorCode, PalError, PalResult};

// ============================================================================
// Platform Selection
// ============================================================================

/// Operating system family the crate was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Ios,
    Android,
    Bsd,
    /// Any other POSIX target.
    OtherUnix,
}

impl Platform {
    /// Short lowercase name (e.g., `"linux"`, `"bsd"`).
    pub const fn name(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Bsd => "bsd",
            Platform::OtherUnix => "unix",
        }
    }

    /// Whether the platform belongs to the POSIX umbrella.
    pub const fn is_posix(self) -> bool {
        !matches!(self, Platform::Windows)
    }
}

#[cfg(windows)]
pub const PLATFORM: Platform = Platform::Windows;
#[cfg(target_os = "linux")]
pub const PLATFORM: Platform = Platform::Linux;
#[cfg(target_os = "macos")]
pub const PLATFORM: Platform = Platform::MacOs;
#[cfg(target_os = "ios")]
pub const PLATFORM: Platform = Platform::Ios;
#[cfg(target_os = "android")]
pub const PLATFORM: Platform = Platform::Android;
#[cfg(any(
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub const PLATFORM: Platform = Platform::Bsd;
#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "ios",
        target_os = "android",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))
))]
pub const PLATFORM: Platform = Platform::OtherUnix;

// ============================================================================
// Path Constants
// ============================================================================

/// Separator between path components.
#[cfg(windows)]
pub const PATH_SEPARATOR: char = '\\';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = '/';

/// Separator between entries of a path list (e.g., `PATH`).
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Maximum path length, in bytes, callers should size buffers for.
#[cfg(windows)]
pub const MAX_PATH: usize = 260;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const MAX_PATH: usize = 4096;
#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
pub const MAX_PATH: usize = 1024;

// ============================================================================
// Platform Detection
// ============================================================================

/// Get the current platform identifier.
///
/// Returns one of: "linux", "macos", "windows", "freebsd", etc.
///
/// This is a pure function with no side effects.
#[inline]
pub fn get_platform() -> &'static str {
    OS
}

/// Check if running on a POSIX platform.
#[inline]
pub const fn is_posix() -> bool {
    PLATFORM.is_posix()
}

/// Check if running on Windows.
#[inline]
#[cfg(windows)]
pub const fn is_windows() -> bool {
    true
}

#[inline]
#[cfg(not(windows))]
pub const fn is_windows() -> bool {
    false
}
