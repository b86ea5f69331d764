//! regislex-sys: process, environment and host queries, randomness and
//! dynamic loading.
//!
//! ## Platform Support
//!
//! | Feature | Linux/Android | macOS/iOS | Other Unix | Windows |
//! |---------|---------------|-----------|------------|---------|
//! | Total memory | /proc/meminfo | sysctl hw.memsize | sysconf | GlobalMemoryStatusEx |
//! | Available memory | /proc/meminfo | host_statistics64 | not supported | GlobalMemoryStatusEx |
//! | Host name | gethostname | gethostname | gethostname | GetComputerNameExW |
//!
//! ## Example
//!
//! ```rust,no_run
//! use regislex_sys::{random_u64, system_info};
//!
//! let info = system_info();
//! println!("{} CPUs on {}", info.cpu_count, info.hostname.as_deref().unwrap_or("?"));
//! let token = random_u64()?;
//! # Ok::<(), regislex_sys::PalError>(())
//! ```

use std::env;

use regislex_core::get_platform;
use regislex_core::schema::SYSTEM_INFO_V1;
use regislex_time::TimeZone;
use serde::Serialize;

mod dylib;
mod random;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "macos", target_os = "ios"))]
mod macos;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(any(target_os = "linux", target_os = "android"))]
use linux as memory;
#[cfg(any(target_os = "macos", target_os = "ios"))]
use macos as memory;
#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios"
    ))
))]
use unix as memory;
#[cfg(windows)]
use windows as memory;

#[cfg(unix)]
use unix as host;
#[cfg(windows)]
use windows as host;

pub use dylib::{library_filename, Library};
pub use random::{random_bytes, random_u32, random_u64};

pub use regislex_core::{PalError, PalResult};

// ============================================================================
// Process and environment
// ============================================================================

/// OS identifier of the current process.
pub fn process_id() -> u32 {
    std::process::id()
}

fn validate_env_name(name: &str) -> PalResult<()> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(PalError::invalid_argument(
            "environment variable name must be non-empty without '=' or NUL",
        ));
    }
    Ok(())
}

/// Value of an environment variable, or `None` if unset.
///
/// Names that could never be set (empty, containing `=` or NUL) read as
/// unset. Non-UTF-8 values are converted lossily.
pub fn get_env(name: &str) -> Option<String> {
    validate_env_name(name).ok()?;
    env::var_os(name).map(|v| v.to_string_lossy().into_owned())
}

/// Set an environment variable, or remove it when `value` is `None`.
///
/// The environment is process-wide; concurrent calls from several threads
/// race with each other and with readers in C code.
///
/// # Errors
///
/// Returns `InvalidArgument` for an empty name, a name containing `=` or
/// NUL, or a value containing NUL.
pub fn set_env(name: &str, value: Option<&str>) -> PalResult<()> {
    validate_env_name(name)?;
    match value {
        Some(v) if v.contains('\0') => Err(PalError::invalid_argument(
            "environment variable value must not contain NUL",
        )),
        Some(v) => {
            env::set_var(name, v);
            Ok(())
        }
        None => {
            env::remove_var(name);
            Ok(())
        }
    }
}

// ============================================================================
// Host
// ============================================================================

pub fn hostname() -> PalResult<String> {
    host::hostname_impl()
}

/// Number of logical CPUs available to this process (at least 1).
pub fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Installed physical memory in bytes.
pub fn total_memory() -> PalResult<u64> {
    memory::total_memory_impl()
}

/// Physical memory currently available to new allocations, in bytes.
///
/// # Errors
///
/// `NotSupported` on Unix systems without a dedicated backend.
pub fn available_memory() -> PalResult<u64> {
    memory::available_memory_impl()
}

/// Point-in-time description of the host.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Schema identifier for version detection.
    pub schema_id: &'static str,

    /// Snapshot time (ISO 8601, UTC).
    pub timestamp: String,

    /// Current platform (e.g., "linux", "macos", "windows").
    pub platform: &'static str,

    pub pid: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    pub cpu_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_memory: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_memory: Option<u64>,

    /// Queries that failed while building the snapshot.
    pub warnings: Vec<String>,
}

/// Gather [`SystemInfo`]. Individual query failures become warnings.
pub fn system_info() -> SystemInfo {
    let mut warnings = Vec::new();

    let hostname = keep(&mut warnings, "hostname", hostname());
    let total_memory = keep(&mut warnings, "total_memory", total_memory());
    let available_memory = keep(&mut warnings, "available_memory", available_memory());
    let timestamp = keep(
        &mut warnings,
        "timestamp",
        regislex_time::format_iso8601(regislex_time::now_secs(), TimeZone::Utc),
    )
    .unwrap_or_default();

    SystemInfo {
        schema_id: SYSTEM_INFO_V1,
        timestamp,
        platform: get_platform(),
        pid: process_id(),
        hostname,
        cpu_count: cpu_count(),
        total_memory,
        available_memory,
        warnings,
    }
}

fn keep<T>(warnings: &mut Vec<String>, label: &str, result: PalResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warnings.push(format!("{label}: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_round_trip() {
        let name = format!("REGISLEX_SYS_TEST_{}", process_id());
        assert_eq!(get_env(&name), None);

        set_env(&name, Some("value")).unwrap();
        assert_eq!(get_env(&name).as_deref(), Some("value"));

        set_env(&name, None).unwrap();
        assert_eq!(get_env(&name), None);
    }

    #[test]
    fn invalid_env_names_rejected() {
        for bad in ["", "A=B", "NUL\0"] {
            assert!(matches!(
                set_env(bad, Some("x")),
                Err(PalError::InvalidArgument { .. })
            ));
            assert_eq!(get_env(bad), None);
        }
        assert!(set_env("REGISLEX_NUL_VALUE", Some("a\0b")).is_err());
    }

    #[test]
    fn host_queries() {
        assert!(cpu_count() >= 1);
        assert_eq!(process_id(), std::process::id());
        assert!(!hostname().unwrap().is_empty());
    }

    #[test]
    fn system_info_has_schema() {
        let info = system_info();
        assert_eq!(info.schema_id, SYSTEM_INFO_V1);
        assert_eq!(info.platform, get_platform());
        assert!(info.timestamp.ends_with('Z'));
    }
}
