//! Clock and timestamp exports.

use std::os::raw::c_char;

use regislex_time::TimeZone;

use crate::args::{str_arg, try_arg, try_pal, write_out, write_str};
use crate::error::RegislexErrorCode;

/// Render or interpret timestamps in UTC.
pub const REGISLEX_TZ_UTC: i32 = 0;
/// Render or interpret timestamps in the host's local zone.
pub const REGISLEX_TZ_LOCAL: i32 = 1;

fn zone_arg(zone: i32) -> Result<TimeZone, RegislexErrorCode> {
    match zone {
        REGISLEX_TZ_UTC => Ok(TimeZone::Utc),
        REGISLEX_TZ_LOCAL => Ok(TimeZone::Local),
        _ => Err(RegislexErrorCode::InvalidArgument),
    }
}

/// Milliseconds since the Unix epoch.
#[no_mangle]
pub extern "C" fn regislex_now_ms() -> i64 {
    regislex_time::now_ms()
}

/// Microseconds since the Unix epoch.
#[no_mangle]
pub extern "C" fn regislex_now_us() -> i64 {
    regislex_time::now_us()
}

/// Seconds since the Unix epoch.
#[no_mangle]
pub extern "C" fn regislex_now_secs() -> i64 {
    regislex_time::now_secs()
}

/// Monotonic nanoseconds from an arbitrary origin. Never decreases.
#[no_mangle]
pub extern "C" fn regislex_monotonic_ns() -> u64 {
    regislex_time::monotonic_ns()
}

/// Block the calling thread for at least `ms` milliseconds.
#[no_mangle]
pub extern "C" fn regislex_sleep_ms(ms: u64) {
    regislex_time::sleep_ms(ms);
}

/// Render `unix_secs` as ISO 8601 text into `buf`.
///
/// `zone` is `REGISLEX_TZ_UTC` (`...Z`) or `REGISLEX_TZ_LOCAL` (`...+HH:MM`).
///
/// # Safety
///
/// `buf` must be writable for `size` bytes.
///
/// # Example (C)
///
/// ```c
/// char stamp[32];
/// regislex_format_iso8601(regislex_now_secs(), REGISLEX_TZ_UTC, stamp, sizeof stamp);
/// ```
#[no_mangle]
pub unsafe extern "C" fn regislex_format_iso8601(
    unix_secs: i64,
    zone: i32,
    buf: *mut c_char,
    size: usize,
) -> RegislexErrorCode {
    let zone = try_arg!(zone_arg(zone));
    let text = try_pal!(regislex_time::format_iso8601(unix_secs, zone));
    write_str(&text, buf, size)
}

/// Parse ISO 8601 text into Unix seconds.
///
/// Text without an offset is read in `zone`.
///
/// # Safety
///
/// `text` must be a valid NUL-terminated string and `secs_out` valid for
/// writes.
#[no_mangle]
pub unsafe extern "C" fn regislex_parse_iso8601(
    text: *const c_char,
    zone: i32,
    secs_out: *mut i64,
) -> RegislexErrorCode {
    let text = try_arg!(str_arg(text));
    let zone = try_arg!(zone_arg(zone));
    if secs_out.is_null() {
        return RegislexErrorCode::InvalidArgument;
    }
    write_out(secs_out, try_pal!(regislex_time::parse_iso8601(text, zone)))
}
