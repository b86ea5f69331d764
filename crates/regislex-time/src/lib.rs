//! regislex-time: Clock, sleep and timestamp text services.
//!
//! This crate provides:
//! - Wall-clock timestamps since the Unix epoch ([`now_ms`], [`now_us`])
//! - A process-local monotonic counter ([`monotonic_ns`], [`Stopwatch`])
//! - Millisecond sleep ([`sleep_ms`])
//! - ISO-8601 formatting and parsing with an explicit zone ([`format_iso8601`],
//!   [`parse_iso8601`])
//!
//! # Monotonic Clock
//!
//! [`monotonic_ns`] counts from an anchor taken on first use. It never runs
//! backward within one process and means nothing across processes or reboots.
//!
//! # Local Time
//!
//! Determining the local UTC offset can fail (notably on multi-threaded Unix
//! processes, where reading the zone database is not thread-safe). Local
//! formatting then falls back to `+00:00` and logs a warning.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regislex_core::{PalError, PalResult};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use tracing::warn;

/// Zone used when rendering or interpreting timestamps without an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZone {
    /// Coordinated Universal Time. **This is the default.**
    #[default]
    Utc,
    /// The host's local offset at the instant in question.
    Local,
}

// ============================================================================
// Clocks
// ============================================================================

/// Milliseconds since the Unix epoch (wall clock).
pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Microseconds since the Unix epoch (wall clock).
pub fn now_us() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000) as i64
}

/// Seconds since the Unix epoch (wall clock).
pub fn now_secs() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn monotonic_anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

/// Nanoseconds elapsed on the monotonic clock since first use in this process.
pub fn monotonic_ns() -> u64 {
    let elapsed = Instant::now().saturating_duration_since(monotonic_anchor());
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}

/// Block the calling thread for at least `ms` milliseconds.
pub fn sleep_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}

/// Elapsed-time helper on the monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Start a new stopwatch.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Restart from now, returning the time elapsed before the reset.
    pub fn reset(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.start);
        self.start = now;
        elapsed
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

// ============================================================================
// ISO-8601
// ============================================================================

fn local_offset_at(at: OffsetDateTime) -> UtcOffset {
    match UtcOffset::local_offset_at(at) {
        Ok(offset) => offset,
        Err(err) => {
            warn!(error = %err, "local offset unavailable, using UTC");
            UtcOffset::UTC
        }
    }
}

/// Render a Unix timestamp (seconds) as ISO-8601 text.
///
/// - [`TimeZone::Utc`]: `2024-01-15T10:30:00Z`
/// - [`TimeZone::Local`]: `2024-01-15T11:30:00+01:00`
///
/// # Errors
///
/// Returns `InvalidArgument` if `unix_secs` is outside the representable
/// range (years -9999 to 9999).
pub fn format_iso8601(unix_secs: i64, zone: TimeZone) -> PalResult<String> {
    let utc = OffsetDateTime::from_unix_timestamp(unix_secs).map_err(|e| {
        PalError::invalid_argument(format!("timestamp {unix_secs} out of range: {e}"))
    })?;

    let rendered = match zone {
        TimeZone::Utc => utc.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        )),
        TimeZone::Local => utc.to_offset(local_offset_at(utc)).format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        )),
    };

    rendered.map_err(|e| PalError::failed("format_iso8601", e.to_string()))
}

/// Parse ISO-8601 text into a Unix timestamp (seconds).
///
/// Accepted forms:
/// - RFC 3339 with `Z` or an explicit offset, optional fractional seconds
///   (fraction is truncated); `zone` is ignored
/// - `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`,
///   interpreted in `zone`
///
/// # Errors
///
/// Returns `InvalidArgument` for text matching none of the forms.
pub fn parse_iso8601(text: &str, zone: TimeZone) -> PalResult<i64> {
    let text = text.trim();

    if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(dt.unix_timestamp());
    }

    let naive = parse_naive(text).ok_or_else(|| {
        PalError::invalid_argument(format!("'{text}' is not an ISO-8601 timestamp"))
    })?;

    let offset = match zone {
        TimeZone::Utc => UtcOffset::UTC,
        TimeZone::Local => local_offset_at(naive.assume_utc()),
    };
    Ok(naive.assume_offset(offset).unix_timestamp())
}

fn parse_naive(text: &str) -> Option<PrimitiveDateTime> {
    let with_t = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let with_space = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let date_only = format_description!("[year]-[month]-[day]");

    PrimitiveDateTime::parse(text, with_t)
        .or_else(|_| PrimitiveDateTime::parse(text, with_space))
        .ok()
        .or_else(|| {
            Date::parse(text, date_only)
                .ok()
                .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_units_agree() {
        let ms = now_ms();
        let us = now_us();
        let secs = now_secs();
        assert!(ms > 1_600_000_000_000, "clock looks unset: {ms}");
        assert!((us / 1000 - ms).abs() < 1000);
        assert!((ms / 1000 - secs).abs() <= 1);
    }

    #[test]
    fn monotonic_never_goes_backward() {
        let mut last = monotonic_ns();
        for _ in 0..1000 {
            let now = monotonic_ns();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn sleep_waits_at_least_requested() {
        let before = monotonic_ns();
        sleep_ms(20);
        let elapsed = monotonic_ns() - before;
        assert!(elapsed >= 20_000_000, "slept only {elapsed}ns");
    }

    #[test]
    fn stopwatch_reset_restarts() {
        let mut watch = Stopwatch::start();
        sleep_ms(5);
        let first = watch.reset();
        assert!(first >= Duration::from_millis(5));
        assert!(watch.elapsed() < first + Duration::from_secs(1));
    }

    #[test]
    fn format_utc() {
        assert_eq!(
            format_iso8601(0, TimeZone::Utc).unwrap(),
            "1970-01-01T00:00:00Z"
        );
        assert_eq!(
            format_iso8601(1_705_314_600, TimeZone::Utc).unwrap(),
            "2024-01-15T10:30:00Z"
        );
    }

    #[test]
    fn format_local_carries_offset() {
        let text = format_iso8601(1_705_314_600, TimeZone::Local).unwrap();
        assert!(!text.ends_with('Z'));
        let sign = text.as_bytes()[text.len() - 6];
        assert!(sign == b'+' || sign == b'-', "missing offset in {text}");
        assert_eq!(parse_iso8601(&text, TimeZone::Utc).unwrap(), 1_705_314_600);
    }

    #[test]
    fn format_rejects_out_of_range() {
        let err = format_iso8601(i64::MAX, TimeZone::Utc).unwrap_err();
        assert!(matches!(err, PalError::InvalidArgument { .. }));
    }

    #[test]
    fn parse_rfc3339_variants() {
        assert_eq!(
            parse_iso8601("2024-01-15T10:30:00Z", TimeZone::Utc).unwrap(),
            1_705_314_600
        );
        assert_eq!(
            parse_iso8601("2024-01-15T11:30:00+01:00", TimeZone::Local).unwrap(),
            1_705_314_600
        );
        assert_eq!(
            parse_iso8601("2024-01-15T10:30:00.999Z", TimeZone::Utc).unwrap(),
            1_705_314_600
        );
    }

    #[test]
    fn parse_naive_forms_in_utc() {
        assert_eq!(
            parse_iso8601("2024-01-15T10:30:00", TimeZone::Utc).unwrap(),
            1_705_314_600
        );
        assert_eq!(
            parse_iso8601("2024-01-15 10:30:00", TimeZone::Utc).unwrap(),
            1_705_314_600
        );
        assert_eq!(
            parse_iso8601("2024-01-15", TimeZone::Utc).unwrap(),
            1_705_276_800
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "yesterday", "2024-13-01", "2024-01-15T25:00:00Z"] {
            let err = parse_iso8601(bad, TimeZone::Utc).unwrap_err();
            assert!(
                matches!(err, PalError::InvalidArgument { .. }),
                "{bad:?} should be rejected"
            );
        }
    }
}
