//! Linux/Android memory figures from `/proc/meminfo`.

use std::fs;

use regislex_core::{PalError, PalResult};

const MEMINFO: &str = "/proc/meminfo";

pub fn total_memory_impl() -> PalResult<u64> {
    let content = read_meminfo()?;
    parse_meminfo_field(&content, "MemTotal")
        .ok_or_else(|| PalError::failed("total_memory", "MemTotal missing from /proc/meminfo"))
}

pub fn available_memory_impl() -> PalResult<u64> {
    let content = read_meminfo()?;
    // MemAvailable appeared in Linux 3.14
    parse_meminfo_field(&content, "MemAvailable")
        .or_else(|| parse_meminfo_field(&content, "MemFree"))
        .ok_or_else(|| PalError::failed("available_memory", "no free memory figure in /proc/meminfo"))
}

fn read_meminfo() -> PalResult<String> {
    fs::read_to_string(MEMINFO).map_err(|e| PalError::from_io("read_meminfo", e))
}

/// Parse one `Key:   1234 kB` line into bytes.
fn parse_meminfo_field(content: &str, key: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let rest = line.strip_prefix(key)?.strip_prefix(':')?;
        let mut fields = rest.split_whitespace();
        let value: u64 = fields.next()?.parse().ok()?;
        match fields.next() {
            Some("kB") => value.checked_mul(1024),
            None => Some(value),
            Some(_) => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "MemTotal:       16318480 kB\n\
                          MemFree:         1218304 kB\n\
                          MemAvailable:    9001234 kB\n\
                          HugePages_Total:       0\n";

    #[test]
    fn parses_kb_fields() {
        assert_eq!(parse_meminfo_field(SAMPLE, "MemTotal"), Some(16_318_480 * 1024));
        assert_eq!(parse_meminfo_field(SAMPLE, "MemAvailable"), Some(9_001_234 * 1024));
        assert_eq!(parse_meminfo_field(SAMPLE, "HugePages_Total"), Some(0));
    }

    #[test]
    fn key_must_match_whole_name() {
        assert_eq!(parse_meminfo_field(SAMPLE, "Mem"), None);
        assert_eq!(parse_meminfo_field(SAMPLE, "SwapTotal"), None);
    }

    #[test]
    fn live_values_are_consistent() {
        let total = total_memory_impl().unwrap();
        let available = available_memory_impl().unwrap();
        assert!(total > 0);
        assert!(available <= total);
    }
}
