//! Display helpers for uptime and memory figures.

use chrono::DateTime;
use chrono::Utc;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Human-readable time elapsed since `start`.
///
/// Shows at most the two most significant units: `1d 2h 3m`, `4h 5m`,
/// `6m 7s`, `8s`. Days keep their minutes since that is the granularity
/// users compare uptimes at.
pub fn format_uptime(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = (now - start).num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Bytes as megabytes with one decimal, e.g. `48.2 MB`.
pub fn format_memory(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / MIB as f64)
}

/// Parse a restart threshold such as `"200M"`, `"1G"`, `"512K"` or a raw
/// byte count. Returns `None` for anything else, including zero.
pub fn parse_memory_threshold(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, multiplier) = match value.chars().last()?.to_ascii_uppercase() {
        'K' => (&value[..value.len() - 1], KIB),
        'M' => (&value[..value.len() - 1], MIB),
        'G' => (&value[..value.len() - 1], GIB),
        _ => (value, 1),
    };
    let amount: u64 = digits.trim().parse().ok()?;
    amount.checked_mul(multiplier).filter(|bytes| *bytes > 0)
}
