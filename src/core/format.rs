//! Human-readable sizes, ages and durations.
//!
//! Two size formatters exist side by side: [`format_byte_size`] divides by
//! 1000 and uses SI unit names, [`format_binary_size`] divides by 1024 and
//! uses IEC unit names. They are never mixed; pick one with [`SizeBase`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

const DECIMAL_UNITS: [&str; 8] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB"];
const BINARY_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

pub const ZERO_BYTES: &str = "0.00 B";

const SECONDS_PER_DAY: i64 = 86_400;

const YEAR: u64 = 31_536_000;
const MONTH: u64 = 2_592_000;
const DAY: u64 = 86_400;
const HOUR: u64 = 3_600;
const MINUTE: u64 = 60;

/// Divisor family used when rendering a byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBase {
    #[default]
    Decimal,
    Binary,
}

impl SizeBase {
    pub fn format(&self, bytes: u64) -> String {
        match self {
            Self::Decimal => format_byte_size(bytes),
            Self::Binary => format_binary_size(bytes),
        }
    }
}

/// Scale `bytes` by `base` until it drops below one unit step.
///
/// Equivalent to picking the unit by `floor(log(bytes) / log(base))` but
/// exact at powers of the base and well defined for zero.
fn scale(bytes: u64, base: u64, units: &[&str]) -> String {
    if bytes == 0 {
        return ZERO_BYTES.to_string();
    }

    let mut exponent = 0;
    let mut divisor = 1u128;
    while exponent + 1 < units.len() && u128::from(bytes) >= divisor * u128::from(base) {
        divisor *= u128::from(base);
        exponent += 1;
    }

    let value = bytes as f64 / divisor as f64;
    format!("{:.2} {}", value, units[exponent])
}

/// Format a byte count with base-1000 units (`1500000` → `"1.50 MB"`).
pub fn format_byte_size(bytes: u64) -> String {
    scale(bytes, 1000, &DECIMAL_UNITS)
}

/// Format a byte count with base-1024 units (`1536` → `"1.50 KiB"`).
pub fn format_binary_size(bytes: u64) -> String {
    scale(bytes, 1024, &BINARY_UNITS)
}

/// Free space left on a volume.
///
/// Missing or zero inputs yield `"0.00 B"`; this does not mean the volume is
/// full, only that nothing meaningful can be said.
pub fn format_free_bytes(capacity: Option<u64>, used: Option<u64>) -> String {
    match (capacity, used) {
        (Some(capacity), Some(used)) if capacity > 0 && used > 0 => {
            format_byte_size(capacity.saturating_sub(used))
        }
        _ => ZERO_BYTES.to_string(),
    }
}

/// Bucket an epoch timestamp into "today", "N day(s) ago" and so on.
///
/// Fails only when the distance to `now` does not fit in an `i64`.
pub fn format_relative_age(timestamp: Option<i64>, now: DateTime<Utc>) -> Result<String> {
    let timestamp = match timestamp {
        Some(ts) if ts != 0 => ts,
        _ => return Ok("never".to_string()),
    };

    let elapsed = now
        .timestamp()
        .checked_sub(timestamp)
        .ok_or(DecodeError::TimestampOutOfRange(timestamp))?;
    let days = elapsed.div_euclid(SECONDS_PER_DAY);

    Ok(if days < 1 {
        "today".to_string()
    } else if days <= 31 {
        format!("{} day(s) ago", days)
    } else if days <= 365 {
        format!("{} month(s) ago", (days as f64 / 31.0).round() as i64)
    } else {
        format!("{} year(s) ago", (days as f64 / 365.0).round() as i64)
    })
}

/// Render a retention period using its largest whole unit.
///
/// Months are 30 days and years 365 days. Anything under a minute is `"-"`.
pub fn format_duration(seconds: u64) -> String {
    let buckets = [
        (YEAR, "year"),
        (MONTH, "month"),
        (DAY, "day"),
        (HOUR, "hour"),
        (MINUTE, "minute"),
    ];

    buckets
        .iter()
        .find(|(unit, _)| seconds >= *unit)
        .map(|(unit, name)| format!("{} {}(s)", seconds / unit, name))
        .unwrap_or_else(|| "-".to_string())
}
