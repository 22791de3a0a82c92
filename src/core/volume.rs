//! Volume retention and expiration.
//!
//! A volume's retention clock only runs once it stops accepting data
//! (status `Used` or `Full`). Before that the configured retention is shown
//! as-is.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::core::format::format_duration;
use crate::error::{DecodeError, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

const LAST_WRITTEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ZERO_DATE: &str = "0000-00-00 00:00:00";

/// Volume status as reported by the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeStatus {
    Append,
    Full,
    Used,
    Recycle,
    Purged,
    Error,
    Archive,
    ReadOnly,
    Disabled,
    Busy,
    Cleaning,
    Other(String),
}

impl VolumeStatus {
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Append" => Self::Append,
            "Full" => Self::Full,
            "Used" => Self::Used,
            "Recycle" => Self::Recycle,
            "Purged" => Self::Purged,
            "Error" => Self::Error,
            "Archive" => Self::Archive,
            "Read-Only" => Self::ReadOnly,
            "Disabled" => Self::Disabled,
            "Busy" => Self::Busy,
            "Cleaning" => Self::Cleaning,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Append => "Append",
            Self::Full => "Full",
            Self::Used => "Used",
            Self::Recycle => "Recycle",
            Self::Purged => "Purged",
            Self::Error => "Error",
            Self::Archive => "Archive",
            Self::ReadOnly => "Read-Only",
            Self::Disabled => "Disabled",
            Self::Busy => "Busy",
            Self::Cleaning => "Cleaning",
            Self::Other(label) => label,
        }
    }

    /// Whether the retention clock is running for this volume.
    pub fn is_expiring(&self) -> bool {
        matches!(self, Self::Used | Self::Full)
    }
}

/// Where a volume stands with respect to its retention period.
///
/// The derived ordering is the sort order used for volume lists: expired
/// first, then by days left, then never-written volumes, then volumes whose
/// clock has not started (by retention length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Expiration {
    Expired,
    ExpiresInOneDay,
    ExpiresInDays(u64),
    NeverWritten,
    RetentionRemaining(u64),
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::ExpiresInOneDay => write!(f, "expires in 1 day"),
            Self::ExpiresInDays(days) => write!(f, "expires in {} days", days),
            Self::NeverWritten => write!(f, "-"),
            Self::RetentionRemaining(seconds) => write!(f, "{}", format_duration(*seconds)),
        }
    }
}

impl Serialize for Expiration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Derive the expiration state of a volume at `now`.
pub fn compute_expiration(
    status: &VolumeStatus,
    last_written: Option<DateTime<Utc>>,
    retention_seconds: u64,
    now: DateTime<Utc>,
) -> Expiration {
    if !status.is_expiring() {
        return Expiration::RetentionRemaining(retention_seconds);
    }

    let Some(last_written) = last_written else {
        return Expiration::NeverWritten;
    };

    let elapsed_days = (now - last_written).num_seconds() as f64 / SECONDS_PER_DAY;
    let retention_days = (retention_seconds as f64 / SECONDS_PER_DAY).round();
    let remaining = ((retention_days - elapsed_days) * 100.0).round() / 100.0;

    if remaining <= 0.0 {
        Expiration::Expired
    } else if remaining <= 1.0 {
        Expiration::ExpiresInOneDay
    } else {
        Expiration::ExpiresInDays(remaining.ceil() as u64)
    }
}

/// Parse the console's `lastwritten` column in the director's timezone.
///
/// Empty text and the all-zero date both mean the volume was never written.
pub fn parse_last_written(
    text: Option<&str>,
    offset: FixedOffset,
) -> Result<Option<DateTime<Utc>>> {
    let text = match text.map(str::trim) {
        None | Some("") | Some(ZERO_DATE) => return Ok(None),
        Some(text) => text,
    };

    let naive = NaiveDateTime::parse_from_str(text, LAST_WRITTEN_FORMAT)
        .map_err(|_| DecodeError::InvalidTimestamp(text.to_string()))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| Some(local.with_timezone(&Utc)))
        .ok_or_else(|| DecodeError::InvalidTimestamp(text.to_string()))
}
