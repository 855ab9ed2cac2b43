//! Timestamp normalization: `recorded_at` to UTC plus the entry's local date in its timezone.

use crate::error::BackendError;
use crate::field_errors::ValidationItem;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const TIMEZONE_MAX_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized {
    pub recorded_at: DateTime<Utc>,
    pub local_date: NaiveDate,
    pub timezone: String,
}

/// Look up an IANA zone name. An empty name means UTC.
pub fn parse_timezone(timezone: &str) -> Result<Tz, BackendError> {
    if timezone.is_empty() {
        return Ok(Tz::UTC);
    }
    timezone
        .parse::<Tz>()
        .map_err(|_| BackendError::Unprocessable(format!("Invalid timezone '{}'", timezone)))
}

/// Resolve the stored instant and the local date in `timezone`. A missing timestamp means
/// `now`; a naive one is wall-clock time in `timezone`.
pub fn normalize(
    recorded_at: Option<&str>,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<Normalized, BackendError> {
    let tz = parse_timezone(timezone)?;
    let recorded_at = match recorded_at.map(str::trim).filter(|s| !s.is_empty()) {
        None => now,
        Some(raw) => parse(raw, tz).ok_or_else(|| {
            BackendError::Validation(vec![ValidationItem::body(
                "recorded_at",
                "Input should be a valid datetime",
                "datetime_parsing",
            )])
        })?,
    };
    Ok(Normalized {
        recorded_at,
        local_date: recorded_at.with_timezone(&tz).date_naive(),
        timezone: if timezone.is_empty() { "UTC".to_string() } else { timezone.to_string() },
    })
}

fn parse(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    // A wall-clock time skipped by a DST jump resolves past the gap.
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|t| t.with_timezone(&Utc))
}
