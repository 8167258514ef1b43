use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::AppError;

/// Accepted layouts for `createdTimeUtc`, tried in order.
const CREATED_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

// microsecond precision: "YYYY-MM-DDTHH:MM:SS.ffffff"
const MAX_TIMESTAMP_LEN: usize = 26;

pub fn get_current_timestamp_utc() -> DateTime<Utc> {
    Utc::now()
}

/**
  * Parse an incident creation time. The value is always UTC, may carry a trailing `Z`
  * and may have more fractional digits than we keep.
 */
pub fn parse_created_time(value: &str) -> Result<DateTime<Utc>, AppError> {
    let trimmed = value.trim().trim_end_matches(['Z', 'z']);
    let truncated: String = trimmed.chars().take(MAX_TIMESTAMP_LEN).collect();

    CREATED_TIME_FORMATS.iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&truncated, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::TimestampParseError(value.to_string()))
}
