//! Civil-day derivation in a fixed IANA timezone.
//!
//! Every date comparison in the engine happens on the calendar of the
//! organization's operating timezone, never on the calendar of the host
//! process. An instant stored as `2025-10-14T22:15:00Z` is October 15 on a
//! Stockholm wall clock, and it is the Stockholm date that decides which
//! pickup day a slot belongs to. Deriving year/month/day from the instant
//! without first converting into the civil timezone silently shifts dates
//! near local midnight; these helpers exist so that conversion can never
//! be skipped.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// The calendar date of `instant` as read from a wall clock in `tz`.
pub fn civil_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Zero-padded `YYYY-MM-DD` key for the civil day of `instant` in `tz`.
///
/// Two instants that differ only in UTC offset but fall on the same civil
/// day produce the same key. Keys from different civil days never collide:
/// padding keeps `2025-01-05` distinct from any single-digit rendering.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use chrono_tz::Tz;
/// use pickup_engine::civil::day_key;
///
/// let tz: Tz = "Europe/Stockholm".parse().unwrap();
/// // 22:15 UTC on the 14th is already the 15th in Stockholm (CEST, +02:00).
/// let instant = DateTime::parse_from_rfc3339("2025-10-14T22:15:00Z")
///     .unwrap()
///     .to_utc();
/// assert_eq!(day_key(instant, tz), "2025-10-15");
/// ```
pub fn day_key(instant: DateTime<Utc>, tz: Tz) -> String {
    civil_date(instant, tz).format("%Y-%m-%d").to_string()
}

/// Parse an IANA timezone name into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone(format!("'{s}'")))
}

/// Parse a wall-clock time string (`HH:MM`, optionally `HH:MM:SS`).
///
/// # Errors
///
/// Returns [`EngineError::InvalidTime`] for empty or garbled input.
pub fn parse_local_time(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| EngineError::InvalidTime(format!("'{s}'")))
}

/// Format a wall-clock time as zero-padded `HH:MM`.
pub fn format_local_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn stockholm() -> Tz {
        "Europe/Stockholm".parse().unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().to_utc()
    }

    // ── day_key tests ───────────────────────────────────────────────────

    #[test]
    fn test_same_instant_different_offsets_same_key() {
        let a = utc("2025-10-15T00:15:00+02:00");
        let b = utc("2025-10-14T22:15:00Z");
        assert_eq!(a, b);
        assert_eq!(day_key(a, stockholm()), day_key(b, stockholm()));
        assert_eq!(day_key(a, stockholm()), "2025-10-15");
    }

    #[test]
    fn test_utc_date_differs_from_civil_date_near_midnight() {
        // 22:15 UTC on the 14th is 00:15 on the 15th in Stockholm.
        let instant = utc("2025-10-14T22:15:00Z");
        assert_eq!(instant.date_naive(), NaiveDate::from_ymd_opt(2025, 10, 14).unwrap());
        assert_eq!(day_key(instant, stockholm()), "2025-10-15");
    }

    #[test]
    fn test_late_evening_stays_on_its_own_day() {
        let instant = utc("2025-10-14T23:00:00+02:00");
        assert_eq!(day_key(instant, stockholm()), "2025-10-14");
    }

    #[test]
    fn test_key_is_zero_padded() {
        let instant = utc("2025-01-05T12:00:00Z");
        assert_eq!(day_key(instant, stockholm()), "2025-01-05");
    }

    #[test]
    fn test_year_boundary_keys_differ() {
        let dec = utc("2025-12-31T12:00:00+01:00");
        let jan = utc("2026-01-01T12:00:00+01:00");
        assert_eq!(day_key(dec, stockholm()), "2025-12-31");
        assert_eq!(day_key(jan, stockholm()), "2026-01-01");
    }

    #[test]
    fn test_key_is_independent_of_host_timezone() {
        // Fixed tz in, fixed key out; nothing here reads process-local time.
        let instant = utc("2025-06-30T21:59:00Z");
        assert_eq!(day_key(instant, stockholm()), "2025-06-30");
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        assert_eq!(day_key(instant, tokyo), "2025-07-01");
    }

    // ── time parsing tests ──────────────────────────────────────────────

    #[test]
    fn test_parse_local_time_hhmm() {
        let t = parse_local_time("09:30").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_local_time_with_seconds() {
        let t = parse_local_time("17:00:30").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(17, 0, 30).unwrap());
    }

    #[test]
    fn test_parse_local_time_rejects_garbled_input() {
        assert!(parse_local_time("").is_err());
        assert!(parse_local_time("nine").is_err());
        assert!(parse_local_time("25:00").is_err());
        assert!(parse_local_time("09:65").is_err());
    }

    #[test]
    fn test_format_local_time_pads() {
        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_local_time(t), "09:05");
    }

    #[test]
    fn test_parse_invalid_timezone_returns_error() {
        let err = parse_timezone("Not/AZone").unwrap_err();
        assert!(err.to_string().contains("Invalid timezone"), "got: {err}");
    }
}
