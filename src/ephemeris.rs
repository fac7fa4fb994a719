//! Julian date arithmetic and transit prediction.
//!
//! Every function takes "now" explicitly so results are reproducible; the
//! caller decides which clock to read.

use chrono::{DateTime, Local, TimeZone, Utc};
use thiserror::Error;

/// Milliseconds per day.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Format used for local next-transit times. Carries milliseconds and the
/// UTC offset so the string parses back to the same instant.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EphemerisError {
    #[error("orbital period must be positive, got {period}")]
    InvalidPeriod { period: f64 },

    #[error("{what} is not finite: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Julian date {jd} is outside the representable calendar range")]
    OutOfRange { jd: f64 },
}

/// Unix milliseconds → Julian date.
pub fn julian_date_from_millis(millis: f64) -> f64 {
    millis / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

/// Julian date → Unix milliseconds (fractional).
pub fn millis_from_julian_date(jd: f64) -> f64 {
    (jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY
}

/// Julian date of the instant `now`.
pub fn current_julian_date(now: DateTime<Utc>) -> f64 {
    julian_date_from_millis(now.timestamp_millis() as f64)
}

/// First transit at or after `now_jd`, given a reference mid-transit epoch
/// and the orbital period in days.
///
/// A reference epoch still in the future is returned unchanged. Otherwise the
/// epoch is advanced by `ceil((now - mid) / period)` whole periods.
pub fn next_transit(
    mid_transit_jd: f64,
    period_days: f64,
    now_jd: f64,
) -> Result<f64, EphemerisError> {
    // NaN fails this comparison too
    if !(period_days > 0.0) {
        return Err(EphemerisError::InvalidPeriod { period: period_days });
    }
    ensure_finite("orbital period", period_days)?;
    ensure_finite("mid-transit epoch", mid_transit_jd)?;
    ensure_finite("current Julian date", now_jd)?;

    if now_jd < mid_transit_jd {
        return Ok(mid_transit_jd);
    }

    let n = ((now_jd - mid_transit_jd) / period_days).ceil();
    let next = mid_transit_jd + n * period_days;
    if next < now_jd {
        // rounding in the division can land one period short
        return Ok(mid_transit_jd + (n + 1.0) * period_days);
    }
    Ok(next)
}

/// Calendar time of a Julian date in the given timezone.
///
/// Fractional milliseconds are truncated toward zero.
pub fn julian_date_to_datetime<Tz: TimeZone>(
    jd: f64,
    tz: &Tz,
) -> Result<DateTime<Tz>, EphemerisError> {
    ensure_finite("Julian date", jd)?;
    let millis = millis_from_julian_date(jd).trunc();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err(EphemerisError::OutOfRange { jd });
    }
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .map(|utc| utc.with_timezone(tz))
        .ok_or(EphemerisError::OutOfRange { jd })
}

/// Format a Julian date with [`LOCAL_TIME_FORMAT`] in the given timezone.
pub fn format_julian_date<Tz>(jd: f64, tz: &Tz) -> Result<String, EphemerisError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    Ok(julian_date_to_datetime(jd, tz)?
        .format(LOCAL_TIME_FORMAT)
        .to_string())
}

/// Format a Julian date in the machine's local timezone.
pub fn julian_date_to_local(jd: f64) -> Result<String, EphemerisError> {
    format_julian_date(jd, &Local)
}

/// Parse a string produced by [`format_julian_date`] back into a Julian date.
pub fn parse_local_time(text: &str) -> Result<f64, chrono::ParseError> {
    let parsed = DateTime::parse_from_str(text, LOCAL_TIME_FORMAT)?;
    Ok(julian_date_from_millis(parsed.timestamp_millis() as f64))
}

fn ensure_finite(what: &'static str, value: f64) -> Result<(), EphemerisError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EphemerisError::NonFinite { what, value })
    }
}
