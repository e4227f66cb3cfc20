use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::models::meeting::TimeWindow;
use crate::error::ScheduleError;

/// Resolves a local wall-clock time to a UTC instant. Ambiguous times (the
/// repeated hour when clocks fall back) take the earlier occurrence;
/// nonexistent times (the skipped hour when clocks spring forward) resolve
/// to `None` and the caller decides whether to reject or skip past.
fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Converts a manager-entered local window on a business date into absolute
/// UTC instants. Windows that do not run forward, or whose endpoints fall in
/// a DST gap, are rejected.
pub fn local_window_to_utc(
    tz: Tz,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<TimeWindow, ScheduleError> {
    if start >= end {
        return Err(ScheduleError::InvalidConstraintWindow);
    }
    let start_at = resolve_local(tz, date, start).ok_or(ScheduleError::InvalidConstraintWindow)?;
    let end_at = resolve_local(tz, date, end).ok_or(ScheduleError::InvalidConstraintWindow)?;
    if start_at >= end_at {
        return Err(ScheduleError::InvalidConstraintWindow);
    }
    Ok(TimeWindow::new(start_at, end_at))
}

/// The business date an instant falls on, in the configured timezone.
/// Appointments near midnight UTC belong to whatever local day the shop
/// sees, so constraint lookups and the day views both go through here.
pub fn business_date(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// UTC range `[start, end)` covering one business day in the configured
/// timezone.
pub fn day_bounds_utc(tz: Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        start_of_day_utc(tz, date),
        start_of_day_utc(tz, date + Duration::days(1)),
    )
}

fn start_of_day_utc(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    // Midnight itself can sit inside a spring-forward gap (Chile and Lebanon
    // have started DST at 00:00), so step forward until a real instant.
    let mut time = NaiveTime::MIN;
    for _ in 0..4 {
        if let Some(instant) = resolve_local(tz, date, time) {
            return instant;
        }
        time += Duration::hours(1);
    }
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Collapses a phone number to `+` and digits so reminder dispatch and
/// lookups agree on one spelling. Returns `None` for inputs with no digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.chars().enumerate() {
        if c.is_ascii_digit() {
            normalized.push(c);
        } else if c == '+' && i == 0 {
            normalized.push(c);
        } else if matches!(c, ' ' | '-' | '(' | ')' | '.' | '/') {
            continue;
        } else {
            return None;
        }
    }
    if normalized.chars().any(|c| c.is_ascii_digit()) {
        Some(normalized)
    } else {
        None
    }
}
