//! Opening-hours evaluation for a pickup location.
//!
//! A location's opening hours are a small ordered collection of
//! [`SchedulePeriod`]s, each covering an inclusive date range and declaring
//! per-weekday open/closed state with local opening and closing times. A
//! default schedule and a temporary holiday schedule are simply two periods
//! with disjoint date ranges; period selection is by date-range containment.
//!
//! All queries are pure and total: a date with no period, or a closed
//! weekday, resolves to "unavailable" with a reason, never to an error.
//! Dates and times here are civil values in the organization's fixed
//! timezone; callers derive them from instants via [`crate::civil`].

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::civil::civil_date;

/// Open/closed state for one weekday within a schedule period.
///
/// When `is_open`, both times are present and opening < closing (invariant
/// owned by the administrative layer that authors schedules).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayHours {
    pub weekday: Weekday,
    pub is_open: bool,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
}

/// A date-range-bounded weekly schedule for one location.
///
/// `start_date..=end_date` is inclusive. Periods for the same location are
/// assumed not to overlap; that invariant is enforced where schedules are
/// authored, not re-validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayHours>,
}

/// Why a date or time is not available for pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No schedule period covers this date.
    NoSchedule,
    /// A period covers the date but the weekday is marked closed.
    ClosedOnWeekday,
    /// The weekday is open but the time falls outside opening hours.
    OutsideOpenHours,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnavailableReason::NoSchedule => "no schedule defined for this date",
            UnavailableReason::ClosedOnWeekday => "location is closed on this weekday",
            UnavailableReason::OutsideOpenHours => "time is outside opening hours",
        };
        f.write_str(s)
    }
}

/// Result of an availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub is_available: bool,
    pub reason: Option<UnavailableReason>,
}

impl Availability {
    fn open() -> Self {
        Self { is_available: true, reason: None }
    }

    fn closed(reason: UnavailableReason) -> Self {
        Self { is_available: false, reason: Some(reason) }
    }
}

/// The open local-time range for a date; both `None` when closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub earliest: Option<NaiveTime>,
    pub latest: Option<NaiveTime>,
}

impl TimeRange {
    const CLOSED: TimeRange = TimeRange { earliest: None, latest: None };
}

/// The first period in `periods` whose date range contains `date`.
///
/// Overlapping periods violate an external invariant; if it is violated
/// anyway, the first match in the caller-provided order wins and the
/// collision is logged rather than silently picked.
pub fn period_for(date: NaiveDate, periods: &[SchedulePeriod]) -> Option<&SchedulePeriod> {
    let mut matching = periods
        .iter()
        .filter(|p| p.start_date <= date && date <= p.end_date);

    let first = matching.next()?;
    if matching.next().is_some() {
        warn!(%date, "multiple schedule periods contain date, using first in order");
    }
    Some(first)
}

fn hours_for(date: NaiveDate, periods: &[SchedulePeriod]) -> Option<&DayHours> {
    let period = period_for(date, periods)?;
    period.days.iter().find(|d| d.weekday == date.weekday())
}

/// Whether `date` is an open pickup day.
///
/// No covering period yields [`UnavailableReason::NoSchedule`]; a covering
/// period with the weekday closed (or absent from the period's day list)
/// yields [`UnavailableReason::ClosedOnWeekday`].
pub fn is_date_available(date: NaiveDate, periods: &[SchedulePeriod]) -> Availability {
    if period_for(date, periods).is_none() {
        return Availability::closed(UnavailableReason::NoSchedule);
    }
    match hours_for(date, periods) {
        Some(day) if day.is_open => Availability::open(),
        _ => Availability::closed(UnavailableReason::ClosedOnWeekday),
    }
}

/// The declared opening/closing local times for `date`, or a closed range.
pub fn available_time_range(date: NaiveDate, periods: &[SchedulePeriod]) -> TimeRange {
    match hours_for(date, periods) {
        Some(day) if day.is_open => TimeRange {
            earliest: day.opening_time,
            latest: day.closing_time,
        },
        _ => TimeRange::CLOSED,
    }
}

/// Whether a pickup may start at local `time` on `date`.
///
/// Requires the date itself to be available (the date's reason propagates
/// otherwise). The closing boundary is exclusive: a pickup window must
/// start strictly before closing, so `opening <= time < closing`.
pub fn is_time_available(
    date: NaiveDate,
    time: NaiveTime,
    periods: &[SchedulePeriod],
) -> Availability {
    let date_availability = is_date_available(date, periods);
    if !date_availability.is_available {
        return date_availability;
    }

    match hours_for(date, periods) {
        Some(DayHours {
            is_open: true,
            opening_time: Some(opening),
            closing_time: Some(closing),
            ..
        }) if *opening <= time && time < *closing => Availability::open(),
        _ => Availability::closed(UnavailableReason::OutsideOpenHours),
    }
}

/// Whether a persisted slot still falls inside the location's opening hours.
///
/// Used to flag slots whose schedule changed after booking. The slot must
/// sit entirely on one open civil day, start no earlier than opening, and
/// end no later than closing (a window may end exactly at closing).
pub fn slot_within_hours(
    slot_earliest: DateTime<Utc>,
    slot_latest: DateTime<Utc>,
    periods: &[SchedulePeriod],
    tz: Tz,
) -> bool {
    let date = civil_date(slot_earliest, tz);
    if civil_date(slot_latest, tz) != date {
        return false;
    }

    match hours_for(date, periods) {
        Some(DayHours {
            is_open: true,
            opening_time: Some(opening),
            closing_time: Some(closing),
            ..
        }) => {
            let start = slot_earliest.with_timezone(&tz).time();
            let end = slot_latest.with_timezone(&tz).time();
            *opening <= start && end <= *closing
        }
        _ => false,
    }
}

// ── Slot grid generation ────────────────────────────────────────────────────

/// Lazy iterator over an equally-spaced grid of local times.
///
/// Produced by [`generate_time_slots_between`]. Restartable: `Clone` the
/// iterator to walk the grid again from the start.
#[derive(Debug, Clone)]
pub struct TimeSlots {
    next: Option<NaiveTime>,
    latest: NaiveTime,
    step: Duration,
    inclusive: bool,
}

impl Iterator for TimeSlots {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        let current = self.next?;
        let in_range = if self.inclusive {
            current <= self.latest
        } else {
            current < self.latest
        };
        if !in_range {
            self.next = None;
            return None;
        }

        // Stop instead of wrapping past midnight.
        let (advanced, wrapped_secs) = current.overflowing_add_signed(self.step);
        self.next = (wrapped_secs == 0).then_some(advanced);
        Some(current)
    }
}

impl std::iter::FusedIterator for TimeSlots {}

/// Equally-spaced pickup start times from `earliest` towards `latest`.
///
/// Steps by `slot_minutes`; `latest` itself is emitted only when
/// `inclusive`. A zero `slot_minutes` or an inverted range yields an empty
/// grid. Callers render each slot with [`crate::civil::format_local_time`]
/// and filter it through [`is_time_available`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use pickup_engine::availability::generate_time_slots_between;
///
/// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
/// let grid: Vec<NaiveTime> = generate_time_slots_between(nine, ten, 15, true).collect();
/// assert_eq!(grid.len(), 5);
/// ```
pub fn generate_time_slots_between(
    earliest: NaiveTime,
    latest: NaiveTime,
    slot_minutes: u32,
    inclusive: bool,
) -> TimeSlots {
    let next = (slot_minutes > 0).then_some(earliest);
    TimeSlots {
        next,
        latest,
        step: Duration::minutes(i64::from(slot_minutes)),
        inclusive,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
