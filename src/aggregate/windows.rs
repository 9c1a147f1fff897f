//! Day, week, month and year visit counts with period-over-period trends.

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::aggregate::types::{WindowMetric, WindowMetrics};
use crate::aggregate::utility::trend_percent;
use crate::model::VisitRecord;

/// Closed range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A rollup window and the equivalent window immediately before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub current: DateRange,
    pub previous: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollup {
    Day,
    /// Weeks start on Monday.
    Week,
    Month,
    Year,
}

impl Rollup {
    pub const ALL: [Rollup; 4] = [Rollup::Day, Rollup::Week, Rollup::Month, Rollup::Year];

    /// Windows anchored on `today`. Current windows end on `today`.
    ///
    /// Date arithmetic saturates at [`NaiveDate::MIN`], so extreme anchors
    /// never panic.
    pub fn bounds(self, today: NaiveDate) -> WindowBounds {
        let back_days = |date: NaiveDate, n: u64| {
            date.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
        };
        let back_months = |date: NaiveDate, n: u32| {
            date.checked_sub_months(Months::new(n)).unwrap_or(NaiveDate::MIN)
        };

        let start = match self {
            Rollup::Day => today,
            Rollup::Week => back_days(today, today.weekday().num_days_from_monday() as u64),
            Rollup::Month => back_days(today, today.day0() as u64),
            Rollup::Year => back_days(today, today.ordinal0() as u64),
        };

        let previous_start = match self {
            Rollup::Day => back_days(start, 1),
            Rollup::Week => back_days(start, 7),
            Rollup::Month => back_months(start, 1),
            Rollup::Year => back_months(start, 12),
        };

        WindowBounds {
            current: DateRange::new(start, today),
            previous: DateRange::new(previous_start, back_days(start, 1)),
        }
    }
}

/// Window metrics plus the number of records that could not be dated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowOutcome {
    pub metrics: WindowMetrics,
    pub skipped_records: usize,
}

/// Parses a visit's creation timestamp into a calendar day in `offset`.
///
/// Accepts RFC 3339 timestamps (converted into `offset`), naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` / `YYYY-MM-DD HH:MM:SS[.fff]` timestamps (taken
/// as already local), and bare `YYYY-MM-DD` dates.
pub fn parse_created_at(raw: &str, offset: &FixedOffset) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(offset).date_naive());
    }

    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt.date());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Counts records per rollup window relative to `reference`.
///
/// `reference` is a local time in `offset`; only its calendar day matters.
/// Both ends of every window are inclusive. Records whose timestamp is
/// missing or unparseable are left out of every count and reported in
/// [`WindowOutcome::skipped_records`].
pub fn aggregate_windows(
    records: &[VisitRecord],
    reference: NaiveDateTime,
    offset: &FixedOffset,
) -> WindowOutcome {
    let today = reference.date();
    let bounds = Rollup::ALL.map(|r| r.bounds(today));

    let mut current = [0u64; 4];
    let mut previous = [0u64; 4];
    let mut skipped = 0;

    for record in records {
        let Some(date) = record
            .created_at
            .as_deref()
            .and_then(|raw| parse_created_at(raw, offset))
        else {
            skipped += 1;
            continue;
        };

        for (i, window) in bounds.iter().enumerate() {
            if window.current.contains(date) {
                current[i] += 1;
            } else if window.previous.contains(date) {
                previous[i] += 1;
            }
        }
    }

    let metric = |i: usize| WindowMetric {
        count: current[i],
        previous_count: previous[i],
        trend_percent: trend_percent(current[i], previous[i]),
    };

    debug!(
        reference = %today,
        records = records.len(),
        skipped,
        "Window metrics aggregated"
    );

    WindowOutcome {
        metrics: WindowMetrics {
            daily: metric(0),
            weekly: metric(1),
            monthly: metric(2),
            yearly: metric(3),
        },
        skipped_records: skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(created_at: &str) -> VisitRecord {
        VisitRecord::new(created_at, "s", "p")
    }

    #[test]
    fn test_daily_window_compares_with_yesterday() {
        let records = vec![at("2024-01-01T09:00:00"), at("2024-01-02T08:30:00")];

        let outcome = aggregate_windows(&records, noon(2024, 1, 2), &utc());
        let daily = outcome.metrics.daily;

        assert_eq!(daily.count, 1);
        assert_eq!(daily.previous_count, 1);
        assert_eq!(daily.trend_percent, 0.0);
    }

    #[test]
    fn test_whole_reference_day_counts() {
        // Later the same day than the reference instant still counts.
        let records = vec![at("2024-01-02T23:59:59")];

        let outcome = aggregate_windows(&records, noon(2024, 1, 2), &utc());

        assert_eq!(outcome.metrics.daily.count, 1);
    }

    #[test]
    fn test_week_bounds_start_monday() {
        // 2024-01-10 is a Wednesday
        let b = Rollup::Week.bounds(date(2024, 1, 10));

        assert_eq!(b.current, DateRange::new(date(2024, 1, 8), date(2024, 1, 10)));
        assert_eq!(b.previous, DateRange::new(date(2024, 1, 1), date(2024, 1, 7)));
    }

    #[test]
    fn test_week_bounds_on_sunday() {
        let b = Rollup::Week.bounds(date(2024, 1, 14));
        assert_eq!(b.current.start, date(2024, 1, 8));
    }

    #[test]
    fn test_month_and_year_bounds() {
        let m = Rollup::Month.bounds(date(2024, 3, 15));
        assert_eq!(m.current, DateRange::new(date(2024, 3, 1), date(2024, 3, 15)));
        assert_eq!(m.previous, DateRange::new(date(2024, 2, 1), date(2024, 2, 29)));

        let jan = Rollup::Month.bounds(date(2024, 1, 5));
        assert_eq!(jan.previous, DateRange::new(date(2023, 12, 1), date(2023, 12, 31)));

        let y = Rollup::Year.bounds(date(2024, 6, 1));
        assert_eq!(y.current, DateRange::new(date(2024, 1, 1), date(2024, 6, 1)));
        assert_eq!(y.previous, DateRange::new(date(2023, 1, 1), date(2023, 12, 31)));
    }

    #[test]
    fn test_trends_per_window() {
        let records = vec![
            at("2024-03-13"),
            at("2024-03-12"),
            at("2024-03-04"),
            at("2024-02-10"),
            at("2024-02-11"),
            at("2023-05-05"),
        ];

        // Wednesday
        let outcome = aggregate_windows(&records, noon(2024, 3, 13), &utc());
        let m = outcome.metrics;

        assert_eq!((m.daily.count, m.daily.previous_count), (1, 1));
        assert_eq!((m.weekly.count, m.weekly.previous_count), (2, 1));
        assert_eq!(m.weekly.trend_percent, 100.0);
        assert_eq!((m.monthly.count, m.monthly.previous_count), (3, 2));
        assert_eq!(m.monthly.trend_percent, 50.0);
        assert_eq!((m.yearly.count, m.yearly.previous_count), (5, 1));
        assert_eq!(m.yearly.trend_percent, 400.0);
    }

    #[test]
    fn test_zero_previous_gives_zero_trend() {
        let records = vec![at("2024-03-13")];

        let m = aggregate_windows(&records, noon(2024, 3, 13), &utc()).metrics;

        for w in [m.daily, m.weekly, m.monthly, m.yearly] {
            assert_eq!(w.count, 1);
            assert_eq!(w.trend_percent, 0.0);
            assert!(w.trend_percent.is_finite());
        }
    }

    #[test]
    fn test_future_records_are_not_counted() {
        let records = vec![at("2024-03-14")];

        let m = aggregate_windows(&records, noon(2024, 3, 13), &utc()).metrics;

        assert_eq!(m.daily.count, 0);
        assert_eq!(m.weekly.count, 0);
    }

    #[test]
    fn test_bad_timestamps_are_skipped() {
        let mut missing = at("");
        missing.created_at = None;
        let records = vec![at("not a date"), missing, at("2024-03-13T10:00:00Z")];

        let outcome = aggregate_windows(&records, noon(2024, 3, 13), &utc());

        assert_eq!(outcome.skipped_records, 2);
        assert_eq!(outcome.metrics.daily.count, 1);
    }

    #[test]
    fn test_offset_moves_calendar_day() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(
            parse_created_at("2024-01-01T23:30:00Z", &plus_two),
            Some(date(2024, 1, 2))
        );
        assert_eq!(
            parse_created_at("2024-01-01T23:30:00", &plus_two),
            Some(date(2024, 1, 1))
        );
    }

    #[test]
    fn test_parse_created_at_formats() {
        let tz = utc();

        assert_eq!(
            parse_created_at("2024-01-02T10:15:00.123Z", &tz),
            Some(date(2024, 1, 2))
        );
        assert_eq!(
            parse_created_at("2024-01-02T10:15:00.123", &tz),
            Some(date(2024, 1, 2))
        );
        assert_eq!(
            parse_created_at("2024-01-02 10:15:00", &tz),
            Some(date(2024, 1, 2))
        );
        assert_eq!(parse_created_at("2024-01-02", &tz), Some(date(2024, 1, 2)));
        assert_eq!(parse_created_at("02/01/2024", &tz), None);
    }

    #[test]
    fn test_bounds_at_earliest_date_do_not_panic() {
        for rollup in Rollup::ALL {
            let b = rollup.bounds(NaiveDate::MIN);
            assert_eq!(b.current.end, NaiveDate::MIN);
            assert_eq!(b.previous.start, NaiveDate::MIN);
        }

        let reference = NaiveDate::MIN.and_hms_opt(12, 0, 0).unwrap();
        let outcome = aggregate_windows(&[at("2024-03-13")], reference, &utc());
        assert_eq!(outcome.metrics.yearly.count, 0);
    }

    #[test]
    fn test_empty_input() {
        let outcome = aggregate_windows(&[], noon(2024, 3, 13), &utc());

        assert_eq!(outcome, WindowOutcome::default());
    }
}
