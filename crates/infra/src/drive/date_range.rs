//! Modified-date range resolution for listing filters.
//!
//! Resolution is a pure function of the named range type and a reference
//! "now" instant, so callers pin the clock in tests. Bounds are rendered in
//! the listing filter's timestamp layout (millisecond precision, no zone
//! suffix). Custom ranges are validated but returned verbatim.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use driveflow_domain::constants::FILTER_TIMESTAMP_FORMAT;
use driveflow_domain::{DateRange, DateRangeType, DriveFlowError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// A calendar date, optionally followed by a `T`/space-separated time with
/// fractional seconds and a zone suffix.
const DATE_LITERAL_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}([Tt ]\d{2}:\d{2}:\d{2}(\.\d{1,9})?([Zz]|[+-]\d{2}:\d{2})?)?$";

static DATE_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DATE_LITERAL_PATTERN).expect("DATE_LITERAL should compile - this is a bug")
});

/// Resolve a named range against the reference instant.
///
/// Returns `None` for [`DateRangeType::None`]; every computed range
/// satisfies start <= end. `start_date`/`end_date` are only consulted for
/// [`DateRangeType::Custom`].
pub fn resolve_date_range(
    range_type: DateRangeType,
    start_date: Option<&str>,
    end_date: Option<&str>,
    now: NaiveDateTime,
) -> Result<Option<DateRange>> {
    let range = match range_type {
        DateRangeType::None => return Ok(None),
        DateRangeType::Last7Days => rolling_window(now, 7)?,
        DateRangeType::Last30Days => rolling_window(now, 30)?,
        DateRangeType::PreviousQuarter => previous_quarter(now)?,
        DateRangeType::CurrentQuarter => {
            DateRange::new(format_timestamp(quarter_start(now)?), format_timestamp(now))
        }
        DateRangeType::LastYear => last_year(now)?,
        DateRangeType::CurrentYear => DateRange::new(
            format_timestamp(start_of_day(date(now.year(), 1, 1)?)),
            format_timestamp(now),
        ),
        DateRangeType::Custom => custom_range(start_date, end_date)?,
    };

    Ok(Some(range))
}

fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(FILTER_TIMESTAMP_FORMAT).to_string()
}

/// `[now - days, now]`.
fn rolling_window(now: NaiveDateTime, days: i64) -> Result<DateRange> {
    let start = now.checked_sub_signed(Duration::days(days)).ok_or_else(|| {
        DriveFlowError::InvalidDateRange(format!(
            "reference time does not support a {days}-day window"
        ))
    })?;
    Ok(DateRange::new(format_timestamp(start), format_timestamp(now)))
}

/// First instant of the quarter containing `now`.
fn quarter_start(now: NaiveDateTime) -> Result<NaiveDateTime> {
    let month = ((now.month() - 1) / 3) * 3 + 1;
    Ok(start_of_day(date(now.year(), month, 1)?))
}

/// Whole quarter before the one containing `now`, day-start to day-end.
fn previous_quarter(now: NaiveDateTime) -> Result<DateRange> {
    let current_start_month = ((now.month() - 1) / 3) * 3 + 1;
    let (year, month) = if current_start_month == 1 {
        (now.year() - 1, 10)
    } else {
        (now.year(), current_start_month - 3)
    };

    let start = date(year, month, 1)?;
    let end = date(now.year(), current_start_month, 1)?.pred_opt().ok_or_else(|| {
        DriveFlowError::InvalidDateRange("quarter start has no preceding day".to_string())
    })?;

    Ok(DateRange::new(format_timestamp(start_of_day(start)), format_timestamp(end_of_day(end)?)))
}

/// The whole previous calendar year, day-start to day-end.
fn last_year(now: NaiveDateTime) -> Result<DateRange> {
    let year = now.year() - 1;
    Ok(DateRange::new(
        format_timestamp(start_of_day(date(year, 1, 1)?)),
        format_timestamp(end_of_day(date(year, 12, 31)?)?),
    ))
}

/// Caller-supplied literal bounds, validated and returned unchanged.
fn custom_range(start_date: Option<&str>, end_date: Option<&str>) -> Result<DateRange> {
    let start = validated_literal(start_date, "start date")?;
    let end = validated_literal(end_date, "end date")?;
    Ok(DateRange::new(start, end))
}

fn validated_literal(value: Option<&str>, label: &str) -> Result<String> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DriveFlowError::InvalidDateRange(format!("custom range requires a {label}")))?;

    if !DATE_LITERAL.is_match(value) {
        return Err(DriveFlowError::InvalidDateRange(format!(
            "{label} '{value}' is not a valid date/time literal"
        )));
    }

    Ok(value.to_string())
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        DriveFlowError::InvalidDateRange(format!(
            "invalid calendar date {year:04}-{month:02}-{day:02}"
        ))
    })
}

fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

fn end_of_day(day: NaiveDate) -> Result<NaiveDateTime> {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .map(|time| day.and_time(time))
        .ok_or_else(|| DriveFlowError::InvalidDateRange("invalid end-of-day time".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2019-09-19T19:52:13.456", "%Y-%m-%dT%H:%M:%S%.3f")
            .expect("valid reference timestamp")
    }

    fn resolve(range_type: DateRangeType) -> Option<DateRange> {
        resolve_date_range(range_type, None, None, reference_now()).expect("resolution succeeds")
    }

    /// Validates `resolve_date_range` behavior for the none scenario.
    ///
    /// Assertions:
    /// - Confirms `DateRangeType::None` emits no range.
    #[test]
    fn test_none_emits_no_range() {
        assert_eq!(resolve(DateRangeType::None), None);
    }

    /// Validates `resolve_date_range` behavior for the rolling window
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms last-7-days resolves to
    ///   [2019-09-12T19:52:13.456, 2019-09-19T19:52:13.456].
    #[test]
    fn test_last_7_days_window() {
        let range = resolve(DateRangeType::Last7Days).expect("range");
        assert_eq!(range.start_date, "2019-09-12T19:52:13.456");
        assert_eq!(range.end_date, "2019-09-19T19:52:13.456");
    }

    /// Validates `resolve_date_range` behavior for the last-30-days
    /// scenario.
    #[test]
    fn test_last_30_days_window() {
        let range = resolve(DateRangeType::Last30Days).expect("range");
        assert_eq!(range.start_date, "2019-08-20T19:52:13.456");
        assert_eq!(range.end_date, "2019-09-19T19:52:13.456");
    }

    /// Validates `resolve_date_range` behavior for the previous quarter
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the quarter before Q3 2019 spans
    ///   [2019-04-01T00:00:00.000, 2019-06-30T23:59:59.999].
    #[test]
    fn test_previous_quarter() {
        let range = resolve(DateRangeType::PreviousQuarter).expect("range");
        assert_eq!(range.start_date, "2019-04-01T00:00:00.000");
        assert_eq!(range.end_date, "2019-06-30T23:59:59.999");
    }

    /// Tests the year-wrap case: in Q1 the previous quarter is Oct-Dec of
    /// the prior year.
    #[test]
    fn test_previous_quarter_wraps_year() {
        let january = NaiveDateTime::parse_from_str("2020-02-10T08:00:00.000", "%Y-%m-%dT%H:%M:%S%.3f")
            .expect("valid timestamp");
        let range = resolve_date_range(DateRangeType::PreviousQuarter, None, None, january)
            .expect("resolution succeeds")
            .expect("range");
        assert_eq!(range.start_date, "2019-10-01T00:00:00.000");
        assert_eq!(range.end_date, "2019-12-31T23:59:59.999");
    }

    /// Validates `resolve_date_range` behavior for the current quarter
    /// scenario.
    #[test]
    fn test_current_quarter_ends_at_now() {
        let range = resolve(DateRangeType::CurrentQuarter).expect("range");
        assert_eq!(range.start_date, "2019-07-01T00:00:00.000");
        assert_eq!(range.end_date, "2019-09-19T19:52:13.456");
    }

    /// Validates `resolve_date_range` behavior for the last year scenario.
    #[test]
    fn test_last_year_is_whole_previous_year() {
        let range = resolve(DateRangeType::LastYear).expect("range");
        assert_eq!(range.start_date, "2018-01-01T00:00:00.000");
        assert_eq!(range.end_date, "2018-12-31T23:59:59.999");
    }

    /// Validates `resolve_date_range` behavior for the current year
    /// scenario.
    #[test]
    fn test_current_year_ends_at_now() {
        let range = resolve(DateRangeType::CurrentYear).expect("range");
        assert_eq!(range.start_date, "2019-01-01T00:00:00.000");
        assert_eq!(range.end_date, "2019-09-19T19:52:13.456");
    }

    /// Validates `resolve_date_range` behavior for the custom round-trip
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms literal bounds come back unchanged.
    #[test]
    fn test_custom_range_round_trips_literals() {
        let range = resolve_date_range(
            DateRangeType::Custom,
            Some("2019-01-15T10:00:00"),
            Some("2019-03-20"),
            reference_now(),
        )
        .expect("resolution succeeds")
        .expect("range");

        assert_eq!(range.start_date, "2019-01-15T10:00:00");
        assert_eq!(range.end_date, "2019-03-20");
    }

    /// Validates `resolve_date_range` behavior for the malformed custom
    /// bounds scenario.
    ///
    /// Assertions:
    /// - Ensures malformed or missing bounds fail with `InvalidDateRange`.
    #[test]
    fn test_custom_range_rejects_malformed_literals() {
        let err = resolve_date_range(
            DateRangeType::Custom,
            Some("01/15/2019"),
            Some("2019-03-20"),
            reference_now(),
        )
        .unwrap_err();
        assert!(matches!(err, DriveFlowError::InvalidDateRange(_)));

        let err =
            resolve_date_range(DateRangeType::Custom, None, Some("2019-03-20"), reference_now())
                .unwrap_err();
        assert!(matches!(err, DriveFlowError::InvalidDateRange(_)));
    }

    /// Tests that zoned and fractional custom literals pass validation.
    #[test]
    fn test_custom_range_accepts_zoned_literals() {
        let range = resolve_date_range(
            DateRangeType::Custom,
            Some("2019-01-15T10:00:00.123Z"),
            Some("2019-03-20T00:00:00+02:00"),
            reference_now(),
        )
        .expect("resolution succeeds")
        .expect("range");

        assert_eq!(range.start_date, "2019-01-15T10:00:00.123Z");
        assert_eq!(range.end_date, "2019-03-20T00:00:00+02:00");
    }
}
