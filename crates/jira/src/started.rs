//! Normalization of the worklog `started` timestamp.
//!
//! Jira wants `YYYY-MM-DDTHH:mm:ss.SSS±HHMM`. Inputs that already carry an
//! offset (or `Z`) only get a `±HH:MM` suffix compacted to `±HHMM`. Anything
//! else is read as a local date-time and stamped with the offset that the
//! zone had at that instant, so DST is taken into account.

use crate::error::{JiraError, JiraResult};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

static OFFSET_BEARING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{3})?([+-]\d{2}:?\d{2}|Z|[+-]\d{4})$")
        .expect("offset pattern is valid")
});

static COLON_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]\d{2}):(\d{2})$").expect("colon offset pattern is valid"));

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize against the process's local time zone.
pub fn normalize_started(input: &str) -> JiraResult<String> {
    normalize_started_in(input, &Local)
}

/// Normalize against an explicit zone.
pub fn normalize_started_in<Tz>(input: &str, tz: &Tz) -> JiraResult<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let input = input.trim();
    if OFFSET_BEARING.is_match(input) {
        return Ok(COLON_OFFSET.replace(input, "$1$2").into_owned());
    }

    parse_in(input, tz)
        .map(|dt| format_started(&dt))
        .ok_or_else(|| JiraError::InvalidStarted(input.to_string()))
}

/// The current local time in Jira's format.
pub fn now_started() -> String {
    format_started(&Local::now())
}

fn format_started<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()
}

fn parse_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    // Full timestamps with an offset we did not pass through verbatim
    // (other fraction lengths, lowercase separators, ...)
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(tz));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    // Ambiguous wall-clock times (DST fall-back) resolve to the earlier one;
    // times inside a spring-forward gap do not exist and are rejected.
    tz.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use chrono_tz::Europe::Berlin;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_colon_offset_is_compacted() {
        assert_eq!(
            normalize_started("2025-10-03T09:00:00+03:00").unwrap(),
            "2025-10-03T09:00:00+0300"
        );
        assert_eq!(
            normalize_started("2025-10-03T09:00:00.250-03:00").unwrap(),
            "2025-10-03T09:00:00.250-0300"
        );
    }

    #[test]
    fn test_offset_bearing_inputs_pass_through() {
        for input in [
            "2025-10-03T09:00:00+0300",
            "2025-10-03T09:00:00.000Z",
            "2025-10-03T09:00:00Z",
        ] {
            assert_eq!(normalize_started(input).unwrap(), input);
        }
    }

    #[test]
    fn test_idempotent_on_offset_bearing_inputs() {
        for input in [
            "2025-10-03T09:00:00+03:00",
            "2025-10-03T09:00:00.123-0530",
            "2025-10-03T09:00:00Z",
        ] {
            let once = normalize_started(input).unwrap();
            let twice = normalize_started(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_local_input_gets_zone_offset() {
        assert_eq!(
            normalize_started_in("2025-10-03T09:00:00", &brt()).unwrap(),
            "2025-10-03T09:00:00.000-0300"
        );
        assert_eq!(
            normalize_started_in("2025-10-03T09:00", &brt()).unwrap(),
            "2025-10-03T09:00:00.000-0300"
        );
        assert_eq!(
            normalize_started_in("2025-10-03 09:00:00.5", &brt()).unwrap(),
            "2025-10-03T09:00:00.500-0300"
        );
    }

    #[test]
    fn test_date_only_is_local_midnight() {
        assert_eq!(
            normalize_started_in("2025-10-03", &brt()).unwrap(),
            "2025-10-03T00:00:00.000-0300"
        );
    }

    #[test]
    fn test_other_offset_forms_are_converted_to_zone() {
        assert_eq!(
            normalize_started_in("2025-10-03T12:00:00.123456Z", &brt()).unwrap(),
            "2025-10-03T09:00:00.123-0300"
        );
    }

    #[test]
    fn test_local_output_is_stable() {
        let once = normalize_started_in("2025-10-03T09:00:00", &brt()).unwrap();
        assert_eq!(normalize_started_in(&once, &brt()).unwrap(), once);
    }

    #[test]
    fn test_invalid_input() {
        let err = normalize_started("yesterday at nine").unwrap_err();
        assert_eq!(err.to_string(), "invalid started value: yesterday at nine");
        assert!(normalize_started("2025-13-40T99:00:00").is_err());
    }

    #[test]
    fn test_now_matches_jira_format() {
        assert!(OFFSET_BEARING.is_match(&now_started()));
    }

    #[test]
    fn test_zone_offset_follows_dst() {
        assert_eq!(
            normalize_started_in("2025-07-01T09:00", &Berlin).unwrap(),
            "2025-07-01T09:00:00.000+0200"
        );
        assert_eq!(
            normalize_started_in("2025-01-15 09:00:00", &Berlin).unwrap(),
            "2025-01-15T09:00:00.000+0100"
        );
    }

    #[test]
    fn test_repeated_fall_back_time_takes_earlier_offset() {
        // 02:30 happens twice on 2025-10-26 in Berlin, first at +0200
        assert_eq!(
            normalize_started_in("2025-10-26T02:30:00", &Berlin).unwrap(),
            "2025-10-26T02:30:00.000+0200"
        );
    }

    #[test]
    fn test_spring_forward_gap_is_rejected() {
        let err = normalize_started_in("2025-03-30T02:30:00", &Berlin).unwrap_err();
        assert!(matches!(err, JiraError::InvalidStarted(ref s) if s == "2025-03-30T02:30:00"));
    }
}
