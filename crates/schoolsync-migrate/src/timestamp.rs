//! Timestamp conversion shared by the message and grade passes.
//!
//! Conversion never fails: input that cannot be read as a point in time
//! yields `None` and the caller leaves the field alone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use schoolsync_store::{FieldValue, Fields, Timestamp};

/// Raw seconds key of timestamps exported by older clients.
pub const RAW_SECONDS: &str = "_seconds";
/// Raw sub-second key paired with [`RAW_SECONDS`].
pub const RAW_NANOSECONDS: &str = "_nanoseconds";

/// Layouts carrying a numeric offset without a colon (`+0000`).
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%a %b %d %Y %H:%M:%S GMT%z",
];

/// Offset-less layouts, read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
];

/// Date-only layouts, read as UTC midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

/// Convert a stored value into a structured timestamp.
///
/// - blank or missing: `None`
/// - `{_seconds, _nanoseconds?}` map: rebuilt from the raw parts
/// - string: parsed as a calendar date/time
/// - structured timestamp: returned unchanged
/// - anything else: `None`
pub fn to_timestamp(value: Option<&FieldValue>) -> Option<Timestamp> {
    let value = value?;
    if value.is_blank() {
        return None;
    }
    match value {
        FieldValue::Timestamp(ts) => Some(*ts),
        FieldValue::String(raw) => parse_date_string(raw),
        FieldValue::Map(map) => from_raw_parts(map),
        _ => None,
    }
}

/// Parse a free-form date string.
///
/// Accepts what browsers and mobile clients commonly stored:
/// - RFC 3339 and RFC 2822
/// - ISO date-times with a `+hhmm` offset
/// - the `Date.toString()` layout, e.g.
///   `Mon Jan 15 2024 10:00:00 GMT+0000 (Coordinated Universal Time)`
/// - offset-less date-times and dates (`2024-01-15`, `2024/01/15`,
///   `01/15/2024`, `Jan 15, 2024`), read as UTC
/// - the reduced ISO forms `YYYY` and `YYYY-MM`, read as the first day at
///   UTC midnight
pub fn parse_date_string(raw: &str) -> Option<Timestamp> {
    let input = strip_zone_name(raw.trim());
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(utc(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(utc(dt));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Some(utc(dt));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Timestamp::from_datetime(naive.and_utc()));
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .or_else(|| reduced_iso_date(input))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Timestamp::from_datetime(naive.and_utc()))
}

fn utc(dt: DateTime<FixedOffset>) -> Timestamp {
    Timestamp::from_datetime(dt.with_timezone(&Utc))
}

/// Drop a trailing ` (Zone Name)` as printed by `Date.toString()`.
fn strip_zone_name(input: &str) -> &str {
    match input.rfind(" (") {
        Some(start) if input.ends_with(')') => input[..start].trim_end(),
        _ => input,
    }
}

/// `YYYY` or `YYYY-MM`.
fn reduced_iso_date(input: &str) -> Option<NaiveDate> {
    let (year, month) = match input.split_once('-') {
        Some((year, month)) if month.len() == 2 && month.bytes().all(|b| b.is_ascii_digit()) => {
            (year, month.parse::<u32>().ok()?)
        }
        Some(_) => return None,
        None => (input, 1),
    };
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)
}

fn from_raw_parts(map: &Fields) -> Option<Timestamp> {
    let seconds = map
        .get(RAW_SECONDS)
        .filter(|v| !v.is_blank())
        .and_then(FieldValue::as_f64)
        .and_then(whole_number)?;
    let nanos = match map.get(RAW_NANOSECONDS) {
        Some(v) if !v.is_blank() => v.as_f64().and_then(whole_number)?,
        _ => 0,
    };
    let nanos = u32::try_from(nanos).ok()?;
    Timestamp::from_parts(seconds, nanos)
}

fn whole_number(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(n as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse_rfc3339(raw).expect("fixture timestamp should parse")
    }

    #[test]
    fn rfc3339_string_converts_to_that_instant() {
        let converted = to_timestamp(Some(&FieldValue::string("2024-01-15T10:00:00Z")));
        assert_eq!(converted, Some(ts("2024-01-15T10:00:00Z")));
        assert_eq!(converted.map(|t| t.seconds()), Some(1_705_312_800));
    }

    #[test]
    fn unparseable_string_converts_to_none() {
        assert_eq!(to_timestamp(Some(&FieldValue::string("not-a-date"))), None);
    }

    #[test]
    fn structured_timestamp_passes_through() {
        let original = ts("2023-06-01T08:30:15.250Z");
        assert_eq!(
            to_timestamp(Some(&FieldValue::Timestamp(original))),
            Some(original)
        );
    }

    #[test]
    fn blank_inputs_convert_to_none() {
        assert_eq!(to_timestamp(None), None);
        assert_eq!(to_timestamp(Some(&FieldValue::Null)), None);
        assert_eq!(to_timestamp(Some(&FieldValue::string(""))), None);
        assert_eq!(to_timestamp(Some(&FieldValue::Integer(0))), None);
    }

    #[test]
    fn raw_seconds_map_is_rebuilt() {
        let mut map = Fields::new();
        map.insert(RAW_SECONDS.to_string(), FieldValue::Integer(1_705_312_800));
        map.insert(RAW_NANOSECONDS.to_string(), FieldValue::Integer(500));
        let converted =
            to_timestamp(Some(&FieldValue::Map(map))).expect("raw parts should convert");
        assert_eq!(converted.seconds(), 1_705_312_800);
        assert_eq!(converted.nanos(), 500);
    }

    #[test]
    fn raw_seconds_without_nanos_defaults_to_zero() {
        let mut map = Fields::new();
        map.insert(RAW_SECONDS.to_string(), FieldValue::Double(1_705_312_800.0));
        let converted =
            to_timestamp(Some(&FieldValue::Map(map))).expect("raw seconds should convert");
        assert_eq!(converted, ts("2024-01-15T10:00:00Z"));
    }

    #[test]
    fn raw_parts_with_invalid_nanos_convert_to_none() {
        let mut map = Fields::new();
        map.insert(RAW_SECONDS.to_string(), FieldValue::Integer(10));
        map.insert(
            RAW_NANOSECONDS.to_string(),
            FieldValue::Integer(2_000_000_000),
        );
        assert_eq!(to_timestamp(Some(&FieldValue::Map(map))), None);
    }

    #[test]
    fn map_without_raw_seconds_converts_to_none() {
        let mut map = Fields::new();
        map.insert("seconds".to_string(), FieldValue::Integer(10));
        assert_eq!(to_timestamp(Some(&FieldValue::Map(map))), None);
    }

    #[test]
    fn numbers_and_arrays_convert_to_none() {
        assert_eq!(to_timestamp(Some(&FieldValue::Integer(1_705_312_800))), None);
        assert_eq!(
            to_timestamp(Some(&FieldValue::Array(vec![FieldValue::Integer(1)]))),
            None
        );
    }

    #[test]
    fn offsetless_and_date_only_strings_read_as_utc() {
        assert_eq!(
            parse_date_string("2024-01-15 10:00:00"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
        assert_eq!(
            parse_date_string("2024-01-15T10:00"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
        assert_eq!(
            parse_date_string("2024-01-15"),
            Some(ts("2024-01-15T00:00:00Z"))
        );
    }

    #[test]
    fn offsets_and_rfc2822_normalize_to_utc() {
        assert_eq!(
            parse_date_string("2024-01-15T07:00:00-03:00"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
        assert_eq!(
            parse_date_string("Mon, 15 Jan 2024 10:00:00 +0000"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
    }

    #[test]
    fn colonless_offset_is_accepted() {
        assert_eq!(
            parse_date_string("2024-01-15T10:00:00.000+0000"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
        assert_eq!(
            parse_date_string("2024-01-15T07:00:00-0300"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
    }

    #[test]
    fn browser_to_string_layout_is_accepted() {
        assert_eq!(
            parse_date_string("Mon Jan 15 2024 10:00:00 GMT+0000 (Coordinated Universal Time)"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
        assert_eq!(
            parse_date_string("Mon Jan 15 2024 07:00:00 GMT-0300 (Brasilia Standard Time)"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
    }

    #[test]
    fn slash_dates_are_read_as_utc() {
        assert_eq!(parse_date_string("2024/01/15"), Some(ts("2024-01-15T00:00:00Z")));
        assert_eq!(parse_date_string("01/15/2024"), Some(ts("2024-01-15T00:00:00Z")));
        assert_eq!(
            parse_date_string("01/15/2024 10:00:00"),
            Some(ts("2024-01-15T10:00:00Z"))
        );
    }

    #[test]
    fn month_name_dates_are_read_as_utc() {
        assert_eq!(parse_date_string("Jan 15, 2024"), Some(ts("2024-01-15T00:00:00Z")));
        assert_eq!(
            parse_date_string("January 15, 2024"),
            Some(ts("2024-01-15T00:00:00Z"))
        );
    }

    #[test]
    fn reduced_iso_forms_start_at_first_day() {
        assert_eq!(parse_date_string("2024-01"), Some(ts("2024-01-01T00:00:00Z")));
        assert_eq!(parse_date_string("2024"), Some(ts("2024-01-01T00:00:00Z")));
        assert_eq!(parse_date_string("2024-13"), None);
        assert_eq!(parse_date_string("24"), None);
        assert_eq!(parse_date_string("2024-1"), None);
        assert_eq!(parse_date_string("2024-+1"), None);
    }
}
