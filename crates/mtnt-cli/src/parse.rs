use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc,
};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("could not parse date '{0}'")]
    Date(String),

    #[error("could not parse interval '{0}'")]
    Interval(String),
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

static GLUED_RE: OnceLock<Regex> = OnceLock::new();

fn glued_re() -> &'static Regex {
    GLUED_RE.get_or_init(|| Regex::new(r"^(\d+)([a-z]+)$").unwrap())
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Resolve a human date relative to `now`.
///
/// Accepts `now`, `today`, `tomorrow`, `yesterday`, `in <interval>`,
/// `<interval> ago`, RFC 3339, and `YYYY-MM-DD[ HH:MM[:SS]]` in local time.
/// Relative forms are rounded to the nearest minute.
pub fn parse_date(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ParseError> {
    let text = input.trim().to_lowercase();
    let fail = || ParseError::Date(input.to_string());

    match text.as_str() {
        "now" | "today" => return Ok(round_datetime(now)),
        "tomorrow" => return Ok(round_datetime(now + TimeDelta::days(1))),
        "yesterday" => return Ok(round_datetime(now - TimeDelta::days(1))),
        _ => {}
    }

    if let Some(rest) = text.strip_prefix("in ") {
        let delta = interval_terms(rest).ok_or_else(fail)?;
        return now
            .checked_add_signed(delta)
            .map(round_datetime)
            .ok_or_else(fail);
    }
    if let Some(rest) = text.strip_suffix(" ago") {
        let delta = interval_terms(rest).ok_or_else(fail)?;
        return now
            .checked_sub_signed(delta)
            .map(round_datetime)
            .ok_or_else(fail);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input.trim(), fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(fail)?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(fail)
}

/// Round to the nearest whole minute.
pub fn round_datetime(value: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value);
    if value.second() >= 30 {
        truncated + TimeDelta::minutes(1)
    } else {
        truncated
    }
}

// ---------------------------------------------------------------------------
// Intervals
// ---------------------------------------------------------------------------

/// Parse a fixed-length interval such as `30 days`, `1h 30m` or
/// `two minutes, 29 seconds`. An empty string is a zero interval (a one-shot
/// task). Intervals under a minute are rounded to the second, longer ones to
/// the minute.
pub fn parse_interval(input: &str) -> Result<TimeDelta, ParseError> {
    if input.trim().is_empty() {
        return Ok(TimeDelta::zero());
    }
    interval_terms(input)
        .map(round_interval)
        .ok_or_else(|| ParseError::Interval(input.to_string()))
}

/// Like [`parse_interval`], but a leading `-` negates the result. Used for
/// windows that look backward.
pub fn parse_signed_interval(input: &str) -> Result<TimeDelta, ParseError> {
    match input.trim().strip_prefix('-') {
        Some(rest) => parse_interval(rest).map(|d| -d),
        None => parse_interval(input),
    }
}

pub fn round_interval(precise: TimeDelta) -> TimeDelta {
    let millis = precise.num_milliseconds();
    if millis.abs() < 60_000 {
        return TimeDelta::seconds((millis as f64 / 1000.0).round() as i64);
    }
    TimeDelta::minutes((millis as f64 / 60_000.0).round() as i64)
}

fn interval_terms(text: &str) -> Option<TimeDelta> {
    let text = text.to_lowercase().replace(',', " ");
    let mut words = text.split_whitespace().filter(|w| *w != "and");

    let mut total = TimeDelta::zero();
    let mut terms = 0;
    while let Some(word) = words.next() {
        let (count, unit) = match glued_re().captures(word) {
            Some(caps) => (
                caps.get(1)?.as_str().parse::<i64>().ok()?,
                unit_length(caps.get(2)?.as_str())?,
            ),
            None => (count_word(word)?, unit_length(words.next()?)?),
        };
        total = total.checked_add(&unit.checked_mul(i32::try_from(count).ok()?)?)?;
        terms += 1;
    }
    (terms > 0).then_some(total)
}

fn count_word(word: &str) -> Option<i64> {
    if let Ok(n) = word.parse::<i64>() {
        return Some(n);
    }
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

fn unit_length(unit: &str) -> Option<TimeDelta> {
    let delta = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => TimeDelta::seconds(1),
        "m" | "min" | "mins" | "minute" | "minutes" => TimeDelta::minutes(1),
        "h" | "hr" | "hrs" | "hour" | "hours" => TimeDelta::hours(1),
        "d" | "day" | "days" => TimeDelta::days(1),
        "w" | "wk" | "wks" | "week" | "weeks" => TimeDelta::weeks(1),
        _ => return None,
    };
    Some(delta)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
