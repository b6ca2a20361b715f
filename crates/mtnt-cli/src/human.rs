use chrono::{DateTime, TimeDelta, Utc};

const DAYS_PER_MONTH: i64 = 30;

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// `2 days`, `25 minutes`, `2 months and 1 day`. Months are 30 days.
pub fn human_interval(interval: Option<TimeDelta>) -> String {
    let Some(interval) = interval.filter(|i| !i.is_zero()) else {
        return "no interval provided".to_string();
    };

    let secs = interval.num_seconds();
    if secs < 1 {
        return "less than a second".to_string();
    }
    if secs < 60 {
        return plural(secs, "second");
    }
    if secs < 3_600 {
        return plural(interval.num_minutes(), "minute");
    }
    if secs < 86_400 {
        let hours = interval.num_hours();
        let minutes = interval.num_minutes() - hours * 60;
        return match minutes {
            0 => plural(hours, "hour"),
            m => format!("{} and {}", plural(hours, "hour"), plural(m, "minute")),
        };
    }

    let days = interval.num_days();
    if days <= DAYS_PER_MONTH {
        return plural(days, "day");
    }
    match (days / DAYS_PER_MONTH, days % DAYS_PER_MONTH) {
        (months, 0) => plural(months, "month"),
        (months, rest) => format!("{} and {}", plural(months, "month"), plural(rest, "day")),
    }
}

/// `now`, `in 5 hours`, `tomorrow`, `3 days ago`, relative to `now`.
pub fn human_date(value: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(value) = value else {
        return "no date provided".to_string();
    };

    let delta = value - now;
    let future = delta > TimeDelta::zero();
    let abs = delta.abs();

    if abs < TimeDelta::minutes(1) {
        return "now".to_string();
    }
    let amount = if abs < TimeDelta::hours(1) {
        plural(abs.num_minutes(), "minute")
    } else if abs < TimeDelta::days(1) {
        plural(abs.num_hours(), "hour")
    } else if abs < TimeDelta::days(2) {
        return if future { "tomorrow" } else { "yesterday" }.to_string();
    } else {
        plural(abs.num_days(), "day")
    };

    if future {
        format!("in {amount}")
    } else {
        format!("{amount} ago")
    }
}
