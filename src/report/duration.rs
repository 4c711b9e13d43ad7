//! Humanized durations
//!
//! Coarse, approximate rendering of elapsed time ("a few seconds", "2 hours").
//! Thresholds follow the conventions used by common relative-time libraries so
//! reports read the same as the rest of the host's UI.

const SECONDS_THRESHOLD: f64 = 45.0;
const MINUTES_THRESHOLD: f64 = 45.0;
const HOURS_THRESHOLD: f64 = 22.0;
const DAYS_THRESHOLD: f64 = 26.0;
const MONTHS_THRESHOLD: f64 = 11.0;

const MILLIS_PER_SECOND: f64 = 1_000.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Render a signed millisecond interval; the sign is ignored
pub fn humanize_millis(millis: i64) -> String {
    let millis = (millis as f64).abs();

    let seconds = round_half_up(millis / MILLIS_PER_SECOND);
    let minutes = round_half_up(millis / MILLIS_PER_MINUTE);
    let hours = round_half_up(millis / MILLIS_PER_HOUR);
    let exact_days = millis / MILLIS_PER_DAY;
    let days = round_half_up(exact_days);
    // 400 years hold 146097 days and 4800 months
    let exact_months = exact_days * 4800.0 / 146_097.0;
    let months = round_half_up(exact_months);
    let years = round_half_up(exact_months / 12.0);

    if seconds < SECONDS_THRESHOLD {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < MINUTES_THRESHOLD {
        format!("{} minutes", minutes)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < HOURS_THRESHOLD {
        format!("{} hours", hours)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < DAYS_THRESHOLD {
        format!("{} days", days)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < MONTHS_THRESHOLD {
        format!("{} months", months)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
