use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};

/// Named ranges understood by the calendar tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Today,
    ThisWeek,
    NextWeek,
    Next7Days,
}

impl TimeRange {
    /// Unknown or empty ranges fall back to the next seven days.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "today" => Self::Today,
            "this week" => Self::ThisWeek,
            "next week" => Self::NextWeek,
            _ => Self::Next7Days,
        }
    }

    /// `[start, end)` relative to `now`. Weeks start on Sunday at local midnight.
    pub fn bounds(&self, now: DateTime<FixedOffset>) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
        let midnight = start_of_day(now);
        match self {
            Self::Today => (midnight, midnight + Duration::days(1)),
            Self::ThisWeek => {
                let start = midnight - Duration::days(now.weekday().num_days_from_sunday() as i64);
                (start, start + Duration::days(7))
            }
            Self::NextWeek => {
                let start = midnight - Duration::days(now.weekday().num_days_from_sunday() as i64)
                    + Duration::days(7);
                (start, start + Duration::days(7))
            }
            Self::Next7Days => (now, now + Duration::days(7)),
        }
    }
}

fn start_of_day(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| now.offset().from_local_datetime(&naive).single())
        .unwrap_or(now)
}

/// Query window sent to the calendar provider
#[derive(Debug, Clone, PartialEq)]
pub struct EventWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Zone name forwarded to the provider, when the caller gave one
    pub time_zone: Option<String>,
}

impl EventWindow {
    pub fn new(range: TimeRange, timezone: &str, default_offset: FixedOffset, now: DateTime<Utc>) -> Self {
        let (offset, time_zone) = resolve_offset(timezone, default_offset);
        let (start, end) = range.bounds(now.with_timezone(&offset));
        Self { start, end, time_zone }
    }

    pub fn offset(&self) -> FixedOffset {
        *self.start.offset()
    }
}

/// Resolve a timezone argument to a fixed offset.
///
/// `UTC`, `Z` and `±HH:MM` are understood directly. Any other name uses
/// `default_offset` and is passed through for the provider to interpret.
pub fn resolve_offset(timezone: &str, default_offset: FixedOffset) -> (FixedOffset, Option<String>) {
    let tz = timezone.trim();
    if tz.is_empty() {
        return (default_offset, None);
    }
    if matches!(tz.to_ascii_uppercase().as_str(), "UTC" | "Z" | "GMT" | "ETC/UTC") {
        return (FixedOffset::east_opt(0).unwrap_or(default_offset), Some("UTC".to_string()));
    }
    if let Some(offset) = parse_numeric_offset(tz) {
        return (offset, None);
    }
    (default_offset, Some(tz.to_string()))
}

fn parse_numeric_offset(tz: &str) -> Option<FixedOffset> {
    let sign = match tz.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = tz[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
