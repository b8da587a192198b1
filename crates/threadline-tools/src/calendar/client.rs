use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use serde::Deserialize;

use super::range::EventWindow;
use crate::error::ToolError;

pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Clone, PartialEq)]
pub enum EventStart {
    At(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: EventStart,
    pub location: Option<String>,
}

impl CalendarEvent {
    /// `summary (YYYY-MM-DD HH:MM)` with timed events shown in `offset`
    pub fn format_line(&self, offset: FixedOffset) -> String {
        let when = match &self.start {
            EventStart::At(at) => at.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string(),
            EventStart::AllDay(date) => format!("{} 00:00", date.format("%Y-%m-%d")),
        };
        format!("{} ({})", self.summary, when)
    }
}

#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn list_events(&self, window: &EventWindow) -> Result<Vec<CalendarEvent>, ToolError>;
}

/// Google Calendar REST client authenticated with a bearer access token
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
    calendar_id: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: impl Into<String>, calendar_id: impl Into<String>) -> Result<Self, ToolError> {
        Ok(Self {
            http_client: reqwest::Client::builder().build()?,
            base_url: GOOGLE_CALENDAR_API_BASE.to_string(),
            access_token: access_token.into(),
            calendar_id: calendar_id.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl EventItem {
    fn into_event(self) -> Option<CalendarEvent> {
        let start = self.start?;
        let start = match (start.date_time.as_deref(), start.date.as_deref()) {
            (Some(dt), _) if !dt.is_empty() => EventStart::At(DateTime::parse_from_rfc3339(dt).ok()?),
            (_, Some(d)) if !d.is_empty() => EventStart::AllDay(NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()?),
            _ => return None,
        };
        Some(CalendarEvent {
            id: self.id,
            summary: self.summary.unwrap_or_default(),
            start,
            location: self.location,
        })
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn list_events(&self, window: &EventWindow) -> Result<Vec<CalendarEvent>, ToolError> {
        let mut query = vec![
            ("timeMin", window.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("timeMax", window.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(tz) = &window.time_zone {
            query.push(("timeZone", tz.clone()));
        }

        let response = self
            .http_client
            .get(format!("{}/calendars/{}/events", self.base_url, self.calendar_id))
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                service: "Google Calendar",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EventsResponse = response.json().await?;
        let mut events = Vec::with_capacity(parsed.items.len());
        for item in parsed.items {
            let id = item.id.clone();
            match item.into_event() {
                Some(event) => events.push(event),
                None => tracing::warn!(event_id = %id, "Skipping calendar event without a usable start time"),
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timed_events_are_shown_in_requested_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let event = CalendarEvent {
            id: "e1".into(),
            summary: "Standup".into(),
            start: EventStart::At(utc.with_ymd_and_hms(2025, 1, 15, 0, 30, 0).unwrap()),
            location: None,
        };
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(event.format_line(jst), "Standup (2025-01-15 09:30)");
    }

    #[test]
    fn all_day_events_use_their_date() {
        let event = CalendarEvent {
            id: "e2".into(),
            summary: "Holiday".into(),
            start: EventStart::AllDay(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            location: None,
        };
        assert_eq!(event.format_line(FixedOffset::east_opt(0).unwrap()), "Holiday (2025-01-01 00:00)");
    }

    #[test]
    fn wire_items_map_to_events() {
        let parsed: EventsResponse = serde_json::from_value(serde_json::json!({
            "items": [
                { "id": "a", "summary": "Call", "start": { "dateTime": "2025-01-15T10:00:00+09:00" } },
                { "id": "b", "summary": "Trip", "start": { "date": "2025-01-20" } },
                { "id": "c", "summary": "Broken" }
            ]
        }))
        .unwrap();

        let events: Vec<CalendarEvent> = parsed.items.into_iter().filter_map(EventItem::into_event).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1].start, EventStart::AllDay(_)));
    }
}
