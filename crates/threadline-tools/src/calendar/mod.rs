mod client;
mod range;
mod tool;

pub use client::{CalendarEvent, CalendarSource, EventStart, GoogleCalendarClient, GOOGLE_CALENDAR_API_BASE};
pub use range::{resolve_offset, EventWindow, TimeRange};
pub use tool::GetCalendarTool;
