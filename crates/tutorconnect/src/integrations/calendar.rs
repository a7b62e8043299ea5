//! Google Calendar export. Sync is simulated; only the template link is real.

use chrono::{Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

use crate::config::CalendarConfig;
use crate::model::{Booking, WeeklyAvailability};

const CALENDAR_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const LOCATION: &str = "Online / TutorConnect Classroom";
const DEFAULT_ROOM: &str = "TutorConnect Classroom";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid lesson time: {0}")]
    InvalidTime(String),

    #[error("Invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),
}

/// Builds an "add to Google Calendar" link for a booking.
///
/// The lesson time is read in the configured local offset and exported in UTC.
pub fn google_calendar_link(
    booking: &Booking,
    config: &CalendarConfig,
) -> Result<String, CalendarError> {
    let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60)
        .ok_or(CalendarError::InvalidOffset(config.utc_offset_minutes))?;
    let time = NaiveTime::parse_from_str(&booking.time, "%H:%M")
        .map_err(|_| CalendarError::InvalidTime(booking.time.clone()))?;

    let start = offset
        .from_local_datetime(&booking.date.and_time(time))
        .single()
        .ok_or_else(|| CalendarError::InvalidTime(booking.time.clone()))?
        .with_timezone(&Utc);
    let end = start + Duration::hours(i64::from(booking.duration));

    let dates = format!(
        "{}/{}",
        start.format(CALENDAR_DATE_FORMAT),
        end.format(CALENDAR_DATE_FORMAT)
    );
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(
            "text",
            &format!(
                "TutorConnect: {} with {}",
                booking.subject, booking.student_name
            ),
        )
        .append_pair("dates", &dates)
        .append_pair(
            "details",
            &format!(
                "Online lesson via TutorConnect SA. Join here: {}",
                booking.meet_link.as_deref().unwrap_or(DEFAULT_ROOM)
            ),
        )
        .append_pair("location", LOCATION)
        .append_pair("add", &booking.student_name)
        .finish();

    Ok(format!("{}?action=TEMPLATE&{}", config.base_url, query))
}

/// What a calendar sync pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub bookings: usize,
    pub available_slots: usize,
}

/// Summary of a schedule sync. Nothing leaves the process.
pub fn sync_report(bookings: &[Booking], availability: &WeeklyAvailability) -> SyncReport {
    SyncReport {
        success: true,
        bookings: bookings.len(),
        available_slots: availability.values().map(Vec::len).sum(),
    }
}
