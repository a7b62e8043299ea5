use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use super::{marketplace_error_to_response, require_user, session_gone, snapshot};
use crate::integrations::calendar;
use crate::marketplace::MarketplaceError;
use crate::model::{Booking, User};
use crate::server::types::ApiErrorType;
use crate::session::SessionKey;
use crate::types::AppState;

/// Only the booking's student and teacher, or an admin, may see it.
fn participant_booking(s: &AppState, user: &User, booking_id: &str) -> Result<Booking, Response> {
    let booking = s
        .marketplace
        .booking(booking_id)
        .map_err(marketplace_error_to_response)?;

    let allowed = match user {
        User::Student { profile, .. } => booking.student_id == profile.id,
        User::Teacher { teacher_id, .. } => booking.teacher_id == *teacher_id,
        User::Admin { .. } => true,
    };
    if !allowed {
        return Err(marketplace_error_to_response(MarketplaceError::Forbidden(
            "You are not part of this booking",
        )));
    }
    Ok(booking)
}

/// GET /bookings/:id/calendar_link
pub async fn get_calendar_link(
    Path(booking_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let user = require_user(&s, &key)?;
    let booking = participant_booking(&s, &user, &booking_id)?;

    let link = calendar::google_calendar_link(&booking, &s.config.calendar).map_err(|e| {
        error!(booking_id = %booking_id, error = %e, "Failed to build calendar link");
        ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to build calendar link",
            Some(e.to_string()),
        ))
        .into_response()
    })?;

    Ok((StatusCode::OK, Json(json!({ "booking_id": booking_id, "link": link }))).into_response())
}

/// POST /classroom/:booking_id/join
pub async fn post_join(
    Path(booking_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let user = require_user(&s, &key)?;
    let booking = participant_booking(&s, &user, &booking_id)?;

    s.sessions
        .with(&key, |st| st.join_classroom(booking.id.clone()))
        .ok_or_else(session_gone)?;
    info!(booking_id = %booking.id, user_id = %user.id(), "Joined classroom");

    Ok((
        StatusCode::OK,
        Json(json!({ "booking": booking, "session": snapshot(&s, &key)? })),
    )
        .into_response())
}

/// POST /classroom/leave
pub async fn post_leave(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    s.sessions
        .with(&key, |st| st.leave_classroom())
        .ok_or_else(session_gone)?;
    Ok((StatusCode::OK, Json(snapshot(&s, &key)?)).into_response())
}
