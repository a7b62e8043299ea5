use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::{marketplace_error_to_response, require_role};
use crate::integrations::calendar;
use crate::model::{Booking, UserRole, VerificationState, WeeklyAvailability};
use crate::session::SessionKey;
use crate::types::AppState;

/// An upcoming lesson with its "add to calendar" link.
#[derive(Debug, Serialize)]
struct UpcomingLesson {
    #[serde(flatten)]
    booking: Booking,
    calendar_link: Option<String>,
}

#[derive(Debug, Serialize)]
struct TeacherDashboardBody {
    upcoming: Vec<UpcomingLesson>,
    recent_completed: Vec<Booking>,
    balance: u32,
    pending_balance: u32,
    availability: WeeklyAvailability,
    verification: VerificationState,
}

/// GET /dashboard/student
pub async fn get_student_dashboard(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let user = require_role(&s, &key, UserRole::Student)?;
    info!(user_id = %user.id(), "GET /dashboard/student");

    let dashboard = s
        .marketplace
        .student_dashboard(&user)
        .map_err(marketplace_error_to_response)?;
    Ok((StatusCode::OK, Json(dashboard)).into_response())
}

/// GET /dashboard/teacher
pub async fn get_teacher_dashboard(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let user = require_role(&s, &key, UserRole::Teacher)?;
    info!(user_id = %user.id(), "GET /dashboard/teacher");

    let dashboard = s
        .marketplace
        .teacher_dashboard(&user)
        .map_err(marketplace_error_to_response)?;

    let upcoming = dashboard
        .upcoming
        .into_iter()
        .map(|booking| {
            let calendar_link = calendar::google_calendar_link(&booking, &s.config.calendar)
                .map_err(|e| warn!(booking_id = %booking.id, error = %e, "No calendar link"))
                .ok();
            UpcomingLesson {
                booking,
                calendar_link,
            }
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(TeacherDashboardBody {
            upcoming,
            recent_completed: dashboard.recent_completed,
            balance: dashboard.balance,
            pending_balance: dashboard.pending_balance,
            availability: dashboard.availability,
            verification: dashboard.verification,
        }),
    )
        .into_response())
}
