use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::{
    booking_error_to_response, effect_error_to_response, marketplace_error_to_response,
    require_role, session_gone,
};
use crate::booking;
use crate::effects::EffectKind;
use crate::integrations::calendar;
use crate::model::{BookingStatus, Day, Teacher, UserRole, WeeklyAvailability};
use crate::session::{SessionKey, ToastKind};
use crate::types::AppState;
use crate::verification::{self, VerificationSubmission};

#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
    /// Replaces the editor draft when present
    #[serde(default)]
    pub availability: Option<WeeklyAvailability>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub day: Day,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentsBody {
    /// File names or references of the uploaded documents
    #[serde(default)]
    pub documents: Vec<String>,
}

/// The signed-in teacher's catalogue record.
fn current_teacher(s: &AppState, key: &SessionKey) -> Result<Teacher, Response> {
    let user = require_role(s, key, UserRole::Teacher)?;
    let teacher_id = user.teacher_id().unwrap_or_default();
    s.marketplace
        .teacher(teacher_id)
        .map_err(marketplace_error_to_response)
}

fn notify(s: &AppState, key: &SessionKey, message: String, kind: ToastKind) {
    s.sessions
        .with(key, |st| st.notify(message, kind, Instant::now()));
}

/// POST /teacher/availability/toggle
pub async fn post_toggle_slot(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<ToggleBody>,
) -> Result<Response, Response> {
    let teacher = current_teacher(&s, &key)?;

    let (offered, draft) = s
        .sessions
        .with(&key, |st| {
            let draft = st.availability_draft(|| teacher.availability.clone());
            booking::toggle_slot(draft, body.day, &body.time).map(|offered| (offered, draft.clone()))
        })
        .ok_or_else(session_gone)?
        .map_err(booking_error_to_response)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "day": body.day,
            "time": body.time,
            "offered": offered,
            "availability": draft,
        })),
    )
        .into_response())
}

/// POST /teacher/availability/clear
pub async fn post_clear_availability(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let teacher = current_teacher(&s, &key)?;

    let draft = s
        .sessions
        .with(&key, |st| {
            let draft = st.availability_draft(|| teacher.availability.clone());
            booking::clear_all(draft);
            draft.clone()
        })
        .ok_or_else(session_gone)?;

    Ok((StatusCode::OK, Json(json!({ "availability": draft }))).into_response())
}

/// PUT /teacher/availability
///
/// Saves the body's availability, or the editor draft when the body has none.
pub async fn put_availability(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<AvailabilityBody>,
) -> Result<Response, Response> {
    let teacher = current_teacher(&s, &key)?;
    let availability = match body.availability {
        Some(availability) => availability,
        None => s
            .sessions
            .with(&key, |st| st.availability_draft(|| teacher.availability.clone()).clone())
            .ok_or_else(session_gone)?,
    };

    s.effects
        .run(
            key.as_str(),
            EffectKind::AvailabilitySave,
            s.delay(EffectKind::AvailabilitySave),
            async {},
        )
        .await
        .map_err(effect_error_to_response)?;

    let updated = s
        .marketplace
        .set_availability(teacher.id(), availability)
        .map_err(|e| {
            warn!(teacher_id = %teacher.id(), error = %e, "Availability rejected");
            marketplace_error_to_response(e)
        })?;

    s.sessions
        .with(&key, |st| {
            st.take_availability_draft();
            st.notify("Availability saved.", ToastKind::Success, Instant::now());
        })
        .ok_or_else(session_gone)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "availability": updated.availability })),
    )
        .into_response())
}

/// POST /teacher/calendar_sync
pub async fn post_calendar_sync(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let teacher = current_teacher(&s, &key)?;
    let upcoming: Vec<_> = s
        .marketplace
        .bookings()
        .iter()
        .filter(|b| b.teacher_id == teacher.id() && b.status == BookingStatus::Upcoming)
        .cloned()
        .collect();

    info!(teacher_id = %teacher.id(), bookings = upcoming.len(), "Syncing schedule to calendar");
    let report = s
        .effects
        .run(
            key.as_str(),
            EffectKind::CalendarSync,
            s.delay(EffectKind::CalendarSync),
            async move { calendar::sync_report(&upcoming, &teacher.availability) },
        )
        .await
        .map_err(effect_error_to_response)?;

    notify(
        &s,
        &key,
        format!(
            "Calendar synced: {} classes and {} availability slots pushed.",
            report.bookings, report.available_slots
        ),
        ToastKind::Success,
    );
    Ok((StatusCode::OK, Json(report)).into_response())
}

/// POST /teacher/verification
///
/// Moves the teacher to `PENDING`, runs the simulated registry lookup, and
/// applies its outcome.
pub async fn post_verification(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<VerificationSubmission>,
) -> Result<Response, Response> {
    let teacher = current_teacher(&s, &key)?;
    let teacher_id = teacher.id().to_string();

    s.marketplace
        .begin_verification(&teacher_id, &body)
        .map_err(marketplace_error_to_response)?;
    info!(teacher_id = %teacher_id, "Verification submitted");

    let outcome = s
        .effects
        .run(
            key.as_str(),
            EffectKind::Verification,
            s.delay(EffectKind::Verification),
            async move { verification::lookup(&body) },
        )
        .await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(teacher_id = %teacher_id, error = %e, "Registry lookup did not complete");
            if let Err(rollback) = s
                .marketplace
                .withdraw_verification(&teacher_id, &teacher.verification)
            {
                warn!(teacher_id = %teacher_id, error = %rollback, "Could not withdraw verification");
            }
            return Err(effect_error_to_response(e));
        }
    };

    let state = s
        .marketplace
        .complete_verification(&teacher_id, &outcome)
        .map_err(marketplace_error_to_response)?;

    let kind = if outcome.success {
        ToastKind::Success
    } else {
        ToastKind::Error
    };
    notify(&s, &key, outcome.message.clone(), kind);

    Ok((
        StatusCode::OK,
        Json(json!({ "outcome": outcome, "verification": state })),
    )
        .into_response())
}

/// POST /teacher/verification/documents
pub async fn post_documents(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<DocumentsBody>,
) -> Result<Response, Response> {
    let teacher = current_teacher(&s, &key)?;
    info!(
        teacher_id = %teacher.id(),
        documents = body.documents.len(),
        "Uploading verification documents"
    );

    s.effects
        .run(
            key.as_str(),
            EffectKind::DocumentUpload,
            s.delay(EffectKind::DocumentUpload),
            async {},
        )
        .await
        .map_err(effect_error_to_response)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "documents": body.documents.len() })),
    )
        .into_response())
}
