use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::{
    effect_error_to_response, marketplace_error_to_response, session_error_to_response,
    session_gone, snapshot,
};
use crate::effects::EffectKind;
use crate::marketplace::TutorQuery;
use crate::reviews::{self, ReviewError};
use crate::seed;
use crate::session::{AuthPrompt, SessionKey, ToastKind};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    /// `YYYY-MM-DD`; without a date no slots are offered
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub rating: u8,
    pub comment: String,
}

/// GET /catalog/subjects
pub async fn get_subjects() -> Response {
    (StatusCode::OK, Json(seed::SUBJECTS)).into_response()
}

/// GET /catalog/grades
pub async fn get_grades() -> Response {
    (StatusCode::OK, Json(seed::GRADES)).into_response()
}

/// GET /tutors
///
/// Query parameters (all optional):
/// - `search`: case-insensitive substring of name or bio
/// - `subject`, `grade`: exact match, `All` disables the filter
pub async fn get_tutors(
    State(s): State<Arc<AppState>>,
    Query(query): Query<TutorQuery>,
) -> Response {
    info!(?query, "GET /tutors");
    (StatusCode::OK, Json(s.marketplace.search(&query))).into_response()
}

/// GET /tutors/:id
pub async fn get_tutor(
    Path(teacher_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Result<Response, Response> {
    let teacher = s
        .marketplace
        .teacher(&teacher_id)
        .map_err(marketplace_error_to_response)?;
    Ok((StatusCode::OK, Json(teacher)).into_response())
}

/// GET /tutors/:id/slots?date=YYYY-MM-DD
pub async fn get_slots(
    Path(teacher_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Response, Response> {
    let slots = s
        .marketplace
        .slots(&teacher_id, query.date)
        .map_err(marketplace_error_to_response)?;
    Ok((
        StatusCode::OK,
        Json(json!({ "date": query.date, "bands": slots })),
    )
        .into_response())
}

/// POST /tutors/:id/reviews
pub async fn post_review(
    Path(teacher_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<ReviewBody>,
) -> Result<Response, Response> {
    info!(teacher_id = %teacher_id, rating = body.rating, "POST /tutors/:id/reviews");
    let user = s
        .sessions
        .with(&key, |st| st.user().cloned())
        .ok_or_else(session_gone)?;

    // Reject bad input before paying the simulated delay
    if let Err(e) = reviews::validate_submission(user.as_ref(), body.rating, &body.comment) {
        if e == ReviewError::NotAuthenticated {
            s.sessions.with(&key, |st| st.open_auth(AuthPrompt::Login));
        }
        return Err(marketplace_error_to_response(e.into()));
    }
    s.marketplace
        .teacher(&teacher_id)
        .map_err(marketplace_error_to_response)?;

    s.effects
        .run(
            key.as_str(),
            EffectKind::ReviewPost,
            s.delay(EffectKind::ReviewPost),
            async {},
        )
        .await
        .map_err(effect_error_to_response)?;

    let teacher = s
        .marketplace
        .add_review(
            user.as_ref(),
            &teacher_id,
            body.rating,
            &body.comment,
            s.today(),
        )
        .map_err(|e| {
            warn!(error = %e, "Review rejected");
            marketplace_error_to_response(e)
        })?;

    s.sessions
        .with(&key, |st| {
            st.notify(
                "Thank you! Your review has been posted.",
                ToastKind::Success,
                Instant::now(),
            )
        })
        .ok_or_else(session_gone)?;

    Ok((StatusCode::CREATED, Json(teacher)).into_response())
}

/// POST /tutors/:id/book
///
/// Opens the booking wizard. Without a signed-in user the session is moved to
/// the login prompt and the booking resumes after sign-in.
pub async fn post_book(
    Path(teacher_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    info!(teacher_id = %teacher_id, "POST /tutors/:id/book");
    s.marketplace
        .teacher(&teacher_id)
        .map_err(marketplace_error_to_response)?;

    s.sessions
        .with(&key, |st| st.request_booking(&teacher_id).map(|_| ()))
        .ok_or_else(session_gone)?
        .map_err(session_error_to_response)?;

    Ok((StatusCode::OK, Json(snapshot(&s, &key)?)).into_response())
}
