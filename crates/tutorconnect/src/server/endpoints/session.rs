use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::{marketplace_error_to_response, session_gone, snapshot};
use crate::session::{SessionKey, View};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct NavigateBody {
    pub view: View,
    /// Required when navigating to a teacher profile
    #[serde(default)]
    pub teacher_id: Option<String>,
}

/// POST /session
///
/// Creates an anonymous session. The returned token goes in
/// `Authorization: Bearer <token>` on every session-scoped request.
pub async fn post_session(State(s): State<Arc<AppState>>) -> Result<Response, Response> {
    let (token, key) = s.sessions.create();
    info!(session = %key, "Session created");

    let session = snapshot(&s, &key)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "session": session })),
    )
        .into_response())
}

/// GET /session
pub async fn get_session(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    Ok((StatusCode::OK, Json(snapshot(&s, &key)?)).into_response())
}

/// DELETE /session
pub async fn delete_session(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Response {
    s.sessions.remove(&key);
    s.effects.forget_owner(key.as_str());
    info!(session = %key, "Session ended");
    StatusCode::NO_CONTENT.into_response()
}

/// POST /session/view
pub async fn post_view(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<NavigateBody>,
) -> Result<Response, Response> {
    match (body.view, body.teacher_id) {
        (View::TeacherProfile, Some(teacher_id)) => {
            let teacher = s
                .marketplace
                .teacher(&teacher_id)
                .map_err(marketplace_error_to_response)?;
            s.sessions
                .with(&key, |st| st.view_profile(teacher.id()))
                .ok_or_else(session_gone)?;
        }
        (view, _) => {
            s.sessions
                .with(&key, |st| st.navigate(view))
                .ok_or_else(session_gone)?;
        }
    }

    Ok((StatusCode::OK, Json(snapshot(&s, &key)?)).into_response())
}

/// DELETE /session/toast
pub async fn delete_toast(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let session = s
        .sessions
        .with(&key, |st| {
            st.dismiss_toast();
            st.snapshot(Instant::now())
        })
        .ok_or_else(session_gone)?;
    Ok((StatusCode::OK, Json(session)).into_response())
}
