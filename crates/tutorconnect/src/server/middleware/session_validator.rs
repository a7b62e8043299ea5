use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{warn, Instrument};

use crate::server::types::ApiErrorType;
use crate::session::SessionKey;
use crate::types::AppState;

/// Resolves `Authorization: Bearer <token>` to a live session and stores its
/// [`SessionKey`] as a request extension.
pub async fn require_session(
    State(s): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return ApiErrorType::from((
            StatusCode::UNAUTHORIZED,
            "Missing bearer token. Create a session with POST /session first.",
            None,
        ))
        .into_response();
    };

    let key = SessionKey::from_token(token);
    if !s.sessions.contains(&key) {
        warn!(session = %key, "Request with unknown session token");
        return ApiErrorType::from((StatusCode::UNAUTHORIZED, "Unknown or expired session", None))
            .into_response();
    }

    let span = tracing::info_span!(
        "session",
        session = %key,
        method = %req.method(),
        path = %req.uri().path(),
    );
    req.extensions_mut().insert(key);
    next.run(req).instrument(span).await
}
