//! Mock sign-in. Every call waits out the simulated authentication delay first.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::{auth_error_to_response, effect_error_to_response, session_error_to_response, session_gone, snapshot};
use crate::auth::{LoginRequest, SignupRequest};
use crate::effects::EffectKind;
use crate::model::User;
use crate::session::{AuthPrompt, SessionError, SessionKey};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptBody {
    pub mode: AuthPrompt,
}

fn ensure_signed_out(s: &AppState, key: &SessionKey) -> Result<(), Response> {
    let signed_in = s
        .sessions
        .with(key, |st| st.user().is_some())
        .ok_or_else(session_gone)?;
    if signed_in {
        return Err(session_error_to_response(SessionError::AlreadySignedIn));
    }
    Ok(())
}

async fn simulate_auth(s: &AppState, key: &SessionKey) -> Result<(), Response> {
    s.effects
        .run(
            key.as_str(),
            EffectKind::Authentication,
            s.delay(EffectKind::Authentication),
            async {},
        )
        .await
        .map_err(effect_error_to_response)
}

fn signed_in(s: &AppState, key: &SessionKey, user: User) -> Result<Response, Response> {
    let session = s
        .sessions
        .with(key, |st| {
            st.sign_in(user);
            st.snapshot(Instant::now())
        })
        .ok_or_else(session_gone)?;
    Ok((StatusCode::OK, Json(session)).into_response())
}

/// POST /auth/login
pub async fn post_login(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, Response> {
    info!("POST /auth/login");
    ensure_signed_out(&s, &key)?;
    simulate_auth(&s, &key).await?;

    let user = s.accounts.login(&s.marketplace, &body).map_err(|e| {
        warn!(error = %e, "Login rejected");
        auth_error_to_response(e)
    })?;
    signed_in(&s, &key, user)
}

/// POST /auth/signup
pub async fn post_signup(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<SignupRequest>,
) -> Result<Response, Response> {
    info!(role = ?body.role, "POST /auth/signup");
    ensure_signed_out(&s, &key)?;
    simulate_auth(&s, &key).await?;

    let user = s.accounts.signup(&s.marketplace, &body).map_err(|e| {
        warn!(error = %e, "Signup rejected");
        auth_error_to_response(e)
    })?;
    signed_in(&s, &key, user)
}

/// POST /auth/logout
pub async fn post_logout(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let session = s
        .sessions
        .with(&key, |st| {
            st.sign_out(Instant::now());
            st.snapshot(Instant::now())
        })
        .ok_or_else(session_gone)?;
    info!(session = %key, "Signed out");
    Ok((StatusCode::OK, Json(session)).into_response())
}

/// POST /auth/prompt
pub async fn post_prompt(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<PromptBody>,
) -> Result<Response, Response> {
    s.sessions
        .with(&key, |st| st.open_auth(body.mode))
        .ok_or_else(session_gone)?;
    Ok((StatusCode::OK, Json(snapshot(&s, &key)?)).into_response())
}

/// DELETE /auth/prompt
pub async fn delete_prompt(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    s.sessions
        .with(&key, |st| st.close_auth())
        .ok_or_else(session_gone)?;
    Ok((StatusCode::OK, Json(snapshot(&s, &key)?)).into_response())
}
