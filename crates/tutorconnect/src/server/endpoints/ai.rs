use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{effect_error_to_response, require_user};
use crate::effects::EffectKind;
use crate::integrations::ChatTurn;
use crate::session::SessionKey;
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct LessonPlanBody {
    pub subject: String,
    pub grade: String,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
}

/// POST /ai/lesson_plan
pub async fn post_lesson_plan(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<LessonPlanBody>,
) -> Result<Response, Response> {
    let user = require_user(&s, &key)?;
    info!(user_id = %user.id(), subject = %body.subject, "POST /ai/lesson_plan");

    let state = s.clone();
    let text = s
        .effects
        .run(key.as_str(), EffectKind::AiRequest, Duration::ZERO, async move {
            state
                .ai
                .lesson_plan(&body.subject, &body.grade, &body.topic)
                .await
        })
        .await
        .map_err(effect_error_to_response)?;

    Ok((StatusCode::OK, Json(json!({ "text": text }))).into_response())
}

/// POST /ai/chat
pub async fn post_chat(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<ChatBody>,
) -> Result<Response, Response> {
    let user = require_user(&s, &key)?;
    info!(user_id = %user.id(), turns = body.history.len(), "POST /ai/chat");

    let state = s.clone();
    let text = s
        .effects
        .run(key.as_str(), EffectKind::AiRequest, Duration::ZERO, async move {
            state.ai.chat(&body.history, &body.message).await
        })
        .await
        .map_err(effect_error_to_response)?;

    Ok((StatusCode::OK, Json(json!({ "text": text }))).into_response())
}
