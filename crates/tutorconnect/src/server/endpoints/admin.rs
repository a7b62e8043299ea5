use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{marketplace_error_to_response, require_role};
use crate::model::{UserRole, VerificationStatus};
use crate::server::types::ApiErrorType;
use crate::session::SessionKey;
use crate::types::AppState;

/// Lists every teacher regardless of status.
const ALL_STATUSES: &str = "ALL";

#[derive(Debug, Deserialize)]
pub struct TeachersQuery {
    /// A verification status or `ALL`; defaults to `PENDING`
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OverrideBody {
    pub status: VerificationStatus,
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<VerificationStatus>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Some(VerificationStatus::Pending)),
        Some(s) if s.eq_ignore_ascii_case(ALL_STATUSES) => Ok(None),
        Some(s) => serde_json::from_value(serde_json::Value::String(s.to_ascii_uppercase()))
            .map(Some)
            .map_err(|_| format!("Unknown verification status: {}", s)),
    }
}

/// GET /admin/teachers?status=PENDING|VERIFIED|REJECTED|NOT_STARTED|ALL
pub async fn get_teachers(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Query(query): Query<TeachersQuery>,
) -> Result<Response, Response> {
    require_role(&s, &key, UserRole::Admin)?;

    let status = parse_status_filter(query.status.as_deref()).map_err(|e| {
        ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid status filter", Some(e))).into_response()
    })?;
    info!(?status, "GET /admin/teachers");

    Ok((StatusCode::OK, Json(s.marketplace.teachers_by_status(status))).into_response())
}

/// POST /admin/teachers/:id/verification
///
/// Sets `VERIFIED` or `REJECTED` directly, bypassing the registry lookup.
pub async fn post_override(
    Path(teacher_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<OverrideBody>,
) -> Result<Response, Response> {
    let admin = require_role(&s, &key, UserRole::Admin)?;

    let record = s
        .marketplace
        .override_verification(&admin, &teacher_id, body.status)
        .map_err(marketplace_error_to_response)?;

    Ok((StatusCode::OK, Json(record)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        assert_eq!(parse_status_filter(None), Ok(Some(VerificationStatus::Pending)));
        assert_eq!(parse_status_filter(Some("all")), Ok(None));
        assert_eq!(
            parse_status_filter(Some("verified")),
            Ok(Some(VerificationStatus::Verified))
        );
        assert_eq!(
            parse_status_filter(Some("NOT_STARTED")),
            Ok(Some(VerificationStatus::NotStarted))
        );
        assert!(parse_status_filter(Some("maybe")).is_err());
    }
}
