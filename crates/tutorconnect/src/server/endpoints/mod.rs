//! Request handlers, one module per area of the app.
//!
//! Handlers return `Result<Response, Response>`; the error side is always an
//! [`ApiErrorType`] built by one of the `*_to_response` helpers below.

pub mod admin;
pub mod ai;
pub mod auth;
pub mod booking;
pub mod classroom;
pub mod dashboard;
pub mod session;
pub mod status;
pub mod teacher;
pub mod tutors;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Instant;

use crate::auth::AuthError;
use crate::booking::BookingError;
use crate::effects::EffectError;
use crate::marketplace::MarketplaceError;
use crate::model::{User, UserRole};
use crate::reviews::ReviewError;
use crate::server::types::ApiErrorType;
use crate::session::{SessionError, SessionKey, SessionSnapshot};
use crate::types::AppState;
use crate::verification::VerificationError;

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    ApiErrorType::from((status, error.to_string(), None)).into_response()
}

/// The session was removed after the middleware accepted the request.
pub(crate) fn session_gone() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "Unknown or expired session")
}

pub(crate) fn session_error_to_response(err: SessionError) -> Response {
    let status = match err {
        SessionError::AuthRequired => StatusCode::UNAUTHORIZED,
        SessionError::WrongRole(_) => StatusCode::FORBIDDEN,
        SessionError::AlreadySignedIn => StatusCode::CONFLICT,
    };
    error_response(status, err)
}

pub(crate) fn booking_error_to_response(err: BookingError) -> Response {
    let status = match err {
        BookingError::NotAStudent => StatusCode::FORBIDDEN,
        BookingError::NotOpen => StatusCode::NOT_FOUND,
        BookingError::SlotUnavailable { .. } | BookingError::WrongStep { .. } => {
            StatusCode::CONFLICT
        }
        BookingError::DateNotSelected
        | BookingError::UnknownSlot(_)
        | BookingError::SelectionIncomplete
        | BookingError::PaymentMethodMissing => StatusCode::BAD_REQUEST,
    };
    error_response(status, err)
}

fn review_error_to_response(err: ReviewError) -> Response {
    let status = match err {
        ReviewError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ReviewError::InvalidRating(_) | ReviewError::EmptyComment => StatusCode::BAD_REQUEST,
    };
    error_response(status, err)
}

fn verification_error_to_response(err: VerificationError) -> Response {
    let status = match err {
        VerificationError::MissingField(_) | VerificationError::InvalidOverrideTarget(_) => {
            StatusCode::BAD_REQUEST
        }
        VerificationError::AlreadyVerified
        | VerificationError::AlreadyPending
        | VerificationError::NotPending => StatusCode::CONFLICT,
    };
    error_response(status, err)
}

pub(crate) fn marketplace_error_to_response(err: MarketplaceError) -> Response {
    match err {
        MarketplaceError::TeacherNotFound(_) | MarketplaceError::BookingNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, err)
        }
        MarketplaceError::Forbidden(_) => error_response(StatusCode::FORBIDDEN, err),
        MarketplaceError::Booking(e) => booking_error_to_response(e),
        MarketplaceError::Review(e) => review_error_to_response(e),
        MarketplaceError::Verification(e) => verification_error_to_response(e),
    }
}

pub(crate) fn auth_error_to_response(err: AuthError) -> Response {
    let status = match err {
        AuthError::InvalidPassword | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
        AuthError::MissingFields => StatusCode::BAD_REQUEST,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::RoleNotAllowed(_) => StatusCode::FORBIDDEN,
        AuthError::Registration(e) => return marketplace_error_to_response(e),
    };
    error_response(status, err)
}

pub(crate) fn effect_error_to_response(err: EffectError) -> Response {
    let status = match err {
        EffectError::OperationInProgress(_) => StatusCode::CONFLICT,
        EffectError::Aborted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err)
}

/// Signed-in user of the session.
pub(crate) fn require_user(s: &AppState, key: &SessionKey) -> Result<User, Response> {
    s.sessions
        .with(key, |st| st.require_user().cloned())
        .ok_or_else(session_gone)?
        .map_err(session_error_to_response)
}

/// Signed-in user of the session, who must have `role`.
pub(crate) fn require_role(s: &AppState, key: &SessionKey, role: UserRole) -> Result<User, Response> {
    s.sessions
        .with(key, |st| st.require_role(role).cloned())
        .ok_or_else(session_gone)?
        .map_err(session_error_to_response)
}

pub(crate) fn snapshot(s: &AppState, key: &SessionKey) -> Result<SessionSnapshot, Response> {
    s.sessions
        .with(key, |st| st.snapshot(Instant::now()))
        .ok_or_else(session_gone)
}
