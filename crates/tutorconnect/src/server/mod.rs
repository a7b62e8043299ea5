use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{
    admin, ai, auth, booking, classroom, dashboard, session, status, teacher, tutors,
};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;

pub use types::ApiErrorType;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Router whose endpoints require a session token
    let session_router = Router::new()
        .route(
            "/session",
            get(session::get_session).delete(session::delete_session),
        )
        .route("/session/view", post(session::post_view))
        .route("/session/toast", axum::routing::delete(session::delete_toast))
        .route("/auth/login", post(auth::post_login))
        .route("/auth/signup", post(auth::post_signup))
        .route("/auth/logout", post(auth::post_logout))
        .route(
            "/auth/prompt",
            post(auth::post_prompt).delete(auth::delete_prompt),
        )
        .route("/tutors/:id/reviews", post(tutors::post_review))
        .route("/tutors/:id/book", post(tutors::post_book))
        .route(
            "/session/booking",
            get(booking::get_booking).delete(booking::delete_booking),
        )
        .route("/session/booking/date", post(booking::post_date))
        .route("/session/booking/time", post(booking::post_time))
        .route("/session/booking/checkout", post(booking::post_checkout))
        .route("/session/booking/pay", post(booking::post_pay))
        .route("/session/booking/confirm", post(booking::post_confirm))
        .route(
            "/bookings/:id/calendar_link",
            get(classroom::get_calendar_link),
        )
        .route("/classroom/:booking_id/join", post(classroom::post_join))
        .route("/classroom/leave", post(classroom::post_leave))
        .route("/dashboard/student", get(dashboard::get_student_dashboard))
        .route("/dashboard/teacher", get(dashboard::get_teacher_dashboard))
        .route(
            "/teacher/availability",
            axum::routing::put(teacher::put_availability),
        )
        .route(
            "/teacher/availability/toggle",
            post(teacher::post_toggle_slot),
        )
        .route(
            "/teacher/availability/clear",
            post(teacher::post_clear_availability),
        )
        .route("/teacher/calendar_sync", post(teacher::post_calendar_sync))
        .route("/teacher/verification", post(teacher::post_verification))
        .route(
            "/teacher/verification/documents",
            post(teacher::post_documents),
        )
        .route("/admin/teachers", get(admin::get_teachers))
        .route(
            "/admin/teachers/:id/verification",
            post(admin::post_override),
        )
        .route("/ai/lesson_plan", post(ai::post_lesson_plan))
        .route("/ai/chat", post(ai::post_chat))
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            session_validator::require_session,
        ));

    // Public catalogue
    let public_router = Router::new()
        .route("/health", get(status::get_health))
        .route("/session", post(session::post_session))
        .route("/catalog/subjects", get(tutors::get_subjects))
        .route("/catalog/grades", get(tutors::get_grades))
        .route("/tutors", get(tutors::get_tutors))
        .route("/tutors/:id", get(tutors::get_tutor))
        .route("/tutors/:id/slots", get(tutors::get_slots));

    Router::new()
        .merge(public_router)
        .merge(session_router)
        .with_state(app_state)
}
