//! The booking modal: pick a slot, check out, pay, confirm.
//!
//! Payment is simulated. `/pay` waits out a fixed delay and always succeeds;
//! for PayFast it also returns the redirect form a real client would post,
//! which this service never submits.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::{
    booking_error_to_response, effect_error_to_response, marketplace_error_to_response,
    require_role, session_gone, snapshot,
};
use crate::booking::{self, BookingError, BookingWizard, FeeBreakdown};
use crate::effects::EffectKind;
use crate::integrations::payfast;
use crate::marketplace::{generate_id, MarketplaceError};
use crate::model::{PaymentMethod, Teacher, UserRole};
use crate::session::SessionKey;
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct DateBody {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct TimeBody {
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct PayBody {
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

/// Runs `f` on the session's open wizard.
fn with_wizard<R>(
    s: &AppState,
    key: &SessionKey,
    f: impl FnOnce(&mut BookingWizard) -> Result<R, BookingError>,
) -> Result<R, Response> {
    s.sessions
        .with(key, |st| st.booking_mut().and_then(f))
        .ok_or_else(session_gone)?
        .map_err(booking_error_to_response)
}

fn wizard_teacher(s: &AppState, key: &SessionKey) -> Result<Teacher, Response> {
    let teacher_id = with_wizard(s, key, |w| Ok(w.teacher_id().to_string()))?;
    s.marketplace
        .teacher(&teacher_id)
        .map_err(marketplace_error_to_response)
}

/// Wizard state plus what the modal renders next to it.
fn wizard_response(s: &AppState, key: &SessionKey, teacher: &Teacher) -> Result<Response, Response> {
    let wizard = with_wizard(s, key, |w| Ok(w.clone()))?;
    let slots = booking::available_slots(&teacher.availability, wizard.selection().date());

    Ok((
        StatusCode::OK,
        Json(json!({
            "booking": wizard,
            "slots": slots,
            "fees": FeeBreakdown::for_lesson(teacher.hourly_rate),
        })),
    )
        .into_response())
}

/// GET /session/booking
pub async fn get_booking(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let teacher = wizard_teacher(&s, &key)?;
    wizard_response(&s, &key, &teacher)
}

/// POST /session/booking/date
pub async fn post_date(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<DateBody>,
) -> Result<Response, Response> {
    let teacher = wizard_teacher(&s, &key)?;
    with_wizard(&s, &key, |w| w.select_date(body.date))?;
    wizard_response(&s, &key, &teacher)
}

/// POST /session/booking/time
pub async fn post_time(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<TimeBody>,
) -> Result<Response, Response> {
    let teacher = wizard_teacher(&s, &key)?;
    with_wizard(&s, &key, |w| w.select_time(&teacher.availability, &body.time))?;
    wizard_response(&s, &key, &teacher)
}

/// POST /session/booking/checkout
pub async fn post_checkout(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let teacher = wizard_teacher(&s, &key)?;
    with_wizard(&s, &key, BookingWizard::proceed_to_checkout)?;
    wizard_response(&s, &key, &teacher)
}

/// POST /session/booking/pay
pub async fn post_pay(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
    Json(body): Json<PayBody>,
) -> Result<Response, Response> {
    let user = require_role(&s, &key, UserRole::Student)?;
    let teacher = wizard_teacher(&s, &key)?;
    let method = with_wizard(&s, &key, |w| {
        if let Some(method) = body.method {
            w.select_payment_method(method)?;
        }
        w.begin_payment()
    })?;

    info!(
        session = %key,
        teacher_id = %teacher.id(),
        method = method.as_str(),
        "Processing simulated payment"
    );
    let paid = s
        .effects
        .run(
            key.as_str(),
            EffectKind::Payment,
            s.delay(EffectKind::Payment),
            async {},
        )
        .await;
    if let Err(e) = paid {
        error!(error = %e, "Simulated payment did not complete");
        s.sessions.with(&key, |st| {
            if let Ok(wizard) = st.booking_mut() {
                wizard.payment_aborted();
            }
        });
        return Err(effect_error_to_response(e));
    }
    with_wizard(&s, &key, BookingWizard::payment_succeeded)?;

    let fees = FeeBreakdown::for_lesson(teacher.hourly_rate);
    let redirect = (method == PaymentMethod::Payfast).then(|| {
        payfast::build_redirect(
            &s.config.payfast,
            &user,
            &generate_id("pay"),
            teacher.name(),
            &fees,
        )
    });
    let wizard = with_wizard(&s, &key, |w| Ok(w.clone()))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "booking": wizard,
            "fees": fees,
            "payfast": redirect,
        })),
    )
        .into_response())
}

/// POST /session/booking/confirm
pub async fn post_confirm(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    let user = require_role(&s, &key, UserRole::Student)?;
    let request = with_wizard(&s, &key, |w| w.confirmation())?;

    let booking = match s.marketplace.confirm_booking(&user, &request) {
        Ok(booking) => booking,
        Err(e @ MarketplaceError::Booking(BookingError::SlotUnavailable { .. })) => {
            warn!(session = %key, error = %e, "Slot withdrawn before confirmation");
            s.sessions.with(&key, |st| {
                if let Ok(wizard) = st.booking_mut() {
                    wizard.slot_withdrawn();
                }
            });
            return Err(marketplace_error_to_response(e));
        }
        Err(e) => return Err(marketplace_error_to_response(e)),
    };

    let session = s
        .sessions
        .with(&key, |st| {
            st.booking_confirmed(&booking, Instant::now());
            st.snapshot(Instant::now())
        })
        .ok_or_else(session_gone)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "booking": booking, "session": session })),
    )
        .into_response())
}

/// DELETE /session/booking
pub async fn delete_booking(
    State(s): State<Arc<AppState>>,
    Extension(key): Extension<SessionKey>,
) -> Result<Response, Response> {
    s.sessions
        .with(&key, |st| st.close_booking())
        .ok_or_else(session_gone)?;
    Ok((StatusCode::OK, Json(snapshot(&s, &key)?)).into_response())
}
