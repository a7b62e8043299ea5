use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Duration, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;

use tutorconnect::config::AppConfig;
use tutorconnect::integrations::ai::CHAT_UNAVAILABLE;
use tutorconnect::model::{Day, WeeklyAvailability};
use tutorconnect::server::create_router;
use tutorconnect::types::AppState;

fn app_with(config: AppConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config).unwrap());
    (create_router(state.clone()), state)
}

fn app() -> (Router, Arc<AppState>) {
    app_with(AppConfig::for_tests())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/session", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn login(app: &Router, token: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        Some(token),
        Some(json!({ "email": email, "password": "password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body
}

async fn signup_teacher(app: &Router, token: &str, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/signup",
        Some(token),
        Some(json!({ "name": name, "email": email, "password": "secret", "role": "TEACHER" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
    body["user"]["id"].as_str().unwrap().to_string()
}

/// First Monday on or after `today`. Thandi offers 14:00-16:00 on Mondays.
fn next_monday(today: NaiveDate) -> NaiveDate {
    let days = (7 - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(days as i64)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teachers"], 4);
    assert_eq!(body["ai_configured"], false);
}

#[tokio::test]
async fn test_missing_or_unknown_token_is_unauthorized() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::GET, "/session", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/session", Some("not-a-session"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalogue_search() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/tutors?subject=Geography&grade=Grade%2011",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["t4"]);

    let (status, _) = send(&app, Method::GET, "/tutors/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slots_grouped_by_band() {
    let (app, state) = app();
    let monday = next_monday(state.today());

    let uri = format!("/tutors/t1/slots?date={}", monday);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["bands"],
        json!([{ "band": "afternoon", "times": ["14:00", "15:00", "16:00"] }])
    );

    let (_, body) = send(&app, Method::GET, "/tutors/t1/slots", None, None).await;
    assert_eq!(body["bands"], json!([]));
}

#[tokio::test]
async fn test_booking_requires_sign_in_then_resumes() {
    let (app, _) = app();
    let token = new_session(&app).await;

    let (status, _) = send(&app, Method::POST, "/tutors/t1/book", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, session) = send(&app, Method::GET, "/session", Some(&token), None).await;
    assert_eq!(session["auth_prompt"], "login");
    assert!(session["booking"].is_null());

    let session = login(&app, &token, "student@tutorconnect.sa").await;
    assert!(session["auth_prompt"].is_null());
    assert_eq!(session["booking"]["teacher_id"], "t1");
    assert_eq!(session["booking"]["step"], "SELECT_SLOT");
}

#[tokio::test]
async fn test_full_booking_flow() {
    let (app, state) = app();
    let token = new_session(&app).await;
    login(&app, &token, "student@tutorconnect.sa").await;
    let monday = next_monday(state.today());

    let (status, _) = send(&app, Method::POST, "/tutors/t1/book", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Checkout is blocked until both date and time are picked
    let (status, _) = send(&app, Method::POST, "/session/booking/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/session/booking/date",
        Some(&token),
        Some(json!({ "date": monday })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"][0]["band"], "afternoon");

    let (status, _) = send(
        &app,
        Method::POST,
        "/session/booking/time",
        Some(&token),
        Some(json!({ "time": "15:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/session/booking/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["step"], "CHECKOUT");
    assert_eq!(body["fees"], json!({ "tutor_fee": 250, "platform_fee": 30, "total": 280 }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/session/booking/pay",
        Some(&token),
        Some(json!({ "method": "payfast" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["step"], "CONFIRMED");
    assert_eq!(body["payfast"]["fields"]["amount"], "280.00");
    assert_eq!(body["payfast"]["submitted"], false);

    let (status, body) = send(&app, Method::POST, "/session/booking/confirm", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let booking = &body["booking"];
    assert_eq!(booking["teacher_id"], "t1");
    assert_eq!(booking["time"], "15:00");
    assert_eq!(booking["tutor_fee"], 250);
    assert_eq!(booking["platform_fee"], 30);
    assert_eq!(booking["total_paid"], 280);
    assert_eq!(booking["status"], "upcoming");
    assert_eq!(booking["payment_method"], "payfast");

    let session = &body["session"];
    assert!(session["booking"].is_null());
    assert_eq!(session["view"], "student-dashboard");
    assert!(session["toast"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Lesson with Thandi Nkosi successfully booked"));

    assert_eq!(state.marketplace.bookings()[0].id, booking["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_review_validation_and_first_review() {
    let (app, _) = app();

    let teacher_token = new_session(&app).await;
    let teacher_id = signup_teacher(&app, &teacher_token, "Lerato Mokoena", "lerato@example.com").await;

    let student_token = new_session(&app).await;
    let uri = format!("/tutors/{}/reviews", teacher_id);

    // Anonymous visitors cannot review
    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(&student_token),
        Some(json!({ "rating": 5, "comment": "Great" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, session) = send(&app, Method::GET, "/session", Some(&student_token), None).await;
    assert_eq!(session["auth_prompt"], "login");

    login(&app, &student_token, "student@tutorconnect.sa").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(&student_token),
        Some(json!({ "rating": 0, "comment": "Great" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, teacher) = send(
        &app,
        Method::POST,
        &uri,
        Some(&student_token),
        Some(json!({ "rating": 5, "comment": "Clear and patient." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(teacher["rating"], 5.0);
    assert_eq!(teacher["reviews_count"], 1);
    assert_eq!(teacher["reviews"][0]["student_name"], "Student User");
}

#[tokio::test]
async fn test_teacher_verification_outcomes() {
    let (app, state) = app();

    let accepted = new_session(&app).await;
    let accepted_id = signup_teacher(&app, &accepted, "Ayanda Zulu", "ayanda@example.com").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/teacher/verification",
        Some(&accepted),
        Some(json!({ "sace_number": "SACE1234", "id_number": "9001015009087" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["success"], true);
    assert_eq!(body["verification"]["status"], "VERIFIED");
    assert!(state.marketplace.teacher(&accepted_id).unwrap().verified);

    // Already verified
    let (status, _) = send(
        &app,
        Method::POST,
        "/teacher/verification",
        Some(&accepted),
        Some(json!({ "sace_number": "SACE1234", "id_number": "9001015009087" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let rejected = new_session(&app).await;
    let rejected_id = signup_teacher(&app, &rejected, "Musa Khumalo", "musa@example.com").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/teacher/verification",
        Some(&rejected),
        Some(json!({ "sace_number": "XYZ1", "id_number": "9001015009087" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["success"], false);
    assert_eq!(body["verification"]["status"], "REJECTED");
    assert!(!state.marketplace.teacher(&rejected_id).unwrap().verified);

    let (_, session) = send(&app, Method::GET, "/session", Some(&rejected), None).await;
    assert_eq!(session["toast"]["kind"], "error");
}

#[tokio::test]
async fn test_admin_override() {
    let (app, state) = app();

    let student = new_session(&app).await;
    login(&app, &student, "student@tutorconnect.sa").await;
    let (status, _) = send(&app, Method::GET, "/admin/teachers", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = new_session(&app).await;
    login(&app, &admin, "admin@tutorconnect.sa").await;

    let (status, body) = send(&app, Method::GET, "/admin/teachers?status=ALL", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (status, record) = send(
        &app,
        Method::POST,
        "/admin/teachers/t2/verification",
        Some(&admin),
        Some(json!({ "status": "REJECTED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["previous"], "VERIFIED");
    assert_eq!(record["status"], "REJECTED");
    assert_eq!(record["admin_id"], "admin1");
    assert!(!state.marketplace.teacher("t2").unwrap().verified);

    let (_, body) = send(&app, Method::GET, "/admin/teachers?status=rejected", Some(&admin), None).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["t2"]);

    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/teachers/t2/verification",
        Some(&admin),
        Some(json!({ "status": "PENDING" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_dashboard_carries_calendar_links() {
    let (app, _) = app();
    let token = new_session(&app).await;
    login(&app, &token, "thandi@tutorconnect.sa").await;

    let (status, body) = send(&app, Method::GET, "/dashboard/teacher", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = body["upcoming"].as_array().unwrap();
    assert!(!upcoming.is_empty());
    assert!(upcoming[0]["calendar_link"]
        .as_str()
        .unwrap()
        .contains("action=TEMPLATE"));

    let (status, _) = send(&app, Method::GET, "/dashboard/student", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ai_without_key_falls_back() {
    let (app, _) = app();
    let token = new_session(&app).await;
    login(&app, &token, "student@tutorconnect.sa").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/ai/chat",
        Some(&token),
        Some(json!({ "history": [], "message": "What is a derivative?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], CHAT_UNAVAILABLE);
}

#[tokio::test]
async fn test_concurrent_sign_in_is_rejected() {
    let mut config = AppConfig::for_tests();
    config.simulation.auth_ms = 100;
    let (app, _) = app_with(config);
    let token = new_session(&app).await;

    let body = json!({ "email": "student@tutorconnect.sa", "password": "password" });
    let (first, second) = tokio::join!(
        send(&app, Method::POST, "/auth/login", Some(&token), Some(body.clone())),
        send(&app, Method::POST, "/auth/login", Some(&token), Some(body)),
    );

    let mut statuses = [first.0.as_u16(), second.0.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);
}

#[tokio::test]
async fn test_logout_returns_home_with_toast() {
    let (app, _) = app();
    let token = new_session(&app).await;
    login(&app, &token, "student@tutorconnect.sa").await;

    let (status, session) = send(&app, Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(session["user"].is_null());
    assert_eq!(session["view"], "home");
    assert_eq!(session["toast"]["message"], "You have been logged out safely.");
}

#[tokio::test]
async fn test_withdrawn_slot_sends_wizard_back_to_selection() {
    let (app, state) = app();
    let token = new_session(&app).await;
    login(&app, &token, "student@tutorconnect.sa").await;
    let monday = next_monday(state.today());

    send(&app, Method::POST, "/tutors/t1/book", Some(&token), None).await;
    send(&app, Method::POST, "/session/booking/date", Some(&token), Some(json!({ "date": monday }))).await;
    send(&app, Method::POST, "/session/booking/time", Some(&token), Some(json!({ "time": "15:00" }))).await;
    send(&app, Method::POST, "/session/booking/checkout", Some(&token), None).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/session/booking/pay",
        Some(&token),
        Some(json!({ "method": "ozow" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Thandi clears her week between payment and confirmation
    state
        .marketplace
        .set_availability("t1", WeeklyAvailability::new())
        .unwrap();
    let bookings_before = state.marketplace.bookings().len();

    let (status, _) = send(&app, Method::POST, "/session/booking/confirm", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(state.marketplace.bookings().len(), bookings_before);

    let (status, body) = send(&app, Method::GET, "/session/booking", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["step"], "SELECT_SLOT");
    assert_eq!(body["booking"]["selection"]["date"], json!(monday));
    assert!(body["booking"]["selection"]["time"].is_null());

    let (status, _) = send(
        &app,
        Method::POST,
        "/session/booking/date",
        Some(&token),
        Some(json!({ "date": monday })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signed_up_teacher_signs_back_in_with_own_password() {
    let (app, _) = app();
    let token = new_session(&app).await;
    let teacher_id = signup_teacher(&app, &token, "Zanele Mthembu", "zanele@example.com").await;
    send(&app, Method::POST, "/auth/logout", Some(&token), None).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(&token),
        Some(json!({ "email": "zanele@example.com", "password": "password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, session) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(&token),
        Some(json!({ "email": "zanele@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["teacher_id"], teacher_id);
    assert_eq!(session["view"], "teacher-dashboard");
}

#[tokio::test]
async fn test_availability_editor_saves_draft() {
    let (app, state) = app();
    let token = new_session(&app).await;
    login(&app, &token, "thandi@tutorconnect.sa").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/teacher/availability/toggle",
        Some(&token),
        Some(json!({ "day": "Monday", "time": "08:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offered"], true);
    assert_eq!(body["availability"]["Monday"], json!(["08:00", "14:00", "15:00", "16:00"]));

    let (status, _) = send(
        &app,
        Method::POST,
        "/teacher/availability/toggle",
        Some(&token),
        Some(json!({ "day": "Monday", "time": "07:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The draft is not live until saved
    assert_eq!(state.marketplace.teacher("t1").unwrap().slots_on(Day::Monday).len(), 3);

    let (status, body) = send(&app, Method::POST, "/teacher/availability/clear", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availability"]["Monday"], json!([]));

    let (status, _) = send(&app, Method::PUT, "/teacher/availability", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.marketplace.teacher("t1").unwrap().slots_on(Day::Monday).is_empty());

    let (_, session) = send(&app, Method::GET, "/session", Some(&token), None).await;
    assert_eq!(session["toast"]["message"], "Availability saved.");
}
