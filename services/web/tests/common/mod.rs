//! Shared helpers for the web service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use routine_tracker_core::{ExerciseRepository, NewExercise, Provenance};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::Level;
use web_lib::{
    adapters::DbAdapter,
    config::Config,
    web::{router, AppState},
};

pub const TEST_SECRET: &str = "integration-test-secret-with-enough-bytes";

pub async fn test_db() -> DbAdapter {
    let db = DbAdapter::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        log_level: Level::INFO,
        session_secret: TEST_SECRET.to_string(),
        session_ttl_hours: 1,
        secure_cookies: false,
        seed_csv_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/exercises.csv"),
    }
}

pub fn test_app(db: &DbAdapter) -> Router {
    router(Arc::new(AppState::new(db.clone(), Arc::new(test_config()))))
}

pub fn exercise(name: &str, body_part: &str, exercise_type: &str) -> NewExercise {
    NewExercise {
        name: name.to_string(),
        body_part: body_part.to_string(),
        exercise_type: exercise_type.to_string(),
        sets: 3,
        reps: Some(10),
        hold: None,
        total_time: 180,
        equipment: None,
        state: "Chronic".to_string(),
        level: "Beginner".to_string(),
        space: Some("Small".to_string()),
        directions: "Move through a comfortable range.".to_string(),
        provenance: Provenance::System,
    }
}

/// Six "Shoulder"/"Stretch" entries with ids 1 to 6, then two others.
pub async fn seed_shoulder_catalog(db: &DbAdapter) {
    let mut rows: Vec<NewExercise> = (1..=6)
        .map(|i| exercise(&format!("Shoulder stretch {}", i), "Shoulder", "Stretch"))
        .collect();
    rows.push(exercise("Quad set", "Knee", "Strength"));
    rows.push(exercise("Band row", "Shoulder", "Strength"));
    db.create_exercises(rows).await.unwrap();
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// The `session=<token>` pair from a login response, ready for a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session=") && !v.starts_with("session=;"))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Ids of the exercises listed on a rendered page, in page order.
pub fn listed_exercise_ids(html: &str) -> Vec<i64> {
    html.split("data-exercise-id=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter_map(|id| id.parse().ok())
        .collect()
}

pub async fn register(app: &Router, email: &str, password: &str) -> Response<Body> {
    let body = format!(
        "email={}&password={}&confirm_password={}",
        email.replace('@', "%40"),
        password,
        password
    );
    send(app, post_form("/register", &body, None)).await
}

pub async fn login(app: &Router, email: &str, password: &str) -> Response<Body> {
    let body = format!("email={}&password={}", email.replace('@', "%40"), password);
    send(app, post_form("/login", &body, None)).await
}

/// Registers a fresh account and returns its session cookie.
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
    register(app, email, password).await;
    let response = login(app, email, password).await;
    session_cookie(&response).expect("login did not set a session cookie")
}
