//! End-to-end tests driving the router with form submissions.

mod common;

use axum::http::StatusCode;
use common::*;
use routine_tracker_core::{
    CompletionRepository, ExerciseRepository, Provenance, UserRepository,
};
use web_lib::web::auth::LOGIN_FAILED;

#[tokio::test]
async fn register_then_login_establishes_session() {
    let db = test_db().await;
    let app = test_app(&db);

    let response = register(&app, "ana@example.com", "s3cret-pass").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = login(&app, "ana@example.com", "s3cret-pass").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/exercise");
    let cookie = session_cookie(&response).expect("session cookie");

    let response = send(&app, get("/track_record", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("ana@example.com"));
}

#[tokio::test]
async fn login_page_shows_registration_notice_once() {
    let db = test_db().await;
    let app = test_app(&db);

    let response = send(&app, get("/login", Some("flash=registered"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Registered successfully!"));
}

#[tokio::test]
async fn mismatched_confirmation_creates_no_user() {
    let db = test_db().await;
    let app = test_app(&db);

    let response = send(
        &app,
        post_form(
            "/register",
            "email=bo%40example.com&password=one&confirm_password=two",
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Passwords do not match!"));
    assert_eq!(db.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let db = test_db().await;
    let app = test_app(&db);

    register(&app, "cy@example.com", "first-pass").await;
    assert_eq!(db.count_users().await.unwrap(), 1);

    let response = register(&app, "CY@example.com", "second-pass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn failed_logins_do_not_reveal_which_factor_was_wrong() {
    let db = test_db().await;
    let app = test_app(&db);
    register(&app, "di@example.com", "right-pass").await;

    let wrong_password = login(&app, "di@example.com", "wrong-pass").await;
    let unknown_email = login(&app, "nobody@example.com", "right-pass").await;

    for response in [wrong_password, unknown_email] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&response).is_none());
        let html = body_text(response).await;
        assert!(html.contains(LOGIN_FAILED));
    }
}

#[tokio::test]
async fn anonymous_proposal_returns_five_matching_exercises() {
    let db = test_db().await;
    seed_shoulder_catalog(&db).await;
    let app = test_app(&db);

    let response = send(
        &app,
        post_form(
            "/exercise",
            "body_part=Shoulder&type=Stretch&time_available=20&equipment=Band&equipment=Mat&difficulty=Beginner&space=Small",
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let ids = listed_exercise_ids(&body_text(response).await);
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    for id in ids {
        let exercise = db.get_exercise_by_id(id).await.unwrap();
        assert_eq!(exercise.body_part, "Shoulder");
        assert_eq!(exercise.exercise_type, "Stretch");
    }
}

#[tokio::test]
async fn invalid_time_available_rerenders_the_form() {
    let db = test_db().await;
    let app = test_app(&db);

    let response = send(
        &app,
        post_form("/exercise", "body_part=Shoulder&type=Stretch&time_available=lots", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Time available must be a whole number"));
    assert!(html.contains(r#"action="/exercise""#));
}

#[tokio::test]
async fn completed_exercises_are_not_proposed_again() {
    let db = test_db().await;
    seed_shoulder_catalog(&db).await;
    let app = test_app(&db);
    let cookie = register_and_login(&app, "ed@example.com", "pass-word").await;

    let response = send(
        &app,
        post_form("/routine_proposal", "exercise_id=1&exercise_id=2", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/track_record");

    let user = db.get_user_by_email("ed@example.com").await.unwrap();
    let records = db.get_completions_by_user(user.user_id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.user_id == user.user_id));

    let response = send(
        &app,
        post_form(
            "/exercise",
            "body_part=Shoulder&type=Stretch&time_available=20",
            Some(&cookie),
        ),
    )
    .await;
    let ids = listed_exercise_ids(&body_text(response).await);
    assert_eq!(ids, vec![3, 4, 5, 6]);
}

#[tokio::test]
async fn track_record_lists_completions_newest_first() {
    let db = test_db().await;
    seed_shoulder_catalog(&db).await;
    let app = test_app(&db);
    let cookie = register_and_login(&app, "fi@example.com", "pass-word").await;

    send(&app, post_form("/routine_proposal", "exercise_id=2", Some(&cookie))).await;
    send(&app, post_form("/routine_proposal", "exercise_id=5", Some(&cookie))).await;

    let response = send(&app, get("/track_record", Some(&cookie))).await;
    let html = body_text(response).await;
    assert_eq!(listed_exercise_ids(&html), vec![5, 2]);
    assert!(html.contains("Shoulder stretch 5"));
}

#[tokio::test]
async fn unknown_exercise_id_records_nothing() {
    let db = test_db().await;
    seed_shoulder_catalog(&db).await;
    let app = test_app(&db);
    let cookie = register_and_login(&app, "gu@example.com", "pass-word").await;

    let response = send(
        &app,
        post_form("/routine_proposal", "exercise_id=1&exercise_id=404", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/exercise");

    let user = db.get_user_by_email("gu@example.com").await.unwrap();
    assert!(db.get_completions_by_user(user.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn protected_routes_redirect_to_login() {
    let db = test_db().await;
    seed_shoulder_catalog(&db).await;
    let app = test_app(&db);

    let response = send(&app, get("/track_record", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=/track_record");

    let response = send(&app, post_form("/routine_proposal", "exercise_id=1", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = send(&app, get("/add_exercise", None)).await;
    assert_eq!(location(&response), "/login?next=/add_exercise");
}

#[tokio::test]
async fn login_resumes_the_requested_page() {
    let db = test_db().await;
    let app = test_app(&db);
    register(&app, "hal@example.com", "pass-word").await;

    let response = send(
        &app,
        post_form(
            "/login",
            "email=hal%40example.com&password=pass-word&next=%2Ftrack_record",
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/track_record");
}

#[tokio::test]
async fn tampered_session_cookie_is_rejected() {
    let db = test_db().await;
    let app = test_app(&db);
    let cookie = register_and_login(&app, "ivy@example.com", "pass-word").await;

    let (session_id, _signature) = cookie.rsplit_once('.').unwrap();
    let forged = format!("{}.{}", session_id, "00".repeat(32));

    let response = send(&app, get("/track_record", Some(&forged))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let db = test_db().await;
    let app = test_app(&db);
    let cookie = register_and_login(&app, "jo@example.com", "pass-word").await;

    let response = send(&app, get("/logout", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = send(&app, get("/track_record", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn add_exercise_creates_a_user_entry() {
    let db = test_db().await;
    let app = test_app(&db);
    let cookie = register_and_login(&app, "kim@example.com", "pass-word").await;

    let response = send(
        &app,
        post_form(
            "/add_exercise",
            "name=Clamshell&body_part=Hip&type=Strength&sets=3&reps=15&hold=&total_time=240&equipment=Band&state=Chronic&level=Beginner&space=&directions=Open+the+top+knee.",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/exercise");

    assert_eq!(db.count_exercises().await.unwrap(), 1);
    let stored = db.list_exercises_by_filter("Hip", "Strength").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].provenance, Provenance::User);
    assert_eq!(stored[0].hold, None);
}

#[tokio::test]
async fn add_exercise_missing_a_required_field_creates_nothing() {
    let db = test_db().await;
    let app = test_app(&db);
    let cookie = register_and_login(&app, "lu@example.com", "pass-word").await;

    let response = send(
        &app,
        post_form(
            "/add_exercise",
            "name=Clamshell&body_part=Hip&type=Strength&sets=3&total_time=240&state=Chronic&level=Beginner",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Directions is required."));
    assert!(html.contains(r#"value="Clamshell""#));
    assert_eq!(db.count_exercises().await.unwrap(), 0);
}
