mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use hospital::api::rest::extract::SESSION_TOKEN_HEADER;
use hospital::api::rest::routes;

use common::setup_service;

async fn app() -> Router {
    routes::router(setup_service().await)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn get_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(SESSION_TOKEN_HEADER, token)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(SESSION_TOKEN_HEADER, token);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

fn location(resp: &axum::response::Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn register(app: &Router, username: &str, role: &str) {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/register",
            &json!({
                "username": username,
                "password": "hunter22",
                "confirm": "hunter22",
                "role": role,
            }),
            None,
        ))
        .await
        .expect("register");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/login?notice="));
}

async fn login(app: &Router, username: &str) -> String {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/login",
            &json!({ "username": username, "password": "hunter22" }),
            None,
        ))
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["redirect_to"], "/dashboard");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn landing_page_is_open() {
    let app = app().await;
    let resp = app.oneshot(get("/")).await.expect("home");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn gated_routes_redirect_anonymous_callers_to_login() {
    let app = app().await;
    for uri in [
        "/dashboard",
        "/appointments",
        "/medical_history",
        "/organ_donation",
        "/search_organ?organ=kidney",
        "/book_appointment/1",
        "/logout",
    ] {
        let resp = app.clone().oneshot(get(uri)).await.expect("request");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "uri {uri}");
        assert_eq!(location(&resp), "/login", "uri {uri}");
    }
}

#[tokio::test]
async fn register_validation_failure_rerenders_with_field_errors() {
    let app = app().await;
    let resp = app
        .oneshot(post_json(
            "/register",
            &json!({
                "username": "abc",
                "password": "short",
                "confirm": "different",
                "role": "nurse",
            }),
            None,
        ))
        .await
        .expect("register");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(resp).await;
    assert!(body["errors"]["username"].is_array());
    assert!(body["errors"]["password"].is_array());
    assert_eq!(body["errors"]["role"][0], "Not a valid choice.");
    // Submitted values come back for re-rendering, passwords scrubbed.
    assert_eq!(body["values"]["username"], "abc");
    assert_eq!(body["values"]["password"], "");
    assert_eq!(body["values"]["confirm"], "");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    register(&app, "drsmith", "doctor").await;

    let resp = app
        .oneshot(post_json(
            "/register",
            &json!({
                "username": "drsmith",
                "password": "hunter22",
                "confirm": "hunter22",
                "role": "patient",
            }),
            None,
        ))
        .await
        .expect("register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
}

#[tokio::test]
async fn bad_credentials_yield_one_generic_message() {
    let app = app().await;
    register(&app, "drsmith", "doctor").await;

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/login",
            &json!({ "username": "drsmith", "password": "wrong-password" }),
            None,
        ))
        .await
        .expect("login");
    let unknown_user = app
        .clone()
        .oneshot(post_json(
            "/login",
            &json!({ "username": "stranger", "password": "hunter22" }),
            None,
        ))
        .await
        .expect("login");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_user).await;
    assert_eq!(a["detail"], b["detail"]);
    assert_eq!(a["detail"], "Invalid Username or Password");
}

#[tokio::test]
async fn doctor_publishes_and_patient_books_a_slot() {
    let app = app().await;
    register(&app, "drsmith", "doctor").await;
    register(&app, "alice01", "patient").await;
    let doctor_token = login(&app, "drsmith").await;
    let patient_token = login(&app, "alice01").await;

    // Doctor publishes a slot and gets the refreshed list back.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/appointments",
            &json!({ "date": "2025-03-01", "time": "09:00" }),
            Some(&doctor_token),
        ))
        .await
        .expect("create slot");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["flash"]["message"], "Appointment Slot Created!");
    assert_eq!(body["appointments"][0]["status"], "available");
    assert_eq!(body["appointments"][0]["date"], "2025-03-01");
    assert!(body["appointments"][0]["patient"].is_null());

    // Patient sees it in the available list.
    let resp = app
        .clone()
        .oneshot(get_auth("/appointments", &patient_token))
        .await
        .expect("patient view");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["booked"].as_array().expect("booked").len(), 0);
    let slot_id = body["available"][0]["id"].as_i64().expect("slot id");
    assert_eq!(body["available"][0]["doctor"]["username"], "drsmith");

    // Claim it.
    let resp = app
        .clone()
        .oneshot(get_auth(
            &format!("/book_appointment/{slot_id}"),
            &patient_token,
        ))
        .await
        .expect("book");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "/appointments?notice=Appointment%20Booked%21"
    );

    // A second claim reports non-availability and changes nothing.
    let resp = app
        .clone()
        .oneshot(get_auth(
            &format!("/book_appointment/{slot_id}"),
            &patient_token,
        ))
        .await
        .expect("rebook");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "/appointments?notice=Appointment%20Not%20Available"
    );

    // Doctor now sees the claiming patient on the slot.
    let resp = app
        .clone()
        .oneshot(get_auth("/appointments", &doctor_token))
        .await
        .expect("doctor view");
    let body = body_json(resp).await;
    assert_eq!(body["appointments"][0]["status"], "booked");
    assert_eq!(body["appointments"][0]["patient"]["username"], "alice01");
}

#[tokio::test]
async fn booking_a_missing_slot_is_a_problem_404() {
    let app = app().await;
    register(&app, "alice01", "patient").await;
    let token = login(&app, "alice01").await;

    let resp = app
        .oneshot(get_auth("/book_appointment/999", &token))
        .await
        .expect("book");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
}

#[tokio::test]
async fn patients_cannot_publish_slots_or_author_records() {
    let app = app().await;
    register(&app, "alice01", "patient").await;
    let token = login(&app, "alice01").await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/appointments",
            &json!({ "date": "2025-03-01", "time": "09:00" }),
            Some(&token),
        ))
        .await
        .expect("create slot");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard?notice=Invalid%20Role");

    let resp = app
        .clone()
        .oneshot(post_json(
            "/medical_history",
            &json!({ "patient_id": 1, "diagnosis": "self-diagnosis" }),
            Some(&token),
        ))
        .await
        .expect("create record");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard?notice=Invalid%20Role");
}

#[tokio::test]
async fn medical_record_cross_check_reports_on_the_field() {
    let app = app().await;
    register(&app, "drsmith", "doctor").await;
    let token = login(&app, "drsmith").await;

    let resp = app
        .oneshot(post_json(
            "/medical_history",
            &json!({ "patient_id": 424242, "diagnosis": "flu" }),
            Some(&token),
        ))
        .await
        .expect("create record");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"]["patient_id"][0], "Patient ID does not exist.");
}

#[tokio::test]
async fn donation_round_trip_and_search() {
    let app = app().await;
    register(&app, "alice01", "patient").await;
    let token = login(&app, "alice01").await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/organ_donation",
            &json!({ "organ": "kidney" }),
            Some(&token),
        ))
        .await
        .expect("donate");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["flash"]["message"], "Organ Donation Registered!");
    assert_eq!(body["donations"][0]["organ"], "kidney");
    assert_eq!(body["donations"][0]["donor"]["username"], "alice01");

    // Exact-match search finds it; a different label does not.
    let resp = app
        .clone()
        .oneshot(get_auth("/search_organ?organ=kidney", &token))
        .await
        .expect("search");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["donations"].as_array().expect("donations").len(), 1);

    let resp = app
        .clone()
        .oneshot(get_auth("/search_organ?organ=liver", &token))
        .await
        .expect("search");
    let body = body_json(resp).await;
    assert_eq!(body["donations"].as_array().expect("donations").len(), 0);

    // Missing query redirects with a warning instead of searching.
    let resp = app
        .clone()
        .oneshot(get_auth("/search_organ", &token))
        .await
        .expect("search");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "/organ_donation?notice=Please%20enter%20an%20organ%20to%20search."
    );
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = app().await;
    register(&app, "alice01", "patient").await;
    let token = login(&app, "alice01").await;

    let resp = app
        .clone()
        .oneshot(get_auth("/logout", &token))
        .await
        .expect("logout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/?notice="));

    // The token is dead now.
    let resp = app
        .clone()
        .oneshot(get_auth("/dashboard", &token))
        .await
        .expect("dashboard");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn unknown_paths_render_a_problem_404() {
    let app = app().await;
    let resp = app.oneshot(get("/no_such_page")).await.expect("request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app().await;
    let resp = app
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .expect("openapi");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["paths"]["/appointments"].is_object());
}
