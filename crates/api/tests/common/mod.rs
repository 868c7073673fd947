//! Shared harness for API integration tests: a mock ActiveNet upstream
//! plus the full application router (same middleware stack as
//! production) pointed at it, and request/response helpers driven
//! through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Json, Path};
use axum::http::{header, Request, Response, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get as axum_get, post};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use samo_activenet::config::UpstreamConfig;
use samo_api::config::ServerConfig;
use samo_api::router::build_app_router;
use samo_api::sessions::SessionStore;
use samo_api::state::AppState;

pub const VALID_USERNAME: &str = "kim@example.com";
pub const VALID_PASSWORD: &str = "hunter2";
pub const KNOWN_ACTIVITY: i64 = 1201;

/// The application under test plus the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Spawn the mock upstream and build the app against it.
pub async fn spawn_app() -> TestApp {
    let upstream = spawn_mock_upstream().await;
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upstream,
    };

    let state = AppState {
        sessions: Arc::new(SessionStore::new(Arc::new(config.upstream.clone()))),
        config: Arc::new(config.clone()),
    };
    let router = build_app_router(state.clone(), &config);

    TestApp { router, state }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_with_cookie(app: &Router, uri: &str, session_id: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, format!("samo_session={session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    session_id: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session_id {
        builder = builder.header(header::COOKIE, format!("samo_session={id}"));
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Collect and parse a JSON response body.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Pull the `samo_session` value out of a response's `Set-Cookie`.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let value = raw.strip_prefix("samo_session=")?;
    Some(value.split(';').next().unwrap_or_default().to_string())
}

// ---------------------------------------------------------------------------
// Mock ActiveNet upstream
// ---------------------------------------------------------------------------

/// Bind a local server emulating the ActiveNet endpoints the app talks
/// to, and return an [`UpstreamConfig`] pointed at it.
async fn spawn_mock_upstream() -> UpstreamConfig {
    let app = Router::new()
        .route("/signin", axum_get(signin_entry))
        .route("/signin/landing", axum_get(signin_landing))
        .route("/rest/user/signin", post(user_signin))
        .route("/rest/activities/filters", axum_get(activity_filters))
        .route("/rest/activities/list", post(activity_list))
        .route(
            "/rest/activity/detail/meetingandregistrationdates/{id}",
            axum_get(meeting_dates),
        )
        .route("/rest/activity/detail/estimateprice/{id}", axum_get(empty_envelope))
        .route("/rest/activity/detail/buttonstatus/{id}", axum_get(empty_envelope))
        .route("/rest/activity/detail/{id}", axum_get(activity_detail));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock upstream");
    let addr = listener.local_addr().expect("mock local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock upstream serve");
    });

    UpstreamConfig {
        base_url: format!("http://{addr}/rest"),
        signin_page_url: format!("http://{addr}/signin"),
        locale: "en-US".to_string(),
        timeout_secs: 5,
    }
}

fn envelope(code: &str, message: &str, body: serde_json::Value) -> Json<serde_json::Value> {
    Json(json!({
        "headers": {
            "response_code": code,
            "response_message": message,
            "page_info": {
                "order_by": "",
                "page_number": 1,
                "total_records_per_page": 20,
                "total_page": 1,
                "total_records": 1,
            },
        },
        "body": body,
    }))
}

async fn signin_entry() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/signin/landing".to_string()),
            (header::SET_COOKIE, "anc_session=anon-0001; Path=/".to_string()),
        ],
    )
}

async fn signin_landing() -> Html<&'static str> {
    Html(
        r#"<html><head><script>
            window.__csrfToken = "csrf-mock";
        </script></head><body>Sign In</body></html>"#,
    )
}

async fn user_signin(Json(body): Json<serde_json::Value>) -> axum::response::Response {
    let username = body["login_name"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if username == VALID_USERNAME && password == VALID_PASSWORD {
        (
            [(
                header::SET_COOKIE,
                "anc_session=authed-kim; Path=/".to_string(),
            )],
            envelope(
                "0000",
                "Successful",
                json!({
                    "result": {
                        "access_token": "at-mock-123",
                        "refresh_token": "rt-mock-456",
                        "customer": {
                            "first_name": "Kim",
                            "last_name": "Rivera",
                            "email": VALID_USERNAME,
                        },
                    },
                }),
            ),
        )
            .into_response()
    } else {
        envelope("9999", "Invalid username or password", json!({})).into_response()
    }
}

async fn activity_filters() -> Json<serde_json::Value> {
    envelope(
        "0000",
        "Successful",
        json!({
            "categories": [ { "id": 3, "desc": "Aquatics" } ],
            "centers": [ { "id": "10", "name": "Memorial Park" } ],
        }),
    )
}

async fn activity_list(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    let keyword = body["activity_search_pattern"]["activity_keyword"]
        .as_str()
        .unwrap_or_default();
    if keyword == "nothing" {
        return envelope("0001", "No results found", serde_json::Value::Null);
    }
    envelope(
        "0000",
        "Successful",
        json!({
            "activity_items": [{
                "id": KNOWN_ACTIVITY,
                "name": "Youth Gymnastics",
                "number": "1201.101",
                "date_range_start": "2026-03-03",
                "date_range_end": "2026-03-26",
                "ages": "5 - 11y 11m",
                "total_open": 4,
                "location": { "label": "Memorial Park" },
                "action_link": { "href": "/enroll/1201", "label": "Enroll Now" },
            }],
        }),
    )
}

async fn meeting_dates(Path(id): Path<i64>) -> Json<serde_json::Value> {
    if id != KNOWN_ACTIVITY {
        return envelope("0001", "No results found", serde_json::Value::Null);
    }
    envelope(
        "0000",
        "Successful",
        json!({
            "meeting_and_registration_dates": {
                "activity_id": KNOWN_ACTIVITY,
                "no_meeting_dates": false,
                "activity_patterns": [{
                    "beginning_date": "2026-03-03",
                    "ending_date": "2026-03-26",
                    "exception_dates": [],
                    "pattern_dates": [{
                        "weekdays": "Tue, Thu",
                        "starting_time": "16:30:00",
                        "ending_time": "16:55:00",
                    }],
                }],
            },
        }),
    )
}

async fn activity_detail(Path(id): Path<i64>) -> Json<serde_json::Value> {
    if id != KNOWN_ACTIVITY {
        return envelope("0001", "No results found", serde_json::Value::Null);
    }
    envelope(
        "0000",
        "Successful",
        json!({
            "detail": {
                "activity_id": KNOWN_ACTIVITY,
                "activity_name": "Youth Gymnastics",
                "activity_number": "1201.101",
                "category": "Gymnastics",
            },
        }),
    )
}

async fn empty_envelope(Path(_id): Path<i64>) -> Json<serde_json::Value> {
    envelope("0001", "No results found", serde_json::Value::Null)
}
