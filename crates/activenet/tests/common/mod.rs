//! A local axum server emulating the ActiveNet upstream.
//!
//! Serves the sign-in redirect chain (three hops, one cookie each, CSRF
//! token embedded in the final page), the sign-in REST endpoint, and the
//! activity endpoints, all wrapped in the `{headers, body}` envelope.
//! Tests point an `UpstreamConfig` at the bound address.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;

use samo_activenet::config::UpstreamConfig;

/// Username/password pair the mock accepts.
pub const VALID_USERNAME: &str = "kim@example.com";
pub const VALID_PASSWORD: &str = "hunter2";

/// Activity id the mock has full data for.
pub const KNOWN_ACTIVITY: i64 = 1201;
/// Activity id the mock rejects with a business error.
pub const FAILING_ACTIVITY: i64 = 9404;
/// Activity id the mock answers with an empty result for.
pub const EMPTY_ACTIVITY: i64 = 9001;

#[derive(Default)]
pub struct MockState {
    /// Serial of the CSRF token currently served by the sign-in page;
    /// mutating calls must present `csrf-{serial}`.
    csrf_serial: AtomicUsize,
    /// How many times the sign-in landing page was fetched.
    bootstrap_hits: AtomicUsize,
    /// When set, every mutating call is rejected with 403 regardless of
    /// the token presented.
    reject_mutations: AtomicBool,
}

pub struct MockUpstream {
    pub base_url: String,
    pub signin_page_url: String,
    pub missing_token_page_url: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    /// Bind to an ephemeral port and serve the mock in a background task.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState {
            csrf_serial: AtomicUsize::new(1),
            ..Default::default()
        });

        let app = Router::new()
            .route("/signin", get(signin_entry))
            .route("/signin/session", get(signin_session))
            .route("/signin/landing", get(signin_landing))
            .route("/signin-missing-token", get(signin_missing_token))
            .route("/rest/user/signin", post(user_signin))
            .route("/rest/activities/filters", get(activity_filters))
            .route("/rest/activities/list", post(activity_list))
            .route(
                "/rest/activity/detail/meetingandregistrationdates/{id}",
                get(meeting_dates),
            )
            .route("/rest/activity/detail/estimateprice/{id}", get(estimate_price))
            .route("/rest/activity/detail/buttonstatus/{id}", get(button_status))
            .route("/rest/activity/detail/{id}", get(activity_detail))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("mock local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock upstream serve");
        });

        Self {
            base_url: format!("http://{addr}/rest"),
            signin_page_url: format!("http://{addr}/signin"),
            missing_token_page_url: format!("http://{addr}/signin-missing-token"),
            state,
        }
    }

    /// An `UpstreamConfig` pointed at this mock.
    pub fn config(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.base_url.clone(),
            signin_page_url: self.signin_page_url.clone(),
            locale: "en-US".to_string(),
            timeout_secs: 5,
        }
    }

    /// The CSRF token the sign-in page currently serves.
    pub fn current_csrf(&self) -> String {
        format!("csrf-{}", self.state.csrf_serial.load(Ordering::SeqCst))
    }

    /// Invalidate every previously issued CSRF token.
    pub fn rotate_csrf(&self) {
        self.state.csrf_serial.fetch_add(1, Ordering::SeqCst);
    }

    /// Reject all mutating calls with 403 from now on.
    pub fn reject_mutations(&self) {
        self.state.reject_mutations.store(true, Ordering::SeqCst);
    }

    pub fn bootstrap_hits(&self) -> usize {
        self.state.bootstrap_hits.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Sign-in redirect chain (3 hops, one cookie each)
// ---------------------------------------------------------------------------

async fn signin_entry() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/signin/session".to_string()),
            (header::SET_COOKIE, "anc_entry=hop1; Path=/".to_string()),
        ],
    )
}

async fn signin_session() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/signin/landing".to_string()),
            (header::SET_COOKIE, "anc_session=anon-0001; Path=/".to_string()),
        ],
    )
}

async fn signin_landing(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.bootstrap_hits.fetch_add(1, Ordering::SeqCst);
    let serial = state.csrf_serial.load(Ordering::SeqCst);
    let html = format!(
        r#"<html><head><script>
            window.__locale = "en-US";
            window.__csrfToken = "csrf-{serial}";
        </script></head><body>Sign In</body></html>"#
    );
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "anc_device=mock-device; Path=/".to_string())],
        Html(html),
    )
}

async fn signin_missing_token() -> Html<&'static str> {
    Html("<html><body>No token on this page.</body></html>")
}

// ---------------------------------------------------------------------------
// REST endpoints
// ---------------------------------------------------------------------------

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

async fn user_signin(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if state.reject_mutations.load(Ordering::SeqCst) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let username = body["login_name"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if username == VALID_USERNAME && password == VALID_PASSWORD {
        (
            StatusCode::OK,
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
                            "customer_id": 77,
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
            "centers": [ { "id": "10", "name": "Memorial Park" } ],
            "categories": [ { "id": 3, "desc": "Aquatics" } ],
        }),
    )
}

async fn activity_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if state.reject_mutations.load(Ordering::SeqCst) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let expected = format!("csrf-{}", state.csrf_serial.load(Ordering::SeqCst));
    let presented = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented != expected {
        return StatusCode::FORBIDDEN.into_response();
    }

    let keyword = body["activity_search_pattern"]["activity_keyword"]
        .as_str()
        .unwrap_or_default();
    match keyword {
        "nothing" => envelope("0001", "No results found", serde_json::Value::Null).into_response(),
        "explode" => envelope("9999", "Search unavailable", json!({})).into_response(),
        _ => envelope(
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
        .into_response(),
    }
}

async fn meeting_dates(Path(id): Path<i64>) -> Json<serde_json::Value> {
    match id {
        KNOWN_ACTIVITY => envelope(
            "0000",
            "Successful",
            json!({
                "meeting_and_registration_dates": {
                    "activity_id": KNOWN_ACTIVITY,
                    "no_meeting_dates": false,
                    "activity_patterns": [{
                        "beginning_date": "2026-03-03",
                        "ending_date": "2026-03-26",
                        "weeks_of_month": "",
                        "exception_dates": [],
                        "pattern_dates": [{
                            "weekdays": "Tue, Thu",
                            "starting_time": "16:30:00",
                            "ending_time": "16:55:00",
                        }],
                    }],
                },
            }),
        ),
        FAILING_ACTIVITY => envelope("9998", "Activity not found", json!({})),
        EMPTY_ACTIVITY => envelope("0001", "No results found", serde_json::Value::Null),
        _ => envelope("0000", "Successful", json!({})),
    }
}

async fn activity_detail(Path(id): Path<i64>) -> Json<serde_json::Value> {
    if id == KNOWN_ACTIVITY {
        envelope(
            "0000",
            "Successful",
            json!({
                "detail": {
                    "activity_id": KNOWN_ACTIVITY,
                    "activity_name": "Youth Gymnastics",
                    "activity_number": "1201.101",
                    "category": "Gymnastics",
                    "first_date": "2026-03-03",
                    "last_date": "2026-03-26",
                    "instructors": [
                        { "id": 5, "first_name": "Dana", "last_name": "Ortiz", "is_primary_instructor": true }
                    ],
                },
            }),
        )
    } else {
        envelope("0001", "No results found", serde_json::Value::Null)
    }
}

async fn estimate_price(Path(id): Path<i64>) -> Json<serde_json::Value> {
    if id == KNOWN_ACTIVITY {
        envelope(
            "0000",
            "Successful",
            json!({
                "estimate_price": "$120.00",
                "free": false,
                "prices": [{
                    "list_name": "Resident",
                    "details": [ { "price": "$120.00", "description": "Session fee" } ],
                }],
            }),
        )
    } else {
        envelope("0001", "No results found", serde_json::Value::Null)
    }
}

async fn button_status(Path(id): Path<i64>) -> Json<serde_json::Value> {
    if id == KNOWN_ACTIVITY {
        envelope(
            "0000",
            "Successful",
            json!({
                "action_link": { "href": "/enroll/1201", "label": "Enroll Now" },
                "time_remaining": 0,
                "notification": "",
            }),
        )
    } else {
        envelope("0001", "No results found", serde_json::Value::Null)
    }
}
