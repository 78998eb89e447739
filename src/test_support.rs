use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, state::AppState};

pub const PASSWORD: &str = "securepassword";

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            router: build_app(AppState::fake()),
        }
    }
}

async fn dispatch(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "testserver");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = request(method, uri, token);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    dispatch(app, request).await
}

/// Sends `raw` verbatim as a JSON-typed body.
pub async fn send_raw(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    raw: &str,
) -> (StatusCode, Value) {
    let request = request(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw.to_string()))
        .expect("request");
    dispatch(app, request).await
}

pub async fn register(app: &TestApp, email: &str) -> StatusCode {
    let body = json!({ "email": email, "password": PASSWORD });
    send(app, Method::POST, "/register/", None, Some(body)).await.0
}

pub async fn token_for(app: &TestApp, email: &str) -> String {
    assert_eq!(register(app, email).await, StatusCode::CREATED);
    let body = json!({ "email": email, "password": PASSWORD });
    let (status, json) = send(app, Method::POST, "/login/", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().expect("token").to_string()
}

pub async fn create_system(app: &TestApp, token: &str, name: &str, location: &str) -> Value {
    let body = json!({ "name": name, "location": location });
    let (status, json) = send(app, Method::POST, "/systems/", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

pub async fn create_measurement(
    app: &TestApp,
    token: &str,
    system_id: i64,
    body: Value,
) -> (StatusCode, Value) {
    let uri = format!("/systems/{system_id}/measurements/");
    send(app, Method::POST, &uri, Some(token), Some(body)).await
}
