#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use neuroai_backend::auth::sign_jwt_for_user;
use neuroai_backend::config::Config;

pub const TEST_SECRET: &str = "integration-test-secret";

pub async fn create_test_app() -> Router {
    create_test_app_with(Config::in_memory(TEST_SECRET)).await
}

pub async fn create_test_app_with(config: Config) -> Router {
    neuroai_backend::create_app(config)
        .await
        .expect("in-memory database")
}

pub fn token_for(user_id: &str) -> String {
    sign_jwt_for_user(user_id, TEST_SECRET, "1h").expect("sign token")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, None)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    request("DELETE", uri, token, None)
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request("POST", uri, token, Some(body))
}

pub fn put_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request("PUT", uri, token, Some(body))
}

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Seeds the default catalogue and returns the first course's id.
pub async fn seed_courses(app: &Router) -> String {
    let response = send(app, get("/api/courses/initialize", None)).await;
    let body = json_body(response).await;
    body["data"][0]["_id"].as_str().unwrap().to_string()
}
