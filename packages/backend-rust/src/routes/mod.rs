mod courses;
mod health;
mod test_results;

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::response::{json_error, AppError};
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .nest("/api/courses", courses::router())
        .nest("/api/test", test_results::router())
        .fallback(fallback_handler)
        .with_state(state)
}

#[derive(Serialize)]
struct Banner {
    message: &'static str,
    status: &'static str,
}

async fn root() -> Response {
    Json(Banner {
        message: "NeuroAI API Server",
        status: "running",
    })
    .into_response()
}

async fn fallback_handler() -> Response {
    AppError::not_found("Route not found").into_response()
}

async fn split_body(req: Request<Body>) -> Result<(Parts, Bytes), Response> {
    let (parts, body) = req.into_parts();
    match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => Ok((parts, bytes)),
        Err(_) => Err(json_error(
            StatusCode::BAD_REQUEST,
            "BODY_TOO_LARGE",
            "Request body too large",
        )
        .into_response()),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(bytes: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(bytes).map_err(|err| {
        tracing::debug!(error = %err, "rejected request body");
        AppError::validation("Invalid request body").into_response()
    })
}
