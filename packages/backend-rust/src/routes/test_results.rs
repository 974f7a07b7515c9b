use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use neuroai_algo::catalog::{practice_letters, practice_word, remedy_for};
use neuroai_algo::{normalize_letter, score_transcript};
use serde::{Deserialize, Serialize};

use crate::auth::authenticate;
use crate::response::{self, json_error, AppError};
use crate::routes::{parse_json, split_body};
use crate::services::phoneme_api::PhonemeApiError;
use crate::services::test_results::{self, NewAttempt, TestResultError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/letters", get(letters))
        .route("/word/:letter", get(word_for_letter))
        .route("/analyze", post(analyze))
        .route("/progress/:letter", get(progress))
        .route("/attempt", post(save_attempt))
        .route("/reset/:letter", delete(reset))
        .route("/all", get(all))
        .route("/statistics", get(statistics))
        .route("/recommendations", get(recommendations))
}

#[derive(Debug, Deserialize)]
struct AttemptRequest {
    letter: Option<String>,
    word: Option<String>,
    pronunciation: Option<String>,
    accuracy: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    letter: Option<String>,
    transcript: Option<String>,
    word: Option<String>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    letter: String,
    word: String,
    transcript: String,
    percentage: u32,
    remedy: Vec<String>,
}

async fn letters() -> Response {
    response::ok(practice_letters())
}

async fn word_for_letter(State(state): State<AppState>, Path(letter): Path<String>) -> Response {
    let letter = normalize_letter(&letter);

    if let Some(client) = state.phoneme_api() {
        return match client.practice_word(&letter).await {
            Ok(word) => response::ok(word),
            Err(PhonemeApiError::NotFound(_)) => unknown_letter(&letter),
            Err(err) => {
                tracing::warn!(error = %err, letter = %letter, "phoneme service lookup failed");
                json_error(
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Failed to fetch word for letter",
                )
                .into_response()
            }
        };
    }

    match practice_word(&letter) {
        Some(word) => response::ok(word),
        None => unknown_letter(&letter),
    }
}

async fn analyze(req: Request<Body>) -> Response {
    let (_, body_bytes) = match split_body(req).await {
        Ok(value) => value,
        Err(res) => return res,
    };

    let payload: AnalyzeRequest = match parse_json(&body_bytes) {
        Ok(value) => value,
        Err(res) => return res,
    };

    let (Some(letter), Some(transcript)) = (payload.letter, payload.transcript) else {
        return AppError::validation("Please provide letter and transcript").into_response();
    };

    let letter = normalize_letter(&letter);
    let word = match payload.word.filter(|w| !w.trim().is_empty()) {
        Some(word) => word.trim().to_string(),
        None => match practice_word(&letter) {
            Some(practice) => practice.word.to_string(),
            None => return unknown_letter(&letter),
        },
    };

    let percentage = score_transcript(&word, &transcript);
    let remedy = remedy_for(&letter, percentage);

    response::ok(AnalyzeResponse {
        letter,
        word,
        transcript,
        percentage,
        remedy,
    })
}

async fn progress(
    State(state): State<AppState>,
    Path(letter): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match test_results::get_progress(state.db().pool(), &user.id, &letter).await {
        Ok(progress) => response::ok(progress),
        Err(err) => handle_service_error(err),
    }
}

async fn save_attempt(State(state): State<AppState>, req: Request<Body>) -> Response {
    let (parts, body_bytes) = match split_body(req).await {
        Ok(value) => value,
        Err(res) => return res,
    };

    let user = match authenticate(&state, &parts.headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    let payload: AttemptRequest = match parse_json(&body_bytes) {
        Ok(value) => value,
        Err(res) => return res,
    };

    let (Some(letter), Some(word), Some(pronunciation), Some(accuracy)) = (
        payload.letter,
        payload.word,
        payload.pronunciation,
        payload.accuracy.as_ref().and_then(parse_accuracy),
    ) else {
        return AppError::validation("Please provide letter, word, pronunciation, and accuracy")
            .into_response();
    };

    let attempt = NewAttempt {
        letter,
        word,
        pronunciation,
        accuracy,
    };

    match test_results::save_attempt(state.db().pool(), &user.id, attempt).await {
        Ok(result) => response::created(result),
        Err(err) => handle_service_error(err),
    }
}

async fn reset(
    State(state): State<AppState>,
    Path(letter): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match test_results::reset(state.db().pool(), &user.id, &letter).await {
        Ok(result) => response::ok(result),
        Err(err) => handle_service_error(err),
    }
}

async fn all(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match test_results::list_all(state.db().pool(), &user.id).await {
        Ok(results) => response::list(results),
        Err(err) => handle_service_error(err),
    }
}

async fn statistics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match test_results::statistics(state.db().pool(), &user.id).await {
        Ok(stats) => response::ok(stats),
        Err(err) => handle_service_error(err),
    }
}

async fn recommendations(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match test_results::recommendations(state.db().pool(), &user.id).await {
        Ok(recs) => response::ok(recs),
        Err(err) => handle_service_error(err),
    }
}

/// Numbers pass through; numeric strings are accepted as well.
fn parse_accuracy(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn unknown_letter(letter: &str) -> Response {
    AppError::not_found(format!("No example found for letter {letter}")).into_response()
}

fn handle_service_error(err: TestResultError) -> Response {
    let app_err = match err {
        TestResultError::Validation(msg) => AppError::validation(msg),
        TestResultError::NotFound(msg) => AppError::not_found(msg),
        other @ (TestResultError::Sql(_)
        | TestResultError::Serde(_)
        | TestResultError::Courses(_)) => {
            AppError::internal(format!("test result service failed: {other}"))
        }
    };
    app_err.into_response()
}
