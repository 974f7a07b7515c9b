use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use neuroai_algo::{CourseProgress, LessonProgress, NewCourse};
use serde::{Deserialize, Serialize};

use crate::auth::{authenticate, maybe_authenticate};
use crate::response::{self, AppError, ListResponse};
use crate::routes::{parse_json, split_body};
use crate::services::courses::{self, CourseError, CourseUpdate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/initialize", get(initialize))
        .route("/user/progress", get(user_progress))
        .route("/:id", get(get_course).put(update_course).delete(delete_course))
        .route("/:id/progress", get(course_progress))
        .route("/:id/lessons/:lesson_number/attempt", post(record_attempt))
        .route("/:id/lessons/:lesson_number/reset", delete(reset_lesson))
}

#[derive(Debug, Deserialize)]
struct AttemptRequest {
    accuracy: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttemptResponse {
    success: bool,
    data: CourseProgress,
    lesson_progress: LessonProgress,
}

async fn initialize(State(state): State<AppState>) -> Response {
    match courses::initialize_defaults(state.db().pool()).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ListResponse {
                success: true,
                count: created.len(),
                data: created,
            }),
        )
            .into_response(),
        Err(err) => handle_service_error(err),
    }
}

async fn list_courses(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = maybe_authenticate(&state, &headers);
    let pool = state.db().pool();

    let active = match courses::list_active(pool).await {
        Ok(value) => value,
        Err(err) => return handle_service_error(err),
    };

    let mut views = Vec::with_capacity(active.len());
    for course in active {
        let user_id = user.as_ref().map(|u| u.id.as_str());
        match courses::with_user_progress(pool, course, user_id).await {
            Ok(view) => views.push(view),
            Err(err) => return handle_service_error(err),
        }
    }

    response::list(views)
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = maybe_authenticate(&state, &headers);
    let pool = state.db().pool();

    let course = match courses::get_course(pool, &id).await {
        Ok(Some(course)) => course,
        Ok(None) => return course_not_found(),
        Err(err) => return handle_service_error(err),
    };

    let user_id = user.as_ref().map(|u| u.id.as_str());
    match courses::with_user_progress(pool, course, user_id).await {
        Ok(view) => response::ok(view),
        Err(err) => handle_service_error(err),
    }
}

async fn user_progress(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match courses::list_user_progress(state.db().pool(), &user.id).await {
        Ok(records) => response::list(records),
        Err(err) => handle_service_error(err),
    }
}

async fn course_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    match courses::get_or_create_progress(state.db().pool(), &user.id, &id).await {
        Ok(progress) => response::ok(progress),
        Err(err) => handle_service_error(err),
    }
}

async fn record_attempt(
    State(state): State<AppState>,
    Path((id, lesson_number)): Path<(String, String)>,
    req: Request<Body>,
) -> Response {
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
    let Some(accuracy) = payload.accuracy else {
        return invalid_accuracy();
    };
    if !(0.0..=100.0).contains(&accuracy) {
        return invalid_accuracy();
    }

    let Some(lesson_number) = parse_lesson_number(&lesson_number) else {
        return AppError::not_found("Lesson not found").into_response();
    };

    let pool = state.db().pool();
    match courses::record_attempt(pool, &user.id, &id, lesson_number, accuracy).await {
        Ok((progress, lesson_progress)) => Json(AttemptResponse {
            success: true,
            data: progress,
            lesson_progress,
        })
        .into_response(),
        Err(err) => handle_service_error(err),
    }
}

async fn reset_lesson(
    State(state): State<AppState>,
    Path((id, lesson_number)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    let pool = state.db().pool();
    let result = match parse_lesson_number(&lesson_number) {
        Some(number) => courses::reset_lesson(pool, &user.id, &id, number).await,
        // no lesson can match, only the record's existence matters
        None => courses::get_progress(pool, &user.id, &id)
            .await
            .and_then(|progress| {
                progress.ok_or_else(|| CourseError::NotFound("Progress not found".to_string()))
            }),
    };

    match result {
        Ok(progress) => response::ok(progress),
        Err(err) => handle_service_error(err),
    }
}

async fn create_course(State(state): State<AppState>, req: Request<Body>) -> Response {
    let (parts, body_bytes) = match split_body(req).await {
        Ok(value) => value,
        Err(res) => return res,
    };

    if let Err(err) = authenticate(&state, &parts.headers) {
        return err.into_response();
    }

    let payload: NewCourse = match parse_json(&body_bytes) {
        Ok(value) => value,
        Err(res) => return res,
    };

    match courses::create_course(state.db().pool(), payload).await {
        Ok(course) => response::created(course),
        Err(err) => handle_service_error(err),
    }
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request<Body>,
) -> Response {
    let (parts, body_bytes) = match split_body(req).await {
        Ok(value) => value,
        Err(res) => return res,
    };

    if let Err(err) = authenticate(&state, &parts.headers) {
        return err.into_response();
    }

    let payload: CourseUpdate = match parse_json(&body_bytes) {
        Ok(value) => value,
        Err(res) => return res,
    };

    match courses::update_course(state.db().pool(), &id, payload).await {
        Ok(course) => response::ok(course),
        Err(err) => handle_service_error(err),
    }
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(err) = authenticate(&state, &headers) {
        return err.into_response();
    }

    match courses::delete_course(state.db().pool(), &id).await {
        Ok(()) => response::ok(serde_json::json!({})),
        Err(err) => handle_service_error(err),
    }
}

fn parse_lesson_number(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

fn invalid_accuracy() -> Response {
    AppError::validation("Valid accuracy (0-100) is required").into_response()
}

fn course_not_found() -> Response {
    AppError::not_found("Course not found").into_response()
}

fn handle_service_error(err: CourseError) -> Response {
    let app_err = match err {
        CourseError::Validation(msg) => AppError::validation(msg),
        CourseError::NotFound(msg) => AppError::not_found(msg),
        CourseError::Conflict(msg) => AppError::bad_request(msg),
        other @ (CourseError::Sql(_) | CourseError::Serde(_)) => {
            AppError::internal(format!("course service failed: {other}"))
        }
    };
    app_err.into_response()
}
