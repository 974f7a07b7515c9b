use chrono::{DateTime, Duration, SecondsFormat, Utc};
use neuroai_algo::catalog::default_courses;
use neuroai_algo::{
    AlgoError, Course, CourseProgress, Difficulty, Lesson, LessonProgress, NewCourse,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl From<AlgoError> for CourseError {
    fn from(err: AlgoError) -> Self {
        match err {
            AlgoError::AccuracyOutOfRange(_) => {
                CourseError::Validation("Valid accuracy (0-100) is required".to_string())
            }
            AlgoError::UnknownLesson(_) => CourseError::NotFound("Lesson not found".to_string()),
            AlgoError::InvalidCourse(msg) => CourseError::Validation(msg),
        }
    }
}

/// A course, plus the caller's progress when the request was authenticated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    #[serde(flatten)]
    pub course: Course,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_progress: Option<Option<CourseProgress>>,
}

/// Partial course update; absent fields keep their stored value.
/// `description` tells an explicit `null` (clear it) apart from a missing key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub phoneme1: Option<String>,
    pub phoneme2: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    pub total_lessons: Option<u32>,
    pub lessons: Option<Vec<Lesson>>,
    pub difficulty: Option<Difficulty>,
    pub is_active: Option<bool>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Course>, CourseError> {
    let rows = sqlx::query(
        r#"SELECT "document" FROM "courses"
           WHERE "isActive" = 1
           ORDER BY "createdAt" ASC, "id" ASC"#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(decode_document).collect()
}

fn decode_document<T: DeserializeOwned>(row: &SqliteRow) -> Result<T, CourseError> {
    let doc: String = row.try_get("document")?;
    Ok(serde_json::from_str(&doc)?)
}

pub async fn get_course(
    pool: &SqlitePool,
    course_id: &str,
) -> Result<Option<Course>, CourseError> {
    let row = sqlx::query(r#"SELECT "document" FROM "courses" WHERE "id" = ?"#)
        .bind(course_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(decode_document).transpose()
}

async fn require_course(pool: &SqlitePool, course_id: &str) -> Result<Course, CourseError> {
    get_course(pool, course_id)
        .await?
        .ok_or_else(|| CourseError::NotFound("Course not found".to_string()))
}

async fn save_course(pool: &SqlitePool, course: &Course) -> Result<(), CourseError> {
    let doc = serde_json::to_string(course)?;
    sqlx::query(
        r#"INSERT INTO "courses" ("id", "isActive", "createdAt", "document")
           VALUES (?, ?, ?, ?)
           ON CONFLICT("id") DO UPDATE SET
             "isActive" = excluded."isActive",
             "createdAt" = excluded."createdAt",
             "document" = excluded."document""#,
    )
    .bind(&course.id)
    .bind(course.is_active)
    .bind(format_ts(course.created_at))
    .bind(doc)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn with_user_progress(
    pool: &SqlitePool,
    course: Course,
    user_id: Option<&str>,
) -> Result<CourseView, CourseError> {
    let user_progress = match user_id {
        Some(user_id) => Some(get_progress(pool, user_id, &course.id).await?),
        None => None,
    };
    Ok(CourseView { course, user_progress })
}

pub async fn create_course(pool: &SqlitePool, new: NewCourse) -> Result<Course, CourseError> {
    let new = new.validated()?;
    let course = Course::from_new(Uuid::new_v4().to_string(), new, Utc::now());
    save_course(pool, &course).await?;
    tracing::info!(course_id = %course.id, title = %course.title, "course created");
    Ok(course)
}

pub async fn update_course(
    pool: &SqlitePool,
    course_id: &str,
    update: CourseUpdate,
) -> Result<Course, CourseError> {
    let existing = require_course(pool, course_id).await?;

    let merged = NewCourse {
        phoneme1: update.phoneme1.unwrap_or(existing.phoneme1),
        phoneme2: update.phoneme2.unwrap_or(existing.phoneme2),
        title: update.title.unwrap_or(existing.title),
        description: match update.description {
            Some(description) => description,
            None => existing.description,
        },
        total_lessons: update.total_lessons.unwrap_or(existing.total_lessons),
        lessons: update.lessons.unwrap_or(existing.lessons),
        difficulty: update.difficulty.unwrap_or(existing.difficulty),
        is_active: update.is_active.unwrap_or(existing.is_active),
    }
    .validated()?;

    let mut course = Course::from_new(existing.id, merged, existing.created_at);
    course.updated_at = Utc::now();
    save_course(pool, &course).await?;
    Ok(course)
}

/// Removes the course and every progress record that points at it.
pub async fn delete_course(pool: &SqlitePool, course_id: &str) -> Result<(), CourseError> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query(r#"DELETE FROM "courses" WHERE "id" = ?"#)
        .bind(course_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(CourseError::NotFound("Course not found".to_string()));
    }

    let progress = sqlx::query(r#"DELETE FROM "course_progress" WHERE "courseId" = ?"#)
        .bind(course_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    tracing::info!(course_id, progress_records = progress, "course deleted");
    Ok(())
}

/// Seeds the built-in courses into an empty catalogue.
pub async fn initialize_defaults(pool: &SqlitePool) -> Result<Vec<Course>, CourseError> {
    let existing: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "courses""#)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Err(CourseError::Conflict("Courses already initialized".to_string()));
    }

    let now = Utc::now();
    let mut created = Vec::new();
    for (offset, new) in default_courses().into_iter().enumerate() {
        // distinct createdAt keeps the seed order when listing
        let created_at = now + Duration::milliseconds(offset as i64);
        let id = Uuid::new_v4().to_string();
        let course = Course::from_new(id, new.validated()?, created_at);
        save_course(pool, &course).await?;
        created.push(course);
    }

    tracing::info!(count = created.len(), "default courses initialized");
    Ok(created)
}

pub async fn get_progress(
    pool: &SqlitePool,
    user_id: &str,
    course_id: &str,
) -> Result<Option<CourseProgress>, CourseError> {
    let row = sqlx::query(
        r#"SELECT "document" FROM "course_progress" WHERE "userId" = ? AND "courseId" = ?"#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(decode_document).transpose()
}

async fn save_progress(pool: &SqlitePool, progress: &CourseProgress) -> Result<(), CourseError> {
    let doc = serde_json::to_string(progress)?;
    sqlx::query(
        r#"INSERT INTO "course_progress" ("id", "userId", "courseId", "lastAccessedAt", "document")
           VALUES (?, ?, ?, ?, ?)
           ON CONFLICT("userId", "courseId") DO UPDATE SET
             "lastAccessedAt" = excluded."lastAccessedAt",
             "document" = excluded."document""#,
    )
    .bind(&progress.id)
    .bind(&progress.user_id)
    .bind(&progress.course_id)
    .bind(format_ts(progress.last_accessed_at))
    .bind(doc)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_or_create_progress(
    pool: &SqlitePool,
    user_id: &str,
    course_id: &str,
) -> Result<CourseProgress, CourseError> {
    let course = require_course(pool, course_id).await?;

    if let Some(progress) = get_progress(pool, user_id, course_id).await? {
        return Ok(progress);
    }

    let id = Uuid::new_v4().to_string();
    let progress = CourseProgress::start(id, user_id, &course, Utc::now());
    save_progress(pool, &progress).await?;
    tracing::debug!(user_id, course_id, "course progress created");
    Ok(progress)
}

/// Every progress record of the user with its course embedded, most
/// recently accessed first. Records whose course is gone are skipped.
pub async fn list_user_progress(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<serde_json::Value>, CourseError> {
    let rows = sqlx::query(
        r#"SELECT "document" FROM "course_progress"
           WHERE "userId" = ?
           ORDER BY "lastAccessedAt" DESC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let progress: CourseProgress = decode_document(&row)?;
        let Some(course) = get_course(pool, &progress.course_id).await? else {
            continue;
        };

        let mut value = serde_json::to_value(&progress)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("course".to_string(), serde_json::to_value(&course)?);
        }
        out.push(value);
    }
    Ok(out)
}

pub async fn record_attempt(
    pool: &SqlitePool,
    user_id: &str,
    course_id: &str,
    lesson_number: u32,
    accuracy: f64,
) -> Result<(CourseProgress, LessonProgress), CourseError> {
    neuroai_algo::mastery::validate_accuracy(accuracy)?;
    let course = require_course(pool, course_id).await?;
    if course.lesson(lesson_number).is_none() {
        return Err(CourseError::NotFound("Lesson not found".to_string()));
    }

    let now = Utc::now();
    let progress = match get_progress(pool, user_id, course_id).await? {
        Some(progress) => progress,
        None => CourseProgress::start(Uuid::new_v4().to_string(), user_id, &course, now),
    };

    let (progress, lesson_progress) =
        progress.record_attempt(&course, lesson_number, accuracy, now)?;
    save_progress(pool, &progress).await?;

    tracing::debug!(
        user_id,
        course_id,
        lesson_number,
        average = lesson_progress.average_accuracy,
        completed = lesson_progress.is_completed,
        "lesson attempt recorded"
    );
    Ok((progress, lesson_progress))
}

/// Clears one lesson. Unknown lessons leave the record untouched.
pub async fn reset_lesson(
    pool: &SqlitePool,
    user_id: &str,
    course_id: &str,
    lesson_number: u32,
) -> Result<CourseProgress, CourseError> {
    let progress = get_progress(pool, user_id, course_id)
        .await?
        .ok_or_else(|| CourseError::NotFound("Progress not found".to_string()))?;

    match progress.reset_lesson(lesson_number, Utc::now()) {
        Some(next) => {
            save_progress(pool, &next).await?;
            Ok(next)
        }
        None => Ok(progress),
    }
}
