use chrono::Utc;
use neuroai_algo::{
    build_recommendations, normalize_letter, summarize, AlgoError, Attempt, Recommendations,
    TestResult, TestStatistics,
};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::services::courses::{self, CourseError};

#[derive(Debug, thiserror::Error)]
pub enum TestResultError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Courses(#[from] CourseError),
}

impl From<AlgoError> for TestResultError {
    fn from(err: AlgoError) -> Self {
        TestResultError::Validation(match err {
            AlgoError::AccuracyOutOfRange(_) => "Valid accuracy (0-100) is required".to_string(),
            other => other.to_string(),
        })
    }
}

/// Shape returned for a letter the user has never drilled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyTestProgress {
    pub letter: String,
    pub attempts: Vec<Attempt>,
    pub average_accuracy: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TestProgress {
    Recorded(TestResult),
    Empty(EmptyTestProgress),
}

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub letter: String,
    pub word: String,
    pub pronunciation: String,
    pub accuracy: f64,
}

fn decode_document(row: &SqliteRow) -> Result<TestResult, TestResultError> {
    let doc: String = row.try_get("document")?;
    Ok(serde_json::from_str(&doc)?)
}

pub async fn get_result(
    pool: &SqlitePool,
    user_id: &str,
    letter: &str,
) -> Result<Option<TestResult>, TestResultError> {
    let row = sqlx::query(
        r#"SELECT "document" FROM "test_results" WHERE "userId" = ? AND "letter" = ?"#,
    )
    .bind(user_id)
    .bind(normalize_letter(letter))
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(decode_document).transpose()
}

pub async fn get_progress(
    pool: &SqlitePool,
    user_id: &str,
    letter: &str,
) -> Result<TestProgress, TestResultError> {
    Ok(match get_result(pool, user_id, letter).await? {
        Some(result) => TestProgress::Recorded(result),
        None => TestProgress::Empty(EmptyTestProgress {
            letter: normalize_letter(letter),
            attempts: Vec::new(),
            average_accuracy: 0,
            completed: false,
        }),
    })
}

async fn save_result(pool: &SqlitePool, result: &TestResult) -> Result<(), TestResultError> {
    let doc = serde_json::to_string(result)?;
    sqlx::query(
        r#"INSERT INTO "test_results" ("id", "userId", "letter", "document")
           VALUES (?, ?, ?, ?)
           ON CONFLICT("userId", "letter") DO UPDATE SET "document" = excluded."document""#,
    )
    .bind(&result.id)
    .bind(&result.user_id)
    .bind(&result.letter)
    .bind(doc)
    .execute(pool)
    .await?;
    Ok(())
}

/// Appends an attempt to the user's record for the letter, creating it on
/// first use. The stored word and pronunciation are those of the first call.
pub async fn save_attempt(
    pool: &SqlitePool,
    user_id: &str,
    attempt: NewAttempt,
) -> Result<TestResult, TestResultError> {
    if attempt.letter.trim().is_empty()
        || attempt.word.trim().is_empty()
        || attempt.pronunciation.trim().is_empty()
    {
        return Err(TestResultError::Validation(
            "Please provide letter, word, pronunciation, and accuracy".to_string(),
        ));
    }
    neuroai_algo::mastery::validate_accuracy(attempt.accuracy)?;

    let now = Utc::now();
    let existing = match get_result(pool, user_id, &attempt.letter).await? {
        Some(result) => result,
        None => TestResult::new(
            Uuid::new_v4().to_string(),
            user_id,
            &attempt.letter,
            attempt.word.trim(),
            attempt.pronunciation.trim(),
            now,
        ),
    };

    let result = existing.record_attempt(attempt.accuracy, now)?;
    save_result(pool, &result).await?;

    tracing::debug!(
        user_id,
        letter = %result.letter,
        average = result.average_accuracy,
        completed = result.completed,
        "letter attempt recorded"
    );
    Ok(result)
}

pub async fn reset(
    pool: &SqlitePool,
    user_id: &str,
    letter: &str,
) -> Result<TestResult, TestResultError> {
    let existing = get_result(pool, user_id, letter)
        .await?
        .ok_or_else(|| TestResultError::NotFound("No test found for this letter".to_string()))?;

    let result = existing.reset(Utc::now());
    save_result(pool, &result).await?;
    Ok(result)
}

pub async fn list_all(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<TestResult>, TestResultError> {
    let rows = sqlx::query(
        r#"SELECT "document" FROM "test_results" WHERE "userId" = ? ORDER BY "letter" ASC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(decode_document).collect()
}

pub async fn statistics(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<TestStatistics, TestResultError> {
    let results = list_all(pool, user_id).await?;
    Ok(summarize(&results))
}

pub async fn recommendations(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Recommendations, TestResultError> {
    let results = list_all(pool, user_id).await?;
    let active = courses::list_active(pool).await?;
    Ok(build_recommendations(&results, &active))
}
