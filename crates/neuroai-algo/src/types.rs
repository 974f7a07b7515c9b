//! Common Types and Constants
//!
//! Value records shared by every rule module. All records serialize with the
//! camelCase field names the web and mobile clients already consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==================== Constants ====================

/// Default per-lesson accuracy bar
pub const DEFAULT_MIN_ACCURACY: u32 = 50;

/// Accuracy bar for the letter test drill
pub const TEST_PASS_ACCURACY: u32 = 50;

/// Attempts required before a lesson or test can count as mastered
pub const MIN_ATTEMPTS_FOR_MASTERY: usize = 3;

/// Default number of lessons in a course
pub const DEFAULT_TOTAL_LESSONS: u32 = 4;

pub const MIN_ACCURACY: f64 = 0.0;
pub const MAX_ACCURACY: f64 = 100.0;

// ==================== Errors ====================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgoError {
    #[error("accuracy must be between 0 and 100, got {0}")]
    AccuracyOutOfRange(f64),
    #[error("lesson {0} does not exist in this course")]
    UnknownLesson(u32),
    #[error("invalid course: {0}")]
    InvalidCourse(String),
}

// ==================== Course Types ====================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

fn default_min_accuracy() -> u32 {
    DEFAULT_MIN_ACCURACY
}

fn default_total_lessons() -> u32 {
    DEFAULT_TOTAL_LESSONS
}

fn default_true() -> bool {
    true
}

/// A single target word drill inside a course
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// 1-based, unique within the course
    pub lesson_number: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub word: String,
    pub pronunciation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    /// Average accuracy needed to complete the lesson
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: u32,
}

/// Course fields as supplied by a create call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub phoneme1: String,
    pub phoneme2: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_total_lessons")]
    pub total_lessons: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewCourse {
    /// Trims the phoneme pair and checks required fields and lesson numbering.
    pub fn validated(mut self) -> Result<Self, AlgoError> {
        self.phoneme1 = self.phoneme1.trim().to_string();
        self.phoneme2 = self.phoneme2.trim().to_string();

        if self.phoneme1.is_empty() {
            return Err(AlgoError::InvalidCourse("Please add phoneme1".to_string()));
        }
        if self.phoneme2.is_empty() {
            return Err(AlgoError::InvalidCourse("Please add phoneme2".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(AlgoError::InvalidCourse("title is required".to_string()));
        }
        validate_lessons(&self.lessons)?;

        Ok(self)
    }
}

pub(crate) fn validate_lessons(lessons: &[Lesson]) -> Result<(), AlgoError> {
    let mut seen = std::collections::HashSet::new();
    for lesson in lessons {
        if lesson.lesson_number == 0 {
            return Err(AlgoError::InvalidCourse(
                "lessonNumber must start at 1".to_string(),
            ));
        }
        if !seen.insert(lesson.lesson_number) {
            return Err(AlgoError::InvalidCourse(format!(
                "duplicate lessonNumber {}",
                lesson.lesson_number
            )));
        }
        if lesson.word.trim().is_empty() || lesson.pronunciation.trim().is_empty() {
            return Err(AlgoError::InvalidCourse(format!(
                "lesson {} needs a word and a pronunciation",
                lesson.lesson_number
            )));
        }
        if lesson.min_accuracy > 100 {
            return Err(AlgoError::InvalidCourse(format!(
                "lesson {} minAccuracy must be between 0 and 100",
                lesson.lesson_number
            )));
        }
    }
    Ok(())
}

/// A phoneme-pair course
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub phoneme1: String,
    pub phoneme2: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_lessons: u32,
    pub lessons: Vec<Lesson>,
    pub difficulty: Difficulty,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn from_new(id: impl Into<String>, new: NewCourse, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            phoneme1: new.phoneme1,
            phoneme2: new.phoneme2,
            title: new.title,
            description: new.description,
            total_lessons: new.total_lessons,
            lessons: new.lessons,
            difficulty: new.difficulty,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn lesson(&self, lesson_number: u32) -> Option<&Lesson> {
        self.lessons
            .iter()
            .find(|lesson| lesson.lesson_number == lesson_number)
    }
}

// ==================== Progress Types ====================

/// One scored pronunciation trial
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// 1-based and contiguous within its list
    pub attempt_number: u32,
    /// Accuracy in [0, 100]
    pub accuracy: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_number: u32,
    pub attempts: Vec<Attempt>,
    pub average_accuracy: u32,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl LessonProgress {
    pub fn new(lesson_number: u32) -> Self {
        Self {
            lesson_number,
            attempts: Vec::new(),
            average_accuracy: 0,
            is_completed: false,
            completed_at: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not-started",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

/// A learner's progress through one course
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    #[serde(rename = "course")]
    pub course_id: String,
    pub lessons_progress: Vec<LessonProgress>,
    pub total_lessons_completed: u32,
    pub overall_progress: u32,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub last_accessed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A learner's drill record for one letter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    /// Always upper-case
    pub letter: String,
    pub word: String,
    pub pronunciation: String,
    pub attempts: Vec<Attempt>,
    pub average_accuracy: u32,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestResult {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        letter: &str,
        word: impl Into<String>,
        pronunciation: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            letter: normalize_letter(letter),
            word: word.into(),
            pronunciation: pronunciation.into(),
            attempts: Vec::new(),
            average_accuracy: 0,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Letters are stored and compared upper-case.
pub fn normalize_letter(letter: &str) -> String {
    letter.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(number: u32) -> Lesson {
        Lesson {
            lesson_number: number,
            title: format!("Lesson {number}"),
            description: None,
            word: "bat".to_string(),
            pronunciation: "/bæt/".to_string(),
            image_link: None,
            min_accuracy: DEFAULT_MIN_ACCURACY,
        }
    }

    fn new_course() -> NewCourse {
        NewCourse {
            phoneme1: " V ".to_string(),
            phoneme2: "B".to_string(),
            title: "Phoneme V and B".to_string(),
            description: None,
            total_lessons: 2,
            lessons: vec![lesson(1), lesson(2)],
            difficulty: Difficulty::Beginner,
            is_active: true,
        }
    }

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!(Difficulty::parse("Intermediate"), Some(Difficulty::Intermediate));
        assert_eq!(Difficulty::parse("ADVANCED"), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::parse("expert"), None);
    }

    #[test]
    fn test_new_course_trims_phonemes() {
        let course = new_course().validated().unwrap();
        assert_eq!(course.phoneme1, "V");
    }

    #[test]
    fn test_new_course_rejects_duplicate_lesson_numbers() {
        let mut course = new_course();
        course.lessons = vec![lesson(1), lesson(1)];
        assert!(matches!(course.validated(), Err(AlgoError::InvalidCourse(_))));
    }

    #[test]
    fn test_new_course_rejects_blank_phoneme() {
        let mut course = new_course();
        course.phoneme2 = "   ".to_string();
        assert_eq!(
            course.validated(),
            Err(AlgoError::InvalidCourse("Please add phoneme2".to_string()))
        );
    }

    #[test]
    fn test_new_course_defaults_from_json() {
        let course: NewCourse = serde_json::from_str(
            r#"{"phoneme1":"L","phoneme2":"R","title":"Phoneme L and R"}"#,
        )
        .unwrap();
        assert_eq!(course.total_lessons, DEFAULT_TOTAL_LESSONS);
        assert_eq!(course.difficulty, Difficulty::Beginner);
        assert!(course.is_active);
        assert!(course.lessons.is_empty());
    }

    #[test]
    fn test_lesson_min_accuracy_defaults_to_50() {
        let lesson: Lesson = serde_json::from_str(
            r#"{"lessonNumber":1,"title":"Intro","word":"van","pronunciation":"/væn/"}"#,
        )
        .unwrap();
        assert_eq!(lesson.min_accuracy, 50);
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&ProgressStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not-started\"");
        assert_eq!(ProgressStatus::InProgress.as_str(), "in-progress");
    }

    #[test]
    fn test_course_id_serializes_as_underscore_id() {
        let course = Course::from_new("c1", new_course(), Utc::now());
        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(value["_id"], "c1");
        assert_eq!(value["totalLessons"], 2);
    }

    #[test]
    fn test_normalize_letter() {
        assert_eq!(normalize_letter(" sh "), "SH");
    }
}
