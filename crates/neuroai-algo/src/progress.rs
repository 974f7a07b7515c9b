//! Course progress aggregation
//!
//! `CourseProgress` carries derived fields (`totalLessonsCompleted`,
//! `overallProgress`, `status`) that are rebuilt from the lesson list on
//! every save instead of being updated incrementally.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{AlgoError, Course, CourseProgress, LessonProgress, ProgressStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub overall_progress: u32,
    pub status: ProgressStatus,
}

/// Integer percentage, 0 when `total` is 0.
pub fn completion_percent(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    crate::mastery::round_half_up(completed as f64 / total as f64 * 100.0)
}

pub fn derive_status(completed: u32, total: u32) -> ProgressStatus {
    if completed == 0 {
        ProgressStatus::NotStarted
    } else if completed == total {
        ProgressStatus::Completed
    } else {
        ProgressStatus::InProgress
    }
}

pub fn aggregate(lessons: &[LessonProgress]) -> ProgressSummary {
    let completed = lessons.iter().filter(|lesson| lesson.is_completed).count() as u32;
    let total = lessons.len() as u32;

    ProgressSummary {
        completed_lessons: completed,
        total_lessons: total,
        overall_progress: completion_percent(completed, total),
        status: derive_status(completed, total),
    }
}

impl CourseProgress {
    /// Fresh record with one empty `LessonProgress` per course lesson.
    pub fn start(
        id: impl Into<String>,
        user_id: impl Into<String>,
        course: &Course,
        now: DateTime<Utc>,
    ) -> Self {
        let lessons_progress = course
            .lessons
            .iter()
            .map(|lesson| LessonProgress::new(lesson.lesson_number))
            .collect();

        CourseProgress {
            id: id.into(),
            user_id: user_id.into(),
            course_id: course.id.clone(),
            lessons_progress,
            total_lessons_completed: 0,
            overall_progress: 0,
            status: ProgressStatus::NotStarted,
            started_at: None,
            completed_at: None,
            last_accessed_at: now,
            created_at: now,
            updated_at: now,
        }
        .refreshed(now)
    }

    /// Re-derives every computed field. Run before each save.
    pub fn refreshed(mut self, now: DateTime<Utc>) -> Self {
        let summary = aggregate(&self.lessons_progress);

        self.updated_at = now;
        self.last_accessed_at = now;
        self.total_lessons_completed = summary.completed_lessons;
        self.overall_progress = summary.overall_progress;
        self.status = summary.status;

        match summary.status {
            ProgressStatus::Completed => {
                self.completed_at.get_or_insert(now);
            }
            ProgressStatus::InProgress => {
                self.started_at.get_or_insert(now);
            }
            ProgressStatus::NotStarted => {}
        }

        self
    }

    pub fn lesson_progress(&self, lesson_number: u32) -> Option<&LessonProgress> {
        self.lessons_progress
            .iter()
            .find(|lesson| lesson.lesson_number == lesson_number)
    }

    /// Records a sample against `lesson_number`, creating its lesson entry if
    /// the record predates the lesson. Returns the refreshed record and the
    /// updated lesson entry.
    pub fn record_attempt(
        &self,
        course: &Course,
        lesson_number: u32,
        accuracy: f64,
        now: DateTime<Utc>,
    ) -> Result<(CourseProgress, LessonProgress), AlgoError> {
        let lesson = course
            .lesson(lesson_number)
            .ok_or(AlgoError::UnknownLesson(lesson_number))?;

        let mut next = self.clone();
        let position = match next
            .lessons_progress
            .iter()
            .position(|lp| lp.lesson_number == lesson_number)
        {
            Some(position) => position,
            None => {
                next.lessons_progress.push(LessonProgress::new(lesson_number));
                next.lessons_progress.len() - 1
            }
        };

        let updated = next.lessons_progress[position].record_attempt(
            accuracy,
            lesson.min_accuracy,
            now,
        )?;
        next.lessons_progress[position] = updated.clone();

        Ok((next.refreshed(now), updated))
    }

    /// Clears one lesson. `None` when the record has no entry for it.
    pub fn reset_lesson(&self, lesson_number: u32, now: DateTime<Utc>) -> Option<CourseProgress> {
        let position = self
            .lessons_progress
            .iter()
            .position(|lp| lp.lesson_number == lesson_number)?;

        let mut next = self.clone();
        next.lessons_progress[position] = next.lessons_progress[position].reset();
        Some(next.refreshed(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Lesson, NewCourse};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn course(lessons: u32) -> Course {
        let lessons = (1..=lessons)
            .map(|n| Lesson {
                lesson_number: n,
                title: format!("Lesson {n}"),
                description: None,
                word: "ball".to_string(),
                pronunciation: "/bɔːl/".to_string(),
                image_link: None,
                min_accuracy: 50,
            })
            .collect::<Vec<_>>();
        Course::from_new(
            "course-1",
            NewCourse {
                phoneme1: "V".to_string(),
                phoneme2: "B".to_string(),
                title: "Phoneme V and B".to_string(),
                description: None,
                total_lessons: lessons.len() as u32,
                lessons,
                difficulty: Difficulty::Beginner,
                is_active: true,
            },
            t0(),
        )
    }

    fn complete(
        progress: &CourseProgress,
        course: &Course,
        lesson: u32,
        at: DateTime<Utc>,
    ) -> CourseProgress {
        let mut progress = progress.clone();
        for _ in 0..3 {
            progress = progress.record_attempt(course, lesson, 90.0, at).unwrap().0;
        }
        progress
    }

    fn lesson_with(completed: bool) -> LessonProgress {
        LessonProgress {
            is_completed: completed,
            ..LessonProgress::new(1)
        }
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        let summary = aggregate(&[]);
        assert_eq!(summary.overall_progress, 0);
        assert_eq!(summary.status, ProgressStatus::NotStarted);
    }

    #[test]
    fn test_aggregate_half_complete() {
        let lessons = vec![
            lesson_with(true),
            lesson_with(true),
            lesson_with(false),
            lesson_with(false),
        ];
        let summary = aggregate(&lessons);
        assert_eq!(summary.overall_progress, 50);
        assert_eq!(summary.status, ProgressStatus::InProgress);
    }

    #[test]
    fn test_aggregate_rounds_percentage() {
        let lessons = vec![lesson_with(true), lesson_with(false), lesson_with(false)];
        assert_eq!(aggregate(&lessons).overall_progress, 33);
        let lessons = vec![lesson_with(true), lesson_with(true), lesson_with(false)];
        assert_eq!(aggregate(&lessons).overall_progress, 67);
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(derive_status(0, 4), ProgressStatus::NotStarted);
        assert_eq!(derive_status(1, 4), ProgressStatus::InProgress);
        assert_eq!(derive_status(4, 4), ProgressStatus::Completed);
    }

    #[test]
    fn test_start_mirrors_course_lessons() {
        let course = course(4);
        let progress = CourseProgress::start("p1", "u1", &course, t0());
        assert_eq!(progress.lessons_progress.len(), 4);
        assert_eq!(progress.course_id, "course-1");
        assert_eq!(progress.status, ProgressStatus::NotStarted);
        assert!(progress.started_at.is_none());
    }

    #[test]
    fn test_record_attempt_progresses_course() {
        let course = course(4);
        let progress = CourseProgress::start("p1", "u1", &course, t0());
        let progress = complete(&progress, &course, 1, t0() + Duration::minutes(1));
        let progress = complete(&progress, &course, 2, t0() + Duration::minutes(2));

        assert_eq!(progress.total_lessons_completed, 2);
        assert_eq!(progress.overall_progress, 50);
        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert_eq!(progress.started_at, Some(t0() + Duration::minutes(1)));
    }

    #[test]
    fn test_course_completed_at_is_stable() {
        let course = course(1);
        let progress = CourseProgress::start("p1", "u1", &course, t0());
        let finished_at = t0() + Duration::minutes(5);
        let progress = complete(&progress, &course, 1, finished_at);
        assert_eq!(progress.status, ProgressStatus::Completed);
        assert_eq!(progress.completed_at, Some(finished_at));

        let later = progress.refreshed(t0() + Duration::days(3));
        assert_eq!(later.completed_at, Some(finished_at));
        assert_eq!(later.overall_progress, 100);
    }

    #[test]
    fn test_unknown_lesson_rejected() {
        let course = course(2);
        let progress = CourseProgress::start("p1", "u1", &course, t0());
        assert_eq!(
            progress.record_attempt(&course, 9, 70.0, t0()).unwrap_err(),
            AlgoError::UnknownLesson(9)
        );
    }

    #[test]
    fn test_missing_lesson_entry_is_created() {
        let course = course(2);
        let mut progress = CourseProgress::start("p1", "u1", &course, t0());
        progress.lessons_progress.retain(|lp| lp.lesson_number != 2);

        let (progress, lesson) = progress.record_attempt(&course, 2, 70.0, t0()).unwrap();
        assert_eq!(lesson.attempts.len(), 1);
        assert_eq!(progress.lessons_progress.len(), 2);
    }

    #[test]
    fn test_reset_lesson_recomputes_status() {
        let course = course(2);
        let progress = CourseProgress::start("p1", "u1", &course, t0());
        let progress = complete(&progress, &course, 1, t0());
        assert_eq!(progress.status, ProgressStatus::InProgress);

        let reset = progress.reset_lesson(1, t0() + Duration::hours(1)).unwrap();
        assert_eq!(reset.status, ProgressStatus::NotStarted);
        assert_eq!(reset.overall_progress, 0);
        assert!(reset.lesson_progress(1).unwrap().attempts.is_empty());
        assert!(progress.reset_lesson(7, t0()).is_none());
    }
}
