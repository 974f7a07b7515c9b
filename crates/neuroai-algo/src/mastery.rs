//! Attempt recording and completion evaluation
//!
//! Lessons and letter tests share one rule: an accuracy sample is appended,
//! the average over every attempt is recomputed, and the item is mastered
//! once it has at least [`MIN_ATTEMPTS_FOR_MASTERY`] attempts with an
//! average at or above its threshold. Mastery is sticky until a reset.

use chrono::{DateTime, Utc};

use crate::types::{
    AlgoError, Attempt, LessonProgress, TestResult, MAX_ACCURACY, MIN_ACCURACY,
    MIN_ATTEMPTS_FOR_MASTERY, TEST_PASS_ACCURACY,
};

/// Round half up, matching the scoring clients (49.5 -> 50).
pub fn round_half_up(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor() as u32
}

pub fn validate_accuracy(accuracy: f64) -> Result<f64, AlgoError> {
    if !accuracy.is_finite() || !(MIN_ACCURACY..=MAX_ACCURACY).contains(&accuracy) {
        return Err(AlgoError::AccuracyOutOfRange(accuracy));
    }
    Ok(accuracy)
}

/// Rounded arithmetic mean over all attempts, 0 when empty.
pub fn average_accuracy(attempts: &[Attempt]) -> u32 {
    if attempts.is_empty() {
        return 0;
    }
    let total: f64 = attempts.iter().map(|attempt| attempt.accuracy).sum();
    round_half_up(total / attempts.len() as f64)
}

/// Completion evaluator.
pub fn is_mastered(attempt_count: usize, average_accuracy: u32, threshold: u32) -> bool {
    attempt_count >= MIN_ATTEMPTS_FOR_MASTERY && average_accuracy >= threshold
}

/// Attempt recorder: returns a new list with the sample appended.
pub fn append_attempt(
    attempts: &[Attempt],
    accuracy: f64,
    now: DateTime<Utc>,
) -> Result<Vec<Attempt>, AlgoError> {
    let accuracy = validate_accuracy(accuracy)?;
    let mut next = Vec::with_capacity(attempts.len() + 1);
    next.extend_from_slice(attempts);
    next.push(Attempt {
        attempt_number: attempts.len() as u32 + 1,
        accuracy,
        recorded_at: now,
    });
    Ok(next)
}

/// Shared outcome of recording one sample.
#[derive(Debug, Clone, PartialEq)]
struct Evaluated {
    attempts: Vec<Attempt>,
    average_accuracy: u32,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

fn evaluate(
    attempts: &[Attempt],
    was_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    accuracy: f64,
    threshold: u32,
    now: DateTime<Utc>,
) -> Result<Evaluated, AlgoError> {
    let attempts = append_attempt(attempts, accuracy, now)?;
    let average = average_accuracy(&attempts);

    let (completed, completed_at) = if is_mastered(attempts.len(), average, threshold) {
        (true, completed_at.or(Some(now)))
    } else {
        (was_completed, completed_at)
    };

    Ok(Evaluated {
        attempts,
        average_accuracy: average,
        completed,
        completed_at,
    })
}

impl LessonProgress {
    pub fn record_attempt(
        &self,
        accuracy: f64,
        min_accuracy: u32,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, AlgoError> {
        let evaluated = evaluate(
            &self.attempts,
            self.is_completed,
            self.completed_at,
            accuracy,
            min_accuracy,
            now,
        )?;

        Ok(LessonProgress {
            lesson_number: self.lesson_number,
            attempts: evaluated.attempts,
            average_accuracy: evaluated.average_accuracy,
            is_completed: evaluated.completed,
            completed_at: evaluated.completed_at,
        })
    }

    pub fn reset(&self) -> LessonProgress {
        LessonProgress::new(self.lesson_number)
    }
}

impl TestResult {
    pub fn record_attempt(
        &self,
        accuracy: f64,
        now: DateTime<Utc>,
    ) -> Result<TestResult, AlgoError> {
        let evaluated = evaluate(
            &self.attempts,
            self.completed,
            self.completed_at,
            accuracy,
            TEST_PASS_ACCURACY,
            now,
        )?;

        Ok(TestResult {
            attempts: evaluated.attempts,
            average_accuracy: evaluated.average_accuracy,
            completed: evaluated.completed,
            completed_at: evaluated.completed_at,
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn reset(&self, now: DateTime<Utc>) -> TestResult {
        TestResult {
            attempts: Vec::new(),
            average_accuracy: 0,
            completed: false,
            completed_at: None,
            updated_at: now,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn play(scores: &[f64], min_accuracy: u32) -> LessonProgress {
        let mut lesson = LessonProgress::new(1);
        for (i, score) in scores.iter().enumerate() {
            lesson = lesson
                .record_attempt(*score, min_accuracy, t0() + Duration::minutes(i as i64))
                .unwrap();
        }
        lesson
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(49.5), 50);
        assert_eq!(round_half_up(49.49), 49);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(100.0), 100);
    }

    #[test]
    fn test_three_attempts_above_threshold_completes() {
        let lesson = play(&[40.0, 60.0, 80.0], 50);
        assert_eq!(lesson.average_accuracy, 60);
        assert_eq!(lesson.attempts.len(), 3);
        assert!(lesson.is_completed);
        assert_eq!(lesson.completed_at, Some(t0() + Duration::minutes(2)));
    }

    #[test]
    fn test_two_attempts_never_complete() {
        let lesson = play(&[30.0, 30.0], 50);
        assert!(!lesson.is_completed);
        let lesson = play(&[100.0, 100.0], 50);
        assert!(!lesson.is_completed);
    }

    #[test]
    fn test_half_point_mean_rounds_up_to_pass() {
        // mean 49.5 -> 50
        let lesson = play(&[49.0, 50.0, 49.0, 50.0], 50);
        assert_eq!(lesson.average_accuracy, 50);
        assert!(lesson.is_completed);
    }

    #[test]
    fn test_attempt_numbers_are_contiguous() {
        let lesson = play(&[10.0, 20.0, 30.0, 40.0], 50);
        let numbers: Vec<u32> = lesson.attempts.iter().map(|a| a.attempt_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_completion_is_sticky() {
        let lesson = play(&[80.0, 80.0, 80.0], 50);
        let completed_at = lesson.completed_at;
        let lesson = lesson
            .record_attempt(0.0, 50, t0() + Duration::hours(1))
            .unwrap()
            .record_attempt(0.0, 50, t0() + Duration::hours(2))
            .unwrap();
        assert!(lesson.average_accuracy < 50);
        assert!(lesson.is_completed);
        assert_eq!(lesson.completed_at, completed_at);
    }

    #[test]
    fn test_completed_at_not_overwritten_when_still_passing() {
        let lesson = play(&[90.0, 90.0, 90.0, 90.0, 90.0], 50);
        assert_eq!(lesson.completed_at, Some(t0() + Duration::minutes(2)));
    }

    #[test]
    fn test_reset_clears_completion() {
        let lesson = play(&[90.0, 90.0, 90.0], 50).reset();
        assert!(lesson.attempts.is_empty());
        assert_eq!(lesson.average_accuracy, 0);
        assert!(!lesson.is_completed);
        assert!(lesson.completed_at.is_none());
    }

    #[test]
    fn test_out_of_range_accuracy_rejected() {
        let lesson = LessonProgress::new(1);
        assert_eq!(
            lesson.record_attempt(100.5, 50, t0()),
            Err(AlgoError::AccuracyOutOfRange(100.5))
        );
        assert!(lesson.record_attempt(-1.0, 50, t0()).is_err());
        assert!(lesson.record_attempt(f64::NAN, 50, t0()).is_err());
    }

    #[test]
    fn test_custom_threshold() {
        let lesson = play(&[70.0, 70.0, 70.0], 75);
        assert!(!lesson.is_completed);
    }

    #[test]
    fn test_test_result_uses_fixed_threshold() {
        let mut result = TestResult::new("t1", "u1", "s", "sunday", "sʌn.deɪ", t0());
        for score in [55.0, 45.0, 50.0] {
            result = result.record_attempt(score, t0()).unwrap();
        }
        assert_eq!(result.letter, "S");
        assert_eq!(result.average_accuracy, 50);
        assert!(result.completed);

        let reset = result.reset(t0() + Duration::days(1));
        assert!(!reset.completed);
        assert!(reset.completed_at.is_none());
        assert_eq!(reset.word, "sunday");
    }

    #[test]
    fn test_average_uses_every_attempt() {
        let lesson = play(&[100.0, 0.0, 50.0, 25.0], 50);
        // 175 / 4 = 43.75
        assert_eq!(lesson.average_accuracy, 44);
    }
}
