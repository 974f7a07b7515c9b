//! Course recommendations from letter test results
//!
//! Weak letters (tested, average below [`WEAK_ACCURACY`]) are matched against
//! the active course catalog and each matching course gets an additive score.
//! Everything here is deterministic: ties keep catalog order.

use std::collections::HashMap;

use serde::Serialize;

use crate::mastery::round_half_up;
use crate::types::{Attempt, Course, Difficulty, TestResult};

pub const WEAK_ACCURACY: u32 = 70;
pub const STRENGTH_ACCURACY: u32 = 80;
pub const MAX_WEAK_AREAS: usize = 5;
pub const MAX_RECOMMENDED_COURSES: usize = 6;
pub const MAX_HIGHLIGHTS: usize = 3;

const BASE_SCORE: u32 = 50;
const PHONEME_MATCH_BONUS: u32 = 30;
const BEGINNER_BONUS: u32 = 20;
const INTERMEDIATE_BONUS: u32 = 15;
const REPEAT_MATCH_BONUS: u32 = 10;

const TREND_WINDOW: usize = 3;
const TREND_DELTA: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    InsufficientData,
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementArea {
    pub letter: String,
    pub word: String,
    pub current_accuracy: u32,
    pub attempts: usize,
    pub trend: Trend,
    pub priority: Priority,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCourse {
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub phoneme1: String,
    pub phoneme2: String,
    pub difficulty: Difficulty,
    pub total_lessons: u32,
    pub relevant_letters: Vec<String>,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthArea {
    pub letter: String,
    pub word: String,
    pub accuracy: u32,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovingArea {
    pub letter: String,
    pub word: String,
    pub improvement: f64,
    pub current_accuracy: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub key_areas_for_improvement: Vec<ImprovementArea>,
    pub recommended_courses: Vec<RecommendedCourse>,
    pub overall_progress: u32,
    pub strength_areas: Vec<StrengthArea>,
    pub improving_areas: Vec<ImprovingArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Recommendations {
    fn empty(message: &str) -> Self {
        Self {
            key_areas_for_improvement: Vec::new(),
            recommended_courses: Vec::new(),
            overall_progress: 0,
            strength_areas: Vec::new(),
            improving_areas: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

/// Direction over the last [`TREND_WINDOW`] attempts.
pub fn classify_trend(attempts: &[Attempt]) -> Trend {
    if attempts.len() < 2 {
        return Trend::InsufficientData;
    }
    let window = &attempts[attempts.len().saturating_sub(TREND_WINDOW)..];
    let delta = window[window.len() - 1].accuracy - window[0].accuracy;

    if delta > TREND_DELTA {
        Trend::Improving
    } else if delta < -TREND_DELTA {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

pub fn priority_for(accuracy: u32, attempts: usize) -> Priority {
    if accuracy < 50 {
        Priority::High
    } else if accuracy < 60 || attempts < 3 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn recommendation_text(letter: &str, accuracy: u32) -> String {
    if accuracy < 30 {
        format!(
            "Start with the basics of the '{letter}' sound: watch the mouth position \
             and practise slowly with a beginner course."
        )
    } else if accuracy < 50 {
        format!(
            "Keep drilling '{letter}' in short daily sessions; focus on the lesson words \
             until each attempt feels consistent."
        )
    } else {
        format!(
            "You are close on '{letter}'. A few more focused attempts should push you \
             past {WEAK_ACCURACY}%."
        )
    }
}

fn contains_letter(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Initial score for a course matched by a weak letter.
pub fn score_course(course: &Course, letter: &str, accuracy: u32) -> u32 {
    let needle = letter.to_lowercase();
    let mut score = BASE_SCORE;

    if contains_letter(&course.phoneme1, &needle) {
        score += PHONEME_MATCH_BONUS;
    }
    if contains_letter(&course.phoneme2, &needle) {
        score += PHONEME_MATCH_BONUS;
    }
    if accuracy < 50 && course.difficulty == Difficulty::Beginner {
        score += BEGINNER_BONUS;
    }
    if (50..WEAK_ACCURACY).contains(&accuracy) && course.difficulty == Difficulty::Intermediate {
        score += INTERMEDIATE_BONUS;
    }

    score
}

fn course_matches(course: &Course, letter: &str) -> bool {
    let needle = letter.to_lowercase();
    contains_letter(&course.phoneme1, &needle)
        || contains_letter(&course.phoneme2, &needle)
        || contains_letter(&course.title, &needle)
}

fn weak_results(results: &[TestResult]) -> Vec<&TestResult> {
    let mut weak: Vec<&TestResult> = results
        .iter()
        .filter(|r| !r.attempts.is_empty() && r.average_accuracy < WEAK_ACCURACY)
        .collect();
    weak.sort_by_key(|r| r.average_accuracy);
    weak.truncate(MAX_WEAK_AREAS);
    weak
}

/// Scores courses for the given weak results. A course reached again through
/// a later letter gains a flat [`REPEAT_MATCH_BONUS`] rather than a rescore.
pub fn rank_courses(weak: &[&TestResult], courses: &[Course]) -> Vec<RecommendedCourse> {
    let mut ranked: Vec<RecommendedCourse> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for result in weak {
        for course in courses.iter().filter(|c| course_matches(c, &result.letter)) {
            match index.get(course.id.as_str()) {
                Some(&at) => {
                    let entry = &mut ranked[at];
                    entry.score += REPEAT_MATCH_BONUS;
                    if !entry.relevant_letters.contains(&result.letter) {
                        entry.relevant_letters.push(result.letter.clone());
                    }
                }
                None => {
                    index.insert(course.id.as_str(), ranked.len());
                    ranked.push(RecommendedCourse {
                        course_id: course.id.clone(),
                        title: course.title.clone(),
                        description: course.description.clone(),
                        phoneme1: course.phoneme1.clone(),
                        phoneme2: course.phoneme2.clone(),
                        difficulty: course.difficulty,
                        total_lessons: course.total_lessons,
                        relevant_letters: vec![result.letter.clone()],
                        score: score_course(course, &result.letter, result.average_accuracy),
                    });
                }
            }
        }
    }

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(MAX_RECOMMENDED_COURSES);
    ranked
}

fn strength_areas(results: &[TestResult]) -> Vec<StrengthArea> {
    let mut strong: Vec<&TestResult> = results
        .iter()
        .filter(|r| !r.attempts.is_empty() && r.average_accuracy >= STRENGTH_ACCURACY)
        .collect();
    strong.sort_by(|a, b| b.average_accuracy.cmp(&a.average_accuracy));

    strong
        .into_iter()
        .take(MAX_HIGHLIGHTS)
        .map(|r| StrengthArea {
            letter: r.letter.clone(),
            word: r.word.clone(),
            accuracy: r.average_accuracy,
            attempts: r.attempts.len(),
        })
        .collect()
}

fn improving_areas(results: &[TestResult]) -> Vec<ImprovingArea> {
    let mut improving: Vec<ImprovingArea> = results
        .iter()
        .filter_map(|r| {
            let [.., previous, last] = r.attempts.as_slice() else {
                return None;
            };
            let improvement = last.accuracy - previous.accuracy;
            (improvement > 0.0).then(|| ImprovingArea {
                letter: r.letter.clone(),
                word: r.word.clone(),
                improvement,
                current_accuracy: r.average_accuracy,
            })
        })
        .collect();

    improving.sort_by(|a, b| b.improvement.total_cmp(&a.improvement));
    improving.truncate(MAX_HIGHLIGHTS);
    improving
}

/// Mean of every result's average, weak or not.
pub fn overall_progress(results: &[TestResult]) -> u32 {
    if results.is_empty() {
        return 0;
    }
    let total: u32 = results.iter().map(|r| r.average_accuracy).sum();
    round_half_up(total as f64 / results.len() as f64)
}

pub fn build_recommendations(results: &[TestResult], courses: &[Course]) -> Recommendations {
    if results.is_empty() {
        return Recommendations::empty(
            "Take a few letter tests to get personalised recommendations.",
        );
    }

    let weak = weak_results(results);
    let key_areas = weak
        .iter()
        .map(|r| ImprovementArea {
            letter: r.letter.clone(),
            word: r.word.clone(),
            current_accuracy: r.average_accuracy,
            attempts: r.attempts.len(),
            trend: classify_trend(&r.attempts),
            priority: priority_for(r.average_accuracy, r.attempts.len()),
            recommendation: recommendation_text(&r.letter, r.average_accuracy),
        })
        .collect();

    let active: Vec<Course> = courses.iter().filter(|c| c.is_active).cloned().collect();

    Recommendations {
        key_areas_for_improvement: key_areas,
        recommended_courses: rank_courses(&weak, &active),
        overall_progress: overall_progress(results),
        strength_areas: strength_areas(results),
        improving_areas: improving_areas(results),
        message: None,
    }
}
