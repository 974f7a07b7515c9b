//! Letter test statistics

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::TestResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterScore {
    pub letter: String,
    pub accuracy: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterProgress {
    pub attempts: usize,
    pub average_accuracy: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStatistics {
    pub total_tests: usize,
    pub completed_tests: usize,
    pub in_progress_tests: usize,
    pub total_attempts: usize,
    /// Mean of per-letter averages, two decimals
    pub average_overall_accuracy: f64,
    pub best_letter: Option<LetterScore>,
    pub worst_letter: Option<LetterScore>,
    pub letter_progress: BTreeMap<String, LetterProgress>,
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn summarize(results: &[TestResult]) -> TestStatistics {
    let mut stats = TestStatistics {
        total_tests: results.len(),
        completed_tests: results.iter().filter(|r| r.completed).count(),
        in_progress_tests: results
            .iter()
            .filter(|r| !r.completed && !r.attempts.is_empty())
            .count(),
        total_attempts: results.iter().map(|r| r.attempts.len()).sum(),
        average_overall_accuracy: 0.0,
        best_letter: None,
        worst_letter: None,
        letter_progress: BTreeMap::new(),
    };

    if results.is_empty() {
        return stats;
    }

    let total: u32 = results.iter().map(|r| r.average_accuracy).sum();
    stats.average_overall_accuracy = round_to_hundredths(total as f64 / results.len() as f64);

    let mut by_accuracy: Vec<&TestResult> = results.iter().collect();
    by_accuracy.sort_by(|a, b| b.average_accuracy.cmp(&a.average_accuracy));

    // best only counts when the top entry was actually attempted
    stats.best_letter = by_accuracy
        .first()
        .filter(|r| !r.attempts.is_empty())
        .map(|r| LetterScore {
            letter: r.letter.clone(),
            accuracy: r.average_accuracy,
        });

    stats.worst_letter = by_accuracy
        .iter()
        .filter(|r| !r.attempts.is_empty())
        .last()
        .map(|r| LetterScore {
            letter: r.letter.clone(),
            accuracy: r.average_accuracy,
        });

    stats.letter_progress = results
        .iter()
        .map(|r| {
            (
                r.letter.clone(),
                LetterProgress {
                    attempts: r.attempts.len(),
                    average_accuracy: r.average_accuracy,
                    completed: r.completed,
                },
            )
        })
        .collect();

    stats
}
