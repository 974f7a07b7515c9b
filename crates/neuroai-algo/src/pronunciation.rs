//! Transcript scoring
//!
//! Converts a speech-to-text transcript into a 0..=100 accuracy against the
//! word the learner was asked to say. Only the first word of the transcript
//! is considered.

const WORD_BREAKS: [char; 6] = ['.', '\n', ' ', '!', '?', ','];

const PARTIAL_MATCH_CAP: i64 = 90;
const FUZZY_MATCH_CAP: i64 = 95;
const FUZZY_FLOOR: f64 = 30.0;

fn first_word(transcript: &str) -> String {
    let trimmed = transcript.trim_start_matches(' ');
    let cut = trimmed
        .find(|c| WORD_BREAKS.contains(&c))
        .map(|idx| &trimmed[..idx])
        .unwrap_or(trimmed);
    cut.trim().to_lowercase()
}

pub fn score_transcript(expected: &str, transcript: &str) -> u32 {
    let received: Vec<char> = first_word(transcript).chars().collect();
    let expected: Vec<char> = expected.trim().to_lowercase().chars().collect();

    if received == expected {
        return 100;
    }
    if received.is_empty() || expected.is_empty() {
        return 0;
    }

    let len_diff = (expected.len() as i64 - received.len() as i64).abs();

    if contains(&expected, &received) || contains(&received, &expected) {
        let similarity = (100 - len_diff * 10).max(0);
        return similarity.min(PARTIAL_MATCH_CAP) as u32;
    }

    let max_len = expected.len().max(received.len());
    let matches = expected
        .iter()
        .zip(received.iter())
        .filter(|(a, b)| a == b)
        .count();

    let similarity = matches as f64 / max_len as f64 * 100.0 - (len_diff * 5) as f64;
    if similarity < FUZZY_FLOOR {
        return 0;
    }
    (similarity as i64).clamp(0, FUZZY_MATCH_CAP) as u32
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}
