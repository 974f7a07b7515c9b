//! Built-in practice content
//!
//! The letter drill words, articulation tips and the default phoneme-pair
//! courses used to seed an empty database.

use serde::Serialize;

use crate::types::{normalize_letter, Difficulty, Lesson, NewCourse, DEFAULT_MIN_ACCURACY};

/// Average at or below which articulation tips are shown
pub const REMEDY_ACCURACY: u32 = 50;

const FALLBACK_REMEDY: &str = "Practice the pronunciation more carefully.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PracticeWord {
    pub letter: String,
    #[serde(rename = "word1")]
    pub word: &'static str,
    pub pronunciation: &'static str,
    pub image_link: &'static str,
}

// letter, word, IPA, image
const PRACTICE_WORDS: [(&str, &str, &str, &str); 8] = [
    ("S", "sunday", "sʌn.deɪ", "https://cdn-icons-png.flaticon.com/512/1995/1995471.png"),
    ("F", "free", "friː", "https://cdn-icons-png.flaticon.com/512/2917/2917995.png"),
    ("L", "love", "lʌv", "https://cdn-icons-png.flaticon.com/512/1077/1077035.png"),
    (
        "B",
        "boat",
        "boʊt",
        "https://upload.wikimedia.org/wikipedia/commons/thumb/d/d3/Soccerball.svg/500px-Soccerball.svg.png",
    ),
    ("P", "pen", "pen", "https://cdn-icons-png.flaticon.com/512/2541/2541979.png"),
    ("T", "tree", "triː", "https://cdn-icons-png.flaticon.com/512/628/628283.png"),
    (
        "A",
        "apple",
        "ˈæp.əl",
        "https://png.pngtree.com/png-vector/20231017/ourmid/pngtree-fresh-apple-fruit-red-png-image_10203073.png",
    ),
    ("Z", "zebra", "ˈziː.brə", "https://pngimg.com/uploads/zebra/zebra_PNG95977.png"),
];

const FRONT_RIDGE: &str =
    "The ridge right behind your two front teeth is involved. The front of your tongue is used.";
const FRONT_ROOF: &str =
    "The front-roof of your mouth is the right spot for the sound. The front of your tongue is used.";
const BACK_ROOF: &str =
    "The back-roof of your mouth is the right spot for the sound. The back of your tongue is used.";
const LIP_TEETH: &str =
    "Place your bottom lip against your upper front teeth. Top teeth may be on your bottom lip.";
const VOICELESS: &str = "Vocal cords don’t vibrate for voiceless sounds.";

fn remedy_lines(sound: &str) -> Option<Vec<String>> {
    let lines = match sound {
        "P" => vec![format!("Put your lips together to make the sound. {VOICELESS}")],
        "B" => vec!["Put your lips together to make the sound.".to_string()],
        "M" => vec![
            "Put your lips together to make the sound. Air flows through your nose.".to_string(),
        ],
        "W" => vec![
            "Put your lips together and shape your mouth like you are saying \"oo\".".to_string(),
        ],
        "F" | "V" => vec![LIP_TEETH.to_string()],
        "S" => vec![format!(
            "Keep your teeth close together to make the sound. {FRONT_RIDGE} {VOICELESS}"
        )],
        "Z" => vec![format!("Keep your teeth close together to make the sound. {FRONT_RIDGE}")],
        "TH" => vec![
            concat!(
                "Place your top teeth on your bottom lip and let your tongue go between ",
                "your teeth for the sound (as in thin). The front of your tongue is involved.",
            )
            .to_string(),
        ],
        "NG" => vec!["Air flows through your nose.".to_string()],
        "L" | "D" => vec![FRONT_RIDGE.to_string()],
        "T" => vec![format!("{FRONT_RIDGE} {VOICELESS}")],
        "CH" | "J" | "SH" | "ZH" => vec![FRONT_ROOF.to_string()],
        "K" => vec![format!("{BACK_ROOF} {VOICELESS}")],
        "G" | "R" => vec![BACK_ROOF.to_string()],
        "Y" => vec!["The front of your tongue is used.".to_string()],
        "H" => vec![
            "Your lungs provide the airflow for every sound, especially this one.".to_string(),
        ],
        "A" => vec![
            r#"Open your mouth wide with your tongue flat at the bottom, as in "apple"."#
                .to_string(),
            r#"Open your mouth wide and pull your tongue back slightly, as in "father"."#
                .to_string(),
        ],
        _ => return None,
    };
    Some(lines)
}

pub fn practice_letters() -> Vec<&'static str> {
    PRACTICE_WORDS.iter().map(|(letter, ..)| *letter).collect()
}

pub fn practice_word(letter: &str) -> Option<PracticeWord> {
    let letter = normalize_letter(letter);
    PRACTICE_WORDS
        .iter()
        .find(|(l, ..)| *l == letter)
        .map(|&(l, word, pronunciation, image_link)| PracticeWord {
            letter: l.to_string(),
            word,
            pronunciation,
            image_link,
        })
}

/// Articulation tips for a sound, empty when the learner is above
/// [`REMEDY_ACCURACY`].
pub fn remedy_for(sound: &str, average_accuracy: u32) -> Vec<String> {
    if average_accuracy > REMEDY_ACCURACY {
        return Vec::new();
    }
    remedy_lines(&normalize_letter(sound)).unwrap_or_else(|| vec![FALLBACK_REMEDY.to_string()])
}

fn lesson(number: u32, title: &str, description: &str, word: &str, pronunciation: &str) -> Lesson {
    Lesson {
        lesson_number: number,
        title: title.to_string(),
        description: Some(description.to_string()),
        word: word.to_string(),
        pronunciation: pronunciation.to_string(),
        image_link: None,
        min_accuracy: DEFAULT_MIN_ACCURACY,
    }
}

fn pair_course(p1: &str, p2: &str, words: [(&str, &str); 4]) -> NewCourse {
    // lesson 2 drills the second sound, lesson 3 the first
    let [(w1, i1), (w2, i2), (w3, i3), (w4, i4)] = words;
    NewCourse {
        phoneme1: p1.to_string(),
        phoneme2: p2.to_string(),
        title: format!("Phoneme {p1} and {p2}"),
        description: Some(format!(
            "Learn to differentiate and pronounce {p1} and {p2} sounds"
        )),
        total_lessons: 4,
        lessons: vec![
            lesson(
                1,
                &format!("Introduction to {p1} and {p2}"),
                &format!("Basic pronunciation of {p1} and {p2}"),
                w1,
                i1,
            ),
            lesson(2, &format!("{p2} Sound Practice"), &format!("Practice {p2} sound"), w2, i2),
            lesson(3, &format!("{p1} Sound Practice"), &format!("Practice {p1} sound"), w3, i3),
            lesson(
                4,
                "Advanced Practice",
                &format!("Advanced {p1} and {p2} differentiation"),
                w4,
                i4,
            ),
        ],
        difficulty: Difficulty::Beginner,
        is_active: true,
    }
}

/// The six starter courses.
pub fn default_courses() -> Vec<NewCourse> {
    vec![
        pair_course(
            "V",
            "B",
            [("bat", "/bæt/"), ("van", "/væn/"), ("ball", "/bɔːl/"), ("vote", "/voʊt/")],
        ),
        pair_course(
            "P",
            "F",
            [("pen", "/pen/"), ("fun", "/fʌn/"), ("pot", "/pɒt/"), ("phone", "/foʊn/")],
        ),
        pair_course(
            "T",
            "D",
            [("top", "/tɒp/"), ("dog", "/dɒɡ/"), ("tea", "/tiː/"), ("done", "/dʌn/")],
        ),
        pair_course(
            "S",
            "Sh",
            [("sun", "/sʌn/"), ("ship", "/ʃɪp/"), ("see", "/siː/"), ("shoe", "/ʃuː/")],
        ),
        pair_course(
            "F",
            "Th",
            [("fan", "/fæn/"), ("think", "/θɪŋk/"), ("fish", "/fɪʃ/"), ("thank", "/θæŋk/")],
        ),
        pair_course(
            "L",
            "R",
            [("light", "/laɪt/"), ("run", "/rʌn/"), ("love", "/lʌv/"), ("right", "/raɪt/")],
        ),
    ]
}
