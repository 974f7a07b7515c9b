//! # neuroai-algo - speech therapy progress rules
//!
//! Pure Rust rules behind the NeuroAI learning backend. Nothing here touches
//! a database or the network: every function takes value records (and the
//! current time where a timestamp is needed) and returns new records.
//!
//! ## Module structure
//!
//! - [`mastery`] - attempt recording, rolling average, completion
//! - [`progress`] - per-course completion percentage and status
//! - [`recommend`] - weak-letter course recommendations
//! - [`statistics`] - letter test statistics
//! - [`pronunciation`] - transcript to accuracy scoring
//! - [`catalog`] - practice words, articulation tips, default courses
//! - [`types`] - shared records and constants
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use neuroai_algo::LessonProgress;
//!
//! let now = Utc::now();
//! let mut lesson = LessonProgress::new(1);
//! for score in [40.0, 60.0, 80.0] {
//!     lesson = lesson.record_attempt(score, 50, now).unwrap();
//! }
//! assert_eq!(lesson.average_accuracy, 60);
//! assert!(lesson.is_completed);
//! ```

pub mod catalog;
pub mod mastery;
pub mod progress;
pub mod pronunciation;
pub mod recommend;
pub mod statistics;
pub mod types;

pub use types::*;

pub use mastery::{average_accuracy, is_mastered, round_half_up};
pub use progress::{aggregate, ProgressSummary};
pub use pronunciation::score_transcript;
pub use recommend::{build_recommendations, Recommendations};
pub use statistics::{summarize, TestStatistics};
