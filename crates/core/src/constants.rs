//! Constants used throughout the MedBot core crate.
//!
//! Fixed response texts and matching thresholds live here so that the dialogue, the
//! composer and the tests agree on them.

/// Greeting returned after a session reset.
pub const GREETING: &str = "Hello! I'm MedBot, your preliminary health assistant. How are you feeling today? Please describe your symptoms.";

/// Messages that reset a session (compared after trimming and lowercasing).
pub const RESET_COMMANDS: &[&str] = &["reset", "start over", "clear"];

/// Minimum similarity for a single token to match a canonical symptom.
pub const WORD_MATCH_CUTOFF: f64 = 0.7;

/// Minimum similarity for a 2- or 3-token phrase to match a canonical symptom.
pub const PHRASE_MATCH_CUTOFF: f64 = 0.65;

/// Window sizes used by the multi-word fuzzy pass.
pub const PHRASE_WINDOW_SIZES: &[usize] = &[2, 3];

/// Severity answers at or above this value trigger the severe-symptom warning.
pub const SEVERE_SEVERITY_THRESHOLD: i64 = 8;

/// Duration answers containing any of these trigger the long-duration warning.
pub const LONG_DURATION_MARKERS: &[&str] = &["week", "10 days", "long", "persistent"];

pub const SEVERE_WARNING: &str =
    "Your symptoms are quite severe. Please consider seeking medical attention promptly.";

pub const LONG_DURATION_WARNING: &str =
    "Your symptoms have lasted a long time. Please consult a healthcare provider.";

pub const EMERGENCY_ESCALATION: &str = "⚠️ EMERGENCY: Your symptoms may indicate a serious condition. Please seek immediate medical attention or call your local emergency number.";

pub const NO_MATCH_APOLOGY: &str =
    "I'm sorry, I couldn't identify your symptoms. Please provide more details.";

/// Prefix for feedback entries in the conversation log.
pub const FEEDBACK_LOG_PREFIX: &str = "FEEDBACK: ";

/// Default SQLite database file when no explicit location is configured.
pub const DEFAULT_DATABASE_FILE: &str = "medbot.db";

/// Database location that selects an ephemeral in-memory store.
pub const IN_MEMORY_DATABASE: &str = ":memory:";
