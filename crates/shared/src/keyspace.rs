//! Storage key layout shared by every DemoBoard client.
//!
//! The namespace is kept bit-exact for compatibility with data already in
//! the store:
//!
//! ```text
//! demo:<timestampMillis>                 -> { "headline": string }
//! demo:<id>:reaction:<timestampMillis>   -> { "type": "smile"|"meh"|"frown" }
//! demo:<id>:feedback:<timestampMillis>   -> string
//! ```
//!
//! Reaction and feedback keys start with `demo:` too, so a prefix scan for
//! demos returns them as well; callers filter with [`is_demo_record`].

use crate::domain::DemoId;

pub const DEMO_PREFIX: &str = "demo:";

const REACTION_SEGMENT: &str = ":reaction:";
const FEEDBACK_SEGMENT: &str = ":feedback:";

pub fn reaction_key(demo: &DemoId, millis: i64) -> String {
    format!("{demo}{REACTION_SEGMENT}{millis}")
}

pub fn reaction_prefix(demo: &DemoId) -> String {
    format!("{demo}{REACTION_SEGMENT}")
}

pub fn feedback_key(demo: &DemoId, millis: i64) -> String {
    format!("{demo}{FEEDBACK_SEGMENT}{millis}")
}

pub fn feedback_prefix(demo: &DemoId) -> String {
    format!("{demo}{FEEDBACK_SEGMENT}")
}

/// True when `key` is a demo record key (`demo:<integer>`), as opposed to a
/// reaction or feedback key that merely shares the `demo:` prefix.
pub fn is_demo_record(key: &str) -> bool {
    match key.strip_prefix(DEMO_PREFIX) {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
