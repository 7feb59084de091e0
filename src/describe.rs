//! Best-effort prose for adjusted prescriptions
//!
//! Nothing here feeds back into decisions; the structured fields on
//! [`WorkoutPrescription`](crate::models::WorkoutPrescription) are the source
//! of truth and this module only keeps the human-readable text in step.

use crate::models::Intensity;

pub const COOL_DOWN_NOTE: &str =
    "Finish with 15 minutes of easy cool-down and mobility work to support recovery.";

/// Replace a mention of the old intensity with the new one
///
/// Matches the old label as a whole word, ignoring ASCII case. When the
/// description never names the old intensity a sentence is appended instead.
pub fn rewrite_intensity(description: &str, from: Intensity, to: Intensity) -> String {
    if from == to {
        return description.to_string();
    }

    match find_word(description, from.label()) {
        Some(start) => {
            let end = start + from.label().len();
            format!("{}{}{}", &description[..start], to.label(), &description[end..])
        }
        None => {
            let sentence = format!("Intensity adjusted from {} to {}.", from, to);
            if description.trim().is_empty() {
                sentence
            } else {
                format!("{} {}", description.trim_end(), sentence)
            }
        }
    }
}

/// Append the cool-down note to a description
pub fn with_cool_down(description: &str) -> String {
    if description.trim().is_empty() {
        COOL_DOWN_NOTE.to_string()
    } else {
        format!("{} {}", description.trim_end(), COOL_DOWN_NOTE)
    }
}

fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let is_word_char = |c: char| c.is_alphanumeric() || c == '-';

    let mut offset = 0;
    while let Some(pos) = hay[offset..].find(&needle) {
        let start = offset + pos;
        let end = start + needle.len();
        let before_ok = hay[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = hay[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            return Some(start);
        }
        offset = end;
    }
    None
}
