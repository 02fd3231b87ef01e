//! Authoritative slot re-derivation from the transcript.
//!
//! The record accumulated during the live dialogue is advisory; the
//! verdict is computed from a fresh pass over the full transcript so it
//! is a deterministic function of what was actually said.

use super::extractor;
use super::session::{Speaker, Turn};
use super::slots::SlotSet;

/// Pairs each agent question with the user answer that directly follows it.
pub fn question_answer_pairs(history: &[Turn]) -> Vec<(&str, &str)> {
    history
        .windows(2)
        .filter_map(|w| match (w[0].speaker, w[1].speaker) {
            (Speaker::Agent, Speaker::User) => Some((w[0].text.as_str(), w[1].text.as_str())),
            _ => None,
        })
        .collect()
}

/// Re-runs the extractor over every question/answer pair, oldest first.
///
/// Later answers to the same question overwrite earlier ones, matching
/// the live dialogue's behavior.
pub fn derive_slots(history: &[Turn]) -> SlotSet {
    let mut slots = SlotSet::new();
    for (question, answer) in question_answer_pairs(history) {
        slots.set_last_question(question);
        slots = extractor::extract(answer, &slots);
    }
    slots
}
