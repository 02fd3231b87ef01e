//! Keyword slot extractor.
//!
//! Pure function over (last question, utterance): which field the answer
//! fills is decided by the question the agent just asked, and the answer's
//! polarity decides the value. Fields the question did not target are
//! never touched, so repeated extraction of the same answer is idempotent
//! and never erases earlier evidence.

use super::slots::{SlotField, SlotSet, SlotValue};
use super::vocabulary;

/// Runs the extractor for one utterance against the current record.
///
/// Returns the updated record; `slots.last_question()` selects the target
/// fields. An answer that is neither positive nor negative leaves the
/// record unchanged.
pub fn extract(utterance: &str, slots: &SlotSet) -> SlotSet {
    let mut updated = slots.clone();
    let response = vocabulary::expand_shorthand(utterance).to_lowercase();
    let positive = vocabulary::is_slot_positive(&response);
    let negative = vocabulary::is_slot_negative(&response);
    let question = updated.last_question().to_lowercase();

    for field in SlotField::ALL {
        let keywords = vocabulary::question_keywords(field);
        if keywords.is_empty() || !vocabulary::contains_any(&question, keywords) {
            continue;
        }
        if field.takes_duration_text() {
            if positive {
                let value = if vocabulary::contains_any(&response, vocabulary::THREE_MONTH_TOKENS) {
                    "3개월 이상"
                } else {
                    "있음"
                };
                updated.set(field, SlotValue::text(value));
            } else if negative {
                updated.set(field, SlotValue::text("없음"));
            }
        } else if positive {
            updated.set(field, SlotValue::Yes);
        } else if negative {
            updated.set(field, SlotValue::No);
        }
    }

    updated
}
