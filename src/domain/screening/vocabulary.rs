//! Keyword vocabulary for the screening dialogue.
//!
//! Every phrase the engine matches against lives here as a declarative
//! table, classified through the single [`contains_any`] primitive.
//! Matching is substring containment over the raw utterance; shorthand
//! jamo answers ("ㅇㅇ", "ㄴㄴ") are expanded before matching.

use super::slots::SlotField;

/// Returns true if `text` contains any of the given tokens.
pub fn contains_any(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| text.contains(token))
}

/// Meta-level affirmatives: consent to an offer (e.g. "shall I analyze?").
pub const AFFIRMATIVE_TOKENS: &[&str] = &[
    "네",
    "예",
    "좋아",
    "그래",
    "응",
    "오케이",
    "괜찮아",
    "진행",
    "맞아",
];

/// Meta-level negatives: declining an offer or reporting "none of that".
pub const NEGATIVE_TOKENS: &[&str] = &[
    "아니",
    "없어",
    "없습니다",
    "아니요",
    "아니오",
    "아닙니다",
    "아니에요",
    "그렇지 않",
    "ㄴㄴ",
];

/// Slot-level positives: the answer asserts the asked-about symptom.
pub const SLOT_POSITIVE_TOKENS: &[&str] = &[
    "네", "예", "맞아", "있어", "해요", "됩니다", "그래", "응", "ㅇㅇ", "ㅇ",
];

/// Slot-level negatives: the answer denies the asked-about symptom.
pub const SLOT_NEGATIVE_TOKENS: &[&str] =
    &["아니", "없어", "안해", "아닙니다", "아니에요", "ㄴㄴ", "ㄴ"];

/// Markers that an answer reports three months or longer.
pub const THREE_MONTH_TOKENS: &[&str] = &["3개월", "세달", "3달"];

/// Utterances that reset the session and start over.
pub const TERMINATION_PHRASES: &[&str] = &["다시 검사하기", "처음으로", "천식일까요"];

/// Utterances that close the session for good.
pub const END_PHRASES: &[&str] = &["상담 종료"];

/// Utterances that jump straight to the analysis offer.
pub const ANALYZE_TRIGGERS: &[&str] = &["분석해", "결과"];

/// An agent turn containing one of these was an offer to run the analysis.
pub const ANALYSIS_OFFER_MARKERS: &[&str] = &["분석을 진행해볼까요?", "안내드릴까요?"];

/// Marker in a generated question meaning "nothing left to ask".
pub const NO_MORE_TO_ASK_MARKER: &str = "말씀하고 싶은 다른 증상";

/// Fixed transition sentence proposing the analysis once probing is done.
pub const TRANSITION_SENTENCE: &str =
    "네, 알겠습니다. 지금까지 말씀해주신 내용을 종합하여 아이의 천식 가능성을 안내드릴까요? 🩺";

/// Fallback question when generation fails.
pub const FALLBACK_QUESTION: &str = "혹시 아이에게 다른 증상이 있으신가요?";

/// Default interim message while the verdict is computed.
pub const DEFAULT_WAIT_MESSAGE: &str =
    "네, 말씀해주신 내용을 분석하고 있어요. 잠시만 기다려주세요! 🤖";

/// Interim message while an allergy report image is analyzed.
pub const ALLERGY_WAIT_MESSAGE: &str =
    "📊 네, 보내주신 알레르기 검사결과 내용을 살펴보고 있어요. 잠시만 기다려주세요.";

/// Jamo shorthand and its expansion, longest entries first.
const SHORTHAND: &[(&str, &str)] = &[
    ("ㅇㅇ", "응"),
    ("ㅇㅋ", "오케이"),
    ("ㄱㄹ", "그래"),
    ("ㄱㅊ", "괜찮아"),
    ("ㄴㄴ", "아니"),
    ("ㅇ", "응"),
    ("ㄴ", "아니"),
];

/// Expands whitespace-separated jamo shorthand tokens to full words.
///
/// Only whole tokens are replaced, so "ㅇ" inside a longer word is left
/// alone. Unknown tokens pass through untouched.
pub fn expand_shorthand(utterance: &str) -> String {
    utterance
        .split_whitespace()
        .map(|token| {
            SHORTHAND
                .iter()
                .find(|(short, _)| *short == token)
                .map(|(_, full)| *full)
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Meta-level affirmative check over both the raw and expanded forms.
pub fn is_affirmative(raw: &str, expanded: &str) -> bool {
    contains_any(expanded, AFFIRMATIVE_TOKENS) || contains_any(raw.trim(), &["ㅇㅇ", "ㅇㅋ"])
}

/// Meta-level negative check.
pub fn is_negative(text: &str) -> bool {
    contains_any(text, NEGATIVE_TOKENS)
}

/// Slot-level positive check.
pub fn is_slot_positive(text: &str) -> bool {
    contains_any(text, SLOT_POSITIVE_TOKENS)
}

/// Slot-level negative check.
pub fn is_slot_negative(text: &str) -> bool {
    contains_any(text, SLOT_NEGATIVE_TOKENS)
}

/// Keywords that identify which field the *previous question* targeted.
///
/// Detail fields are never keyword-extracted and return an empty set.
pub fn question_keywords(field: SlotField) -> &'static [&'static str] {
    match field {
        SlotField::Wheeze => &["쌕쌕", "휘파람"],
        SlotField::Breathlessness => &["숨쉬", "호흡"],
        SlotField::ChestTightness => &["가슴", "답답"],
        SlotField::Night => &["밤", "야간", "잠"],
        SlotField::Duration => &["얼마나", "오래", "지속"],
        SlotField::BronchodilatorUse => &["기관지", "확장제"],
        SlotField::FamilyHistory => &["가족", "부모"],
        SlotField::AtopyHistory => &["아토피", "알레르기"],
        SlotField::AirborneAllergen => &["집먼지", "꽃가루", "곰팡이"],
        SlotField::FoodAllergen => &["우유", "계란", "땅콩"],
        SlotField::SymptomRelief => &["완화", "좋아지", "호전"],
        SlotField::Fever => &["발열", "열이"],
        SlotField::SoreThroat => &["인후", "목이 아프", "목 아프"],
        SlotField::AirborneAllergenDetail
        | SlotField::FoodAllergenDetail
        | SlotField::TotalIge
        | SlotField::AllergyReport => &[],
    }
}

/// Keywords that identify a field's *topic* inside past agent turns.
///
/// Broader than [`question_keywords`]: used to decide whether a field was
/// already asked about, even if the answer never landed in the slot.
pub fn topic_keywords(field: SlotField) -> &'static [&'static str] {
    match field {
        SlotField::Wheeze => &["쌕쌕", "쌕쌕거리", "wheezing", "휘파람"],
        SlotField::Breathlessness => &["호흡곤란", "숨쉬기", "숨쉬는", "호흡", "숨"],
        SlotField::ChestTightness => &["가슴", "답답", "답답함", "가슴이"],
        SlotField::Night => &["야간", "밤", "밤에", "밤중", "잠잘때", "잠들때"],
        SlotField::Duration => &["얼마나", "오래", "지속", "3개월"],
        SlotField::BronchodilatorUse => &["기관지", "확장제", "약물", "사용"],
        SlotField::FamilyHistory => &["가족", "부모", "형제", "유전"],
        SlotField::AtopyHistory => &["아토피", "피부염", "알레르기 비염"],
        SlotField::AirborneAllergen => &["집먼지", "꽃가루", "곰팡이", "공중"],
        SlotField::FoodAllergen => &["우유", "계란", "땅콩", "음식", "식품"],
        other => question_keywords(other),
    }
}
