//! Asthma predictive-index evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::slots::{SlotField, SlotSet};
use super::vocabulary;

/// Final screening possibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Possibility {
    #[serde(rename = "있음")]
    Present,
    #[serde(rename = "낮음")]
    Low,
    #[serde(rename = "정보 부족")]
    Insufficient,
}

impl fmt::Display for Possibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Possibility::Present => f.write_str("있음"),
            Possibility::Low => f.write_str("낮음"),
            Possibility::Insufficient => f.write_str("정보 부족"),
        }
    }
}

/// Verdict with its one-sentence clinical rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub possibility: Possibility,
    pub reason: String,
}

impl Verdict {
    fn new(possibility: Possibility, reason: &str) -> Self {
        Verdict {
            possibility,
            reason: reason.to_string(),
        }
    }
}

/// Evaluates the slot record against the asthma predictive index.
///
/// Check order is significant: an improving course or cold-like signs
/// (fever, sore throat) veto the index even when it would otherwise
/// match.
pub fn judge(slots: &SlotSet) -> Verdict {
    if slots.is_empty_of_evidence() {
        return Verdict::new(
            Possibility::Insufficient,
            "분석할 증상 정보가 충분하지 않습니다.",
        );
    }

    let cold_like = slots.get(SlotField::SymptomRelief).is_yes()
        || slots.get(SlotField::Fever).is_yes()
        || slots.get(SlotField::SoreThroat).is_yes();
    if cold_like {
        return Verdict::new(
            Possibility::Low,
            "증상이 완화되고 있거나, 감기를 시사하는 증상(발열, 인후통)이 동반됩니다.",
        );
    }

    let has_core_symptom = SlotField::CORE_SYMPTOMS
        .iter()
        .any(|f| slots.get(*f).is_yes());
    let three_month = |f: SlotField| {
        vocabulary::THREE_MONTH_TOKENS
            .iter()
            .any(|m| slots.get(f).mentions(m))
    };
    let frequent = three_month(SlotField::Duration) || three_month(SlotField::BronchodilatorUse);
    if !has_core_symptom || !frequent {
        return Verdict::new(
            Possibility::Low,
            "천식을 의심할 만한 특징적인 증상이나 발생 빈도가 확인되지 않았습니다.",
        );
    }

    let majors = [SlotField::FamilyHistory, SlotField::AtopyHistory]
        .iter()
        .filter(|f| slots.get(**f).is_yes())
        .count();
    let minors = [SlotField::AirborneAllergen, SlotField::FoodAllergen]
        .iter()
        .filter(|f| slots.get(**f).is_yes())
        .count();
    if majors >= 1 || minors >= 2 {
        return Verdict::new(
            Possibility::Present,
            "천식 예측지수(API) 평가 결과, 주요 인자 또는 부가 인자 조건을 충족합니다.",
        );
    }

    Verdict::new(
        Possibility::Low,
        "천식 의심 증상은 있으나, 천식 예측지수(API)의 위험인자 조건을 충족하지 않습니다.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::slots::SlotValue;

    fn slots(entries: &[(SlotField, SlotValue)]) -> SlotSet {
        let mut s = SlotSet::new();
        for (f, v) in entries {
            s.set(*f, v.clone());
        }
        s
    }

    #[test]
    fn empty_record_is_insufficient() {
        assert_eq!(
            judge(&SlotSet::new()).possibility,
            Possibility::Insufficient
        );
    }

    #[test]
    fn cold_signs_veto_a_full_index_match() {
        let s = slots(&[
            (SlotField::Wheeze, SlotValue::Yes),
            (SlotField::Duration, SlotValue::text("3개월 이상")),
            (SlotField::FamilyHistory, SlotValue::Yes),
            (SlotField::Fever, SlotValue::Yes),
        ]);
        let verdict = judge(&s);
        assert_eq!(verdict.possibility, Possibility::Low);
        assert!(verdict.reason.contains("감기"));
    }

    #[test]
    fn symptom_relief_alone_is_low() {
        let s = slots(&[(SlotField::SymptomRelief, SlotValue::Yes)]);
        assert_eq!(judge(&s).possibility, Possibility::Low);
    }

    #[test]
    fn core_symptom_without_frequency_is_low() {
        let s = slots(&[
            (SlotField::Wheeze, SlotValue::Yes),
            (SlotField::Duration, SlotValue::text("없음")),
        ]);
        let verdict = judge(&s);
        assert_eq!(verdict.possibility, Possibility::Low);
        assert!(verdict.reason.contains("빈도"));
    }

    #[test]
    fn frequency_without_core_symptom_is_low() {
        let s = slots(&[
            (SlotField::Wheeze, SlotValue::No),
            (SlotField::Duration, SlotValue::text("3개월 이상")),
        ]);
        assert_eq!(judge(&s).possibility, Possibility::Low);
    }

    #[test]
    fn one_major_factor_is_enough() {
        let s = slots(&[
            (SlotField::Breathlessness, SlotValue::Yes),
            (SlotField::BronchodilatorUse, SlotValue::text("3개월 이상")),
            (SlotField::AtopyHistory, SlotValue::Yes),
        ]);
        assert_eq!(judge(&s).possibility, Possibility::Present);
    }

    #[test]
    fn one_minor_factor_is_not_enough() {
        let s = slots(&[
            (SlotField::Wheeze, SlotValue::Yes),
            (SlotField::Duration, SlotValue::text("3개월 이상")),
            (SlotField::AirborneAllergen, SlotValue::Yes),
        ]);
        let verdict = judge(&s);
        assert_eq!(verdict.possibility, Possibility::Low);
        assert!(verdict.reason.contains("위험인자"));
    }

    #[test]
    fn two_minor_factors_meet_the_index() {
        let s = slots(&[
            (SlotField::Wheeze, SlotValue::Yes),
            (SlotField::Duration, SlotValue::text("3개월 이상")),
            (SlotField::AirborneAllergen, SlotValue::Yes),
            (SlotField::FoodAllergen, SlotValue::Yes),
        ]);
        assert_eq!(judge(&s).possibility, Possibility::Present);
    }

    #[test]
    fn alternate_three_month_wordings_count() {
        for wording in ["세달 정도", "3달 넘게"] {
            let s = slots(&[
                (SlotField::Night, SlotValue::Yes),
                (SlotField::Duration, SlotValue::text(wording)),
                (SlotField::FamilyHistory, SlotValue::Yes),
            ]);
            assert_eq!(judge(&s).possibility, Possibility::Present, "{wording}");
        }
    }

    #[test]
    fn possibility_serializes_in_korean() {
        assert_eq!(
            serde_json::to_string(&Possibility::Insufficient).unwrap(),
            "\"정보 부족\""
        );
        assert_eq!(serde_json::to_string(&Possibility::Present).unwrap(), "\"있음\"");
    }
}
