//! Structured slot record built up over the conversation.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Closed vocabulary of screening fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotField {
    Wheeze,
    Breathlessness,
    ChestTightness,
    Night,
    Duration,
    BronchodilatorUse,
    FamilyHistory,
    AtopyHistory,
    AirborneAllergen,
    FoodAllergen,
    SymptomRelief,
    Fever,
    SoreThroat,
    AirborneAllergenDetail,
    FoodAllergenDetail,
    TotalIge,
    AllergyReport,
}

impl SlotField {
    /// Every field, in stable display order.
    pub const ALL: [SlotField; 17] = [
        SlotField::Wheeze,
        SlotField::Breathlessness,
        SlotField::ChestTightness,
        SlotField::Night,
        SlotField::Duration,
        SlotField::BronchodilatorUse,
        SlotField::FamilyHistory,
        SlotField::AtopyHistory,
        SlotField::AirborneAllergen,
        SlotField::FoodAllergen,
        SlotField::SymptomRelief,
        SlotField::Fever,
        SlotField::SoreThroat,
        SlotField::AirborneAllergenDetail,
        SlotField::FoodAllergenDetail,
        SlotField::TotalIge,
        SlotField::AllergyReport,
    ];

    /// Core asthma symptoms (stage 1 of questioning).
    pub const CORE_SYMPTOMS: [SlotField; 4] = [
        SlotField::Wheeze,
        SlotField::Breathlessness,
        SlotField::ChestTightness,
        SlotField::Night,
    ];

    /// Frequency and duration indicators (stage 2).
    pub const FREQUENCY: [SlotField; 2] = [SlotField::Duration, SlotField::BronchodilatorUse];

    /// Predictive-index risk factors (stage 3).
    pub const RISK_FACTORS: [SlotField; 4] = [
        SlotField::FamilyHistory,
        SlotField::AtopyHistory,
        SlotField::AirborneAllergen,
        SlotField::FoodAllergen,
    ];

    /// Korean display label used in reports and question prompts.
    pub fn label(&self) -> &'static str {
        match self {
            SlotField::Wheeze => "쌕쌕거림",
            SlotField::Breathlessness => "호흡곤란",
            SlotField::ChestTightness => "가슴 답답",
            SlotField::Night => "야간 악화",
            SlotField::Duration => "증상 지속",
            SlotField::BronchodilatorUse => "기관지확장제 사용",
            SlotField::FamilyHistory => "가족력",
            SlotField::AtopyHistory => "아토피 병력",
            SlotField::AirborneAllergen => "공중 항원",
            SlotField::FoodAllergen => "식품 항원",
            SlotField::SymptomRelief => "증상 완화 여부",
            SlotField::Fever => "발열",
            SlotField::SoreThroat => "인후통",
            SlotField::AirborneAllergenDetail => "공중 항원 상세",
            SlotField::FoodAllergenDetail => "식품 항원 상세",
            SlotField::TotalIge => "총 IgE",
            SlotField::AllergyReport => "알레르기 검사 결과",
        }
    }

    /// Fields whose answers carry a duration/extent text rather than Y/N.
    pub fn takes_duration_text(&self) -> bool {
        matches!(self, SlotField::Duration | SlotField::BronchodilatorUse)
    }
}

impl fmt::Display for SlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single slot's value.
///
/// Serialized as `"Y"`, `"N"`, the free text, or JSON null.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotValue {
    #[default]
    Null,
    Yes,
    No,
    Text(String),
}

impl SlotValue {
    pub fn text(value: impl Into<String>) -> Self {
        SlotValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SlotValue::Null)
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, SlotValue::Yes)
    }

    pub fn is_no(&self) -> bool {
        matches!(self, SlotValue::No)
    }

    /// True for any recorded value, including a negative one.
    pub fn is_recorded(&self) -> bool {
        match self {
            SlotValue::Null => false,
            SlotValue::Text(t) => !t.is_empty(),
            _ => true,
        }
    }

    /// True if the value is free text containing the given marker.
    pub fn mentions(&self, marker: &str) -> bool {
        matches!(self, SlotValue::Text(t) if t.contains(marker))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl Serialize for SlotValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlotValue::Null => serializer.serialize_none(),
            SlotValue::Yes => serializer.serialize_str("Y"),
            SlotValue::No => serializer.serialize_str("N"),
            SlotValue::Text(t) => serializer.serialize_str(t),
        }
    }
}

impl<'de> Deserialize<'de> for SlotValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => SlotValue::Null,
            Some(s) if s == "Y" => SlotValue::Yes,
            Some(s) if s == "N" => SlotValue::No,
            Some(s) if s.is_empty() => SlotValue::Null,
            Some(s) => SlotValue::Text(s),
        })
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Null => f.write_str("미확인"),
            SlotValue::Yes => f.write_str("있음"),
            SlotValue::No => f.write_str("없음"),
            SlotValue::Text(t) => f.write_str(t),
        }
    }
}

/// The full slot record for one session.
///
/// Always carries every [`SlotField`] key (null when unfilled), plus the
/// text of the last question the agent asked, which the extractor uses to
/// decide which field an answer targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSet {
    fields: BTreeMap<SlotField, SlotValue>,
    #[serde(rename = "_last_question")]
    last_question: String,
}

impl SlotSet {
    pub fn new() -> Self {
        let fields = SlotField::ALL
            .into_iter()
            .map(|f| (f, SlotValue::Null))
            .collect();
        Self {
            fields,
            last_question: String::new(),
        }
    }

    pub fn get(&self, field: SlotField) -> &SlotValue {
        static NULL: SlotValue = SlotValue::Null;
        self.fields.get(&field).unwrap_or(&NULL)
    }

    pub fn set(&mut self, field: SlotField, value: SlotValue) {
        self.fields.insert(field, value);
    }

    pub fn last_question(&self) -> &str {
        &self.last_question
    }

    pub fn set_last_question(&mut self, question: impl Into<String>) {
        self.last_question = question.into();
    }

    /// Whether the field has a usable answer on record.
    ///
    /// Duration-style fields count any non-empty text; Y/N fields count
    /// either polarity.
    pub fn is_answered(&self, field: SlotField) -> bool {
        let value = self.get(field);
        if field.takes_duration_text() {
            value.is_recorded()
        } else {
            matches!(value, SlotValue::Yes | SlotValue::No)
        }
    }

    /// Iterates fields that hold a recorded value.
    pub fn recorded_entries(&self) -> impl Iterator<Item = (SlotField, &SlotValue)> {
        self.fields
            .iter()
            .filter(|(_, v)| v.is_recorded())
            .map(|(f, v)| (*f, v))
    }

    /// True when no field holds any evidence at all.
    pub fn is_empty_of_evidence(&self) -> bool {
        self.recorded_entries().next().is_none()
    }
}

impl Default for SlotSet {
    fn default() -> Self {
        Self::new()
    }
}

// Records round-trip through storage; missing keys from older records are
// restored to null so the full-key invariant holds after deserialization.
impl<'de> Deserialize<'de> for SlotSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            fields: BTreeMap<SlotField, SlotValue>,
            #[serde(rename = "_last_question", default)]
            last_question: String,
        }

        let wire = Wire::deserialize(deserializer)?;
        let mut slots = SlotSet::new();
        for (field, value) in wire.fields {
            slots.fields.insert(field, value);
        }
        slots.last_question = wire.last_question;
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_set_carries_every_key_as_null() {
        let slots = SlotSet::new();
        assert_eq!(slots.fields.len(), SlotField::ALL.len());
        assert!(slots.is_empty_of_evidence());
        for field in SlotField::ALL {
            assert!(slots.get(field).is_null());
        }
    }

    #[test]
    fn slot_value_serializes_to_wire_letters() {
        assert_eq!(serde_json::to_value(SlotValue::Yes).unwrap(), "Y");
        assert_eq!(serde_json::to_value(SlotValue::No).unwrap(), "N");
        assert_eq!(
            serde_json::to_value(SlotValue::text("3개월 이상")).unwrap(),
            "3개월 이상"
        );
        assert!(serde_json::to_value(SlotValue::Null).unwrap().is_null());
    }

    #[test]
    fn slot_value_round_trips() {
        for value in [
            SlotValue::Null,
            SlotValue::Yes,
            SlotValue::No,
            SlotValue::text("있음"),
        ] {
            let json = serde_json::to_string(&value).unwrap();
            let back: SlotValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn deserialize_restores_missing_keys() {
        let json = r#"{"fields":{"wheeze":"Y"},"_last_question":"밤에 쌕쌕거리나요?"}"#;
        let slots: SlotSet = serde_json::from_str(json).unwrap();
        assert!(slots.get(SlotField::Wheeze).is_yes());
        assert!(slots.get(SlotField::Fever).is_null());
        assert_eq!(slots.last_question(), "밤에 쌕쌕거리나요?");
        assert_eq!(slots.fields.len(), SlotField::ALL.len());
    }

    #[test]
    fn is_answered_distinguishes_duration_fields() {
        let mut slots = SlotSet::new();
        slots.set(SlotField::Duration, SlotValue::text("없음"));
        slots.set(SlotField::Wheeze, SlotValue::No);
        assert!(slots.is_answered(SlotField::Duration));
        assert!(slots.is_answered(SlotField::Wheeze));
        assert!(!slots.is_answered(SlotField::FamilyHistory));
    }

    #[test]
    fn mentions_checks_text_values_only() {
        assert!(SlotValue::text("3개월 이상").mentions("3개월"));
        assert!(!SlotValue::Yes.mentions("3개월"));
        assert!(!SlotValue::Null.mentions("3개월"));
    }
}
