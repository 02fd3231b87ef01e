//! Result presentation: verdict cards, detailed report, guidance texts.

use serde::{Deserialize, Serialize};

use super::slots::{SlotField, SlotSet};
use super::verdict::{Possibility, Verdict};

/// Quick reply offered everywhere a dead end is possible.
pub const RETRY_QUICK_REPLY: &str = "다시 검사하기";

/// Post-analysis intents, matched verbatim against the utterance.
pub const WHY_PRESENT_INTENT: &str = "왜 천식 가능성이 있나요?";
pub const WHY_LOW_INTENT: &str = "왜 천식 가능성이 낮은가요?";
pub const CARE_INTENTS: &[&str] = &["천식 도움되는 정보", "천식에 도움되는 정보"];
pub const BOOKING_INTENT: &str = "병원 진료 예약하기";

/// External booking page opened by the booking quick reply.
pub const BOOKING_LINK_URL: &str = "https://www.seoulpeds.example/reservation";

const DISCLAIMER: &str = "※ 본 결과는 입력하신 내용에 기반한 참고용 정보이며, \
의학적 진단을 대신하지 않습니다. 정확한 진단은 소아청소년과 전문의와 상담하세요.";

/// Care guidance shown for the care-information intents.
pub const CARE_GUIDE: &str = "천식이 있는 아이에게 도움이 되는 생활 수칙이에요.\n\n\
1️⃣ 집먼지 진드기를 줄이기 위해 침구를 자주 세탁하고 건조해 주세요.\n\
2️⃣ 담배 연기, 미세먼지 등 자극적인 공기를 피해 주세요.\n\
3️⃣ 감기에 걸리지 않도록 손 씻기를 습관화해 주세요.\n\
4️⃣ 증상이 악화되면 처방받은 기관지확장제를 지시대로 사용해 주세요.\n\
5️⃣ 정기적으로 소아청소년과 진료를 받아 주세요.";

/// Booking guidance shown for the booking intent.
pub const BOOKING_GUIDE: &str = "병원 진료 예약을 도와드릴게요.\n\
아래 버튼을 누르시면 소아청소년과 예약 페이지로 이동합니다.";

/// Result thumbnail tier, chosen by the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskImage {
    HighRisk,
    LowRisk,
}

impl RiskImage {
    pub fn for_possibility(possibility: Possibility) -> Self {
        match possibility {
            Possibility::Present => RiskImage::HighRisk,
            Possibility::Low | Possibility::Insufficient => RiskImage::LowRisk,
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            RiskImage::HighRisk => {
                "https://raw.githubusercontent.com/asthma-scout/assets/main/result_high_risk.png"
            }
            RiskImage::LowRisk => {
                "https://raw.githubusercontent.com/asthma-scout/assets/main/result_low_risk.png"
            }
        }
    }
}

/// What the engine answers with; adapters translate this to the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Plain text with optional quick replies.
    Text {
        text: String,
        quick_replies: Vec<String>,
    },
    /// Card with a title, body and optional thumbnail.
    Card {
        title: String,
        description: String,
        quick_replies: Vec<String>,
        image: Option<RiskImage>,
    },
    /// Interim acknowledgement; the real answer arrives via callback.
    CallbackWait { text: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    pub fn text_with(text: impl Into<String>, quick_replies: Vec<String>) -> Self {
        Reply::Text {
            text: text.into(),
            quick_replies,
        }
    }

    pub fn wait(text: impl Into<String>) -> Self {
        Reply::CallbackWait { text: text.into() }
    }
}

/// Builds the verdict card shown when the deferred analysis completes.
pub fn format_result(verdict: &Verdict) -> Reply {
    let (title, quick_replies) = match verdict.possibility {
        Possibility::Present => (
            "상담 결과, 현재 증상이 천식으로 인한 가능성이 높아 보입니다.",
            vec![
                WHY_PRESENT_INTENT.to_string(),
                CARE_INTENTS[0].to_string(),
                BOOKING_INTENT.to_string(),
            ],
        ),
        Possibility::Low => (
            "상담 결과, 현재 증상이 천식으로 인한 가능성은 높지 않은 것으로 보입니다.",
            vec![
                WHY_LOW_INTENT.to_string(),
                CARE_INTENTS[0].to_string(),
                BOOKING_INTENT.to_string(),
            ],
        ),
        Possibility::Insufficient => (
            "상담 결과, 판단에 필요한 증상 정보가 부족합니다.",
            vec![RETRY_QUICK_REPLY.to_string()],
        ),
    };
    Reply::Card {
        title: title.to_string(),
        description: format!("{}\n\n{}", verdict.reason, DISCLAIMER),
        quick_replies,
        image: Some(RiskImage::for_possibility(verdict.possibility)),
    }
}

/// Builds the detailed breakdown shown for the "why" intents.
pub fn format_detailed_report(slots: &SlotSet) -> String {
    let mut symptom_lines = Vec::new();
    if slots.get(SlotField::Wheeze).is_yes() {
        if slots.get(SlotField::Night).is_yes() {
            symptom_lines.push("•밤에 쌕쌕거림과 함께 기침이 심해짐".to_string());
        } else {
            symptom_lines.push("•쌕쌕거림 증상 있음".to_string());
        }
    }
    if slots.get(SlotField::Breathlessness).is_yes() {
        symptom_lines.push("•호흡곤란 증상 있음".to_string());
    }
    if slots.get(SlotField::ChestTightness).is_yes() {
        symptom_lines.push("•가슴 답답함 호소".to_string());
    }
    if let Some(duration) = slots.get(SlotField::Duration).as_text() {
        symptom_lines.push(format!("•증상 지속: {duration}"));
    }
    if let Some(usage) = slots.get(SlotField::BronchodilatorUse).as_text() {
        symptom_lines.push(format!("•기관지확장제 사용: {usage}"));
    }
    let fever = slots.get(SlotField::Fever);
    if fever.is_yes() {
        symptom_lines.push("•발열 동반".to_string());
    } else if fever.is_no() {
        symptom_lines.push("•발열은 없음".to_string());
    }

    let mut history_lines = Vec::new();
    let family = slots.get(SlotField::FamilyHistory);
    if family.is_yes() {
        history_lines.push("•가족 중 천식 진단을 받은 분 있음");
    } else if family.is_no() {
        history_lines.push("•가족 중 천식 진단 없음");
    }
    let atopy = slots.get(SlotField::AtopyHistory);
    if atopy.is_yes() {
        history_lines.push("•아이가 아토피 진단을 받음");
    } else if atopy.is_no() {
        history_lines.push("•아토피 진단 이력 없음");
    }

    let mut allergy_lines = Vec::new();
    if slots.get(SlotField::AirborneAllergen).is_yes() {
        let detail = slots
            .get(SlotField::AirborneAllergenDetail)
            .as_text()
            .unwrap_or("흡입 항원");
        allergy_lines.push(format!("•공중 항원({detail}) 양성"));
    }
    if slots.get(SlotField::FoodAllergen).is_yes() {
        let detail = slots
            .get(SlotField::FoodAllergenDetail)
            .as_text()
            .unwrap_or("식품 항원");
        allergy_lines.push(format!("•식품 항원({detail}) 양성"));
    }
    if let Some(ige) = slots.get(SlotField::TotalIge).as_text() {
        allergy_lines.push(format!("•총 IgE: {ige}"));
    }

    let section = |title: &str, lines: &[String]| {
        if lines.is_empty() {
            format!("{title}\n•확인된 내용 없음")
        } else {
            format!("{title}\n{}", lines.join("\n"))
        }
    };
    let history_lines: Vec<String> = history_lines.into_iter().map(String::from).collect();

    format!(
        "{}\n\n{}\n\n{}\n\n{}",
        section("📋 증상 관련", &symptom_lines),
        section("👨‍👩‍👧 가족력/과거력", &history_lines),
        section("🧪 알레르기 검사", &allergy_lines),
        DISCLAIMER
    )
}
