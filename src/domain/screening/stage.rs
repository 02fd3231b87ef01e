//! Question-stage policy.
//!
//! Decides, from the slot record and the recent transcript, whether the
//! next agent turn should probe another field or propose the analysis.
//! A field counts as "asked" if its slot holds an answer, or if a recent
//! agent turn already mentioned its topic. The transcript fallback keeps
//! the policy from re-asking questions whose answers never landed in a
//! slot.

use super::session::{Speaker, Turn};
use super::slots::SlotField;
use super::slots::SlotSet;
use super::vocabulary;

/// How many trailing turns the policy inspects.
pub const RECENT_WINDOW: usize = 10;

/// Which field group the next question should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CoreSymptoms,
    Frequency,
    RiskFactors,
}

impl Stage {
    pub fn fields(&self) -> &'static [SlotField] {
        match self {
            Stage::CoreSymptoms => &SlotField::CORE_SYMPTOMS,
            Stage::Frequency => &SlotField::FREQUENCY,
            Stage::RiskFactors => &SlotField::RISK_FACTORS,
        }
    }

    /// Korean stage description used in the question prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            Stage::CoreSymptoms => "천식의 특징적인 증상(쌕쌕거림, 호흡곤란, 가슴 답답, 야간 악화)을 확인하세요.",
            Stage::Frequency => "증상의 지속 기간과 기관지확장제 사용 여부를 확인하세요.",
            Stage::RiskFactors => "위험인자(가족력, 아토피, 공중 항원, 식품 항원)를 확인하세요.",
        }
    }
}

/// Per-stage asked/unasked bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct StageProgress {
    pub asked_core: Vec<SlotField>,
    pub unasked_core: Vec<SlotField>,
    pub asked_frequency: Vec<SlotField>,
    pub unasked_frequency: Vec<SlotField>,
    pub asked_risk: Vec<SlotField>,
    pub unasked_risk: Vec<SlotField>,
}

impl StageProgress {
    pub fn unasked(&self, stage: Stage) -> &[SlotField] {
        match stage {
            Stage::CoreSymptoms => &self.unasked_core,
            Stage::Frequency => &self.unasked_frequency,
            Stage::RiskFactors => &self.unasked_risk,
        }
    }
}

/// Everything the question generator needs to target the right field
/// without repeating itself.
#[derive(Debug, Clone, PartialEq)]
pub struct StageContext {
    pub target: Stage,
    pub progress: StageProgress,
    /// Recorded (label, value) pairs, for the don't-re-ask instruction.
    pub collected: Vec<(String, String)>,
}

/// Outcome of the policy for one agent turn.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionPlan {
    /// Enough is known (or the dialogue has stalled): offer the analysis.
    ProposeAnalysis,
    /// Probe the given stage next.
    Probe(StageContext),
}

/// Whether a recent agent turn already covered this field's topic.
pub fn asked_in_transcript(field: SlotField, recent: &[Turn]) -> bool {
    recent
        .iter()
        .filter(|t| t.speaker == Speaker::Agent)
        .any(|t| vocabulary::contains_any(&t.text.to_lowercase(), vocabulary::topic_keywords(field)))
}

/// Dual-source asked check: a recorded slot answer wins, the transcript
/// scan catches questions whose answers never parsed.
pub fn is_asked(field: SlotField, slots: &SlotSet, recent: &[Turn]) -> bool {
    slots.is_answered(field) || asked_in_transcript(field, recent)
}

/// Computes asked/unasked lists for every stage.
pub fn progress(slots: &SlotSet, recent: &[Turn]) -> StageProgress {
    let split = |fields: &[SlotField]| -> (Vec<SlotField>, Vec<SlotField>) {
        fields
            .iter()
            .copied()
            .partition(|f| is_asked(*f, slots, recent))
    };
    let (asked_core, unasked_core) = split(&SlotField::CORE_SYMPTOMS);
    let (asked_frequency, unasked_frequency) = split(&SlotField::FREQUENCY);
    let (asked_risk, unasked_risk) = split(&SlotField::RISK_FACTORS);
    StageProgress {
        asked_core,
        unasked_core,
        asked_frequency,
        unasked_frequency,
        asked_risk,
        unasked_risk,
    }
}

/// Plans the next agent turn.
///
/// Order of checks:
/// 1. stalled dialogue (the last two agent turns were identical);
/// 2. no core symptom asked yet;
/// 3. core started but frequency untouched;
/// 4. fewer than two risk factors asked;
/// 5. all stages satisfied: propose the analysis once the user starts
///    answering in the negative, otherwise keep probing unasked core
///    symptoms until none remain.
pub fn plan_next_question(history: &[Turn], slots: &SlotSet) -> QuestionPlan {
    let start = history.len().saturating_sub(RECENT_WINDOW);
    let recent = &history[start..];

    let agent_texts: Vec<&str> = recent
        .iter()
        .filter(|t| t.speaker == Speaker::Agent)
        .map(|t| t.text.as_str())
        .collect();
    if agent_texts.len() >= 2 && agent_texts[agent_texts.len() - 1] == agent_texts[agent_texts.len() - 2]
    {
        return QuestionPlan::ProposeAnalysis;
    }

    let progress = progress(slots, recent);
    let collected = slots
        .recorded_entries()
        .map(|(f, v)| (f.label().to_string(), v.to_string()))
        .collect();

    let probe = |target: Stage, progress: StageProgress, collected| {
        QuestionPlan::Probe(StageContext {
            target,
            progress,
            collected,
        })
    };

    if progress.asked_core.is_empty() {
        return probe(Stage::CoreSymptoms, progress, collected);
    }
    if progress.asked_frequency.is_empty() {
        return probe(Stage::Frequency, progress, collected);
    }
    if progress.asked_risk.len() < 2 {
        return probe(Stage::RiskFactors, progress, collected);
    }

    let recent_user_negative = recent
        .iter()
        .rev()
        .filter(|t| t.speaker == Speaker::User)
        .take(2)
        .any(|t| vocabulary::is_negative(&t.text));
    if recent_user_negative || progress.unasked_core.is_empty() {
        return QuestionPlan::ProposeAnalysis;
    }
    probe(Stage::CoreSymptoms, progress, collected)
}
