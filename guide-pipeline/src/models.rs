//! Data model for the guided-answer pipeline.
//!
//! Everything here is ephemeral per-request state except [`GuideAnswer`],
//! which is the caller-facing payload.

use chrono::Utc;
use gita_store::Verse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller input for one pipeline run.
#[derive(Debug, Clone)]
pub struct GuideRequest {
    /// The spiritual question. Trimmed non-empty, at most 500 characters.
    pub question: String,
    /// Knowledge level selecting the style/depth/tone profile.
    pub user_level: UserLevel,
    /// Optional prior-answer text supplied by the caller. The caller owns
    /// conversational continuity; there is no server-side session state.
    pub context: Option<String>,
}

/// User's knowledge level of the Gita and Vedic philosophy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl UserLevel {
    /// Lowercase name used in prompts and trace details.
    pub fn as_str(self) -> &'static str {
        match self {
            UserLevel::Beginner => "beginner",
            UserLevel::Intermediate => "intermediate",
            UserLevel::Advanced => "advanced",
        }
    }
}

/// Stage 1 output: what the question is really asking.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentAnalysis {
    /// Main spiritual topic or concern.
    pub core_topic: String,
    /// Candidate concept tags, loosely drawn from the known vocabulary.
    #[serde(default)]
    pub key_concepts: Vec<String>,
    /// Type of guidance sought (understanding, practical application, ...).
    #[serde(default)]
    pub guidance_type: String,
    /// Specific life situation if mentioned.
    #[serde(default)]
    pub life_context: Option<String>,
}

/// Stage 2 output item: a corpus verse with its selection rationale.
#[derive(Debug, Clone)]
pub struct SelectedVerse {
    /// The underlying corpus record.
    pub verse: Verse,
    /// Why this verse is relevant to the question.
    pub relevance: String,
    /// Commentary excerpt (≤500 chars), fetched only for selected verses.
    pub commentary: Option<String>,
}

/// Stage 3 output: how prior conversation informs this question.
#[derive(Debug, Clone, Serialize)]
pub struct ContextData {
    /// Whether the caller supplied prior context at all.
    pub has_previous_context: bool,
    /// Brief summary of the relevant prior points.
    pub context_summary: Option<String>,
    /// Whether the current question continues the previous thread.
    pub conversation_continuation: bool,
    /// Key points from the context the answer should address.
    pub key_points: Vec<String>,
}

impl ContextData {
    /// The trivial no-context value; costs zero generation calls.
    pub fn none() -> Self {
        Self {
            has_previous_context: false,
            context_summary: None,
            conversation_continuation: false,
            key_points: Vec::new(),
        }
    }
}

/// Stage 4 output: fixed per-level presentation profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelGuidance {
    pub level: UserLevel,
    /// How to write (vocabulary, examples).
    pub style: &'static str,
    /// How deep to go.
    pub depth: &'static str,
    /// Overall voice.
    pub tone: &'static str,
}

/// Stage 5 output: the synthesized teaching.
#[derive(Debug, Clone, Deserialize)]
pub struct TeachingResult {
    /// 1-2 sentence overview.
    pub executive_summary: String,
    /// Main teaching body (multi-paragraph).
    pub answer: String,
    /// Practical application for modern life.
    pub explanation: String,
    /// Related spiritual topics for further exploration.
    #[serde(default)]
    pub related_topics: Vec<String>,
}

/// Whether stage 5 produced a clean synthesis or recovered locally from a
/// malformed reply. Explicit so callers and tests never have to sniff
/// strings to tell the two apart.
#[derive(Debug, Clone)]
pub enum SynthesisOutcome {
    /// The model reply parsed as the requested shape.
    Clean(TeachingResult),
    /// The reply did not parse; this is the fixed fallback teaching.
    Degraded {
        teaching: TeachingResult,
        /// Parser detail for diagnostics.
        reason: String,
    },
}

impl SynthesisOutcome {
    /// The teaching regardless of recovery path.
    pub fn teaching(&self) -> &TeachingResult {
        match self {
            SynthesisOutcome::Clean(t) => t,
            SynthesisOutcome::Degraded { teaching, .. } => teaching,
        }
    }

    /// True when the fallback path was taken.
    pub fn is_degraded(&self) -> bool {
        matches!(self, SynthesisOutcome::Degraded { .. })
    }
}

/// One record per pipeline stage.
///
/// The ordered six-element sequence is the complete trace of a run: steps
/// are never skipped, reordered, or duplicated, even on degraded paths.
/// `details` carries summarized diagnostics only — never full prompts or
/// raw model output.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionStep {
    /// 1..=6, matches call order exactly.
    pub step_number: u32,
    /// Human name (e.g., "Understand Intent").
    pub step_name: &'static str,
    /// Stage-type tag.
    pub step_type: StepType,
    /// Stage-specific diagnostic fields.
    pub details: Value,
    /// Stage duration in milliseconds.
    pub duration_ms: u64,
    /// RFC 3339 timestamp taken when the step record was created.
    pub timestamp: String,
}

impl ExecutionStep {
    pub fn new(
        step_number: u32,
        step_name: &'static str,
        step_type: StepType,
        details: Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            step_number,
            step_name,
            step_type,
            details,
            duration_ms,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Tag identifying what kind of work a stage performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Analysis,
    Search,
    ContextAnalysis,
    Personalization,
    Synthesis,
    Guidance,
}

/// Display-shaped verse reference included in the final answer.
#[derive(Debug, Clone, Serialize)]
pub struct VerseRef {
    pub chapter: u32,
    pub verse: u32,
    pub sanskrit_text: String,
    pub transliteration: String,
    pub translation: String,
    pub relevance: String,
}

impl From<&SelectedVerse> for VerseRef {
    fn from(sv: &SelectedVerse) -> Self {
        Self {
            chapter: sv.verse.chapter,
            verse: sv.verse.verse,
            sanskrit_text: sv.verse.sanskrit.clone(),
            transliteration: sv.verse.transliteration.clone(),
            translation: sv.verse.translation.clone(),
            relevance: sv.relevance.clone(),
        }
    }
}

/// Final caller-facing answer payload.
#[derive(Debug, Clone, Serialize)]
pub struct GuideAnswer {
    /// Main teaching body.
    pub teaching: String,
    /// 1-2 sentence overview.
    pub executive_summary: String,
    /// Practical application.
    pub explanation: String,
    /// Verses grounding the teaching (0..=5).
    pub verse_references: Vec<VerseRef>,
    /// Related topics for further exploration.
    pub related_topics: Vec<String>,
    /// 3-5 follow-up questions.
    pub suggested_questions: Vec<String>,
}

/// Result of one complete pipeline run.
///
/// `execution_time_ms` is the sum of per-step durations — deliberately not
/// wall-clock request time, which also includes validation and transport
/// overhead. It isolates pipeline cost from transport cost and will visibly
/// differ from observed request latency.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub answer: GuideAnswer,
    pub trace: Vec<ExecutionStep>,
    pub execution_time_ms: u64,
}
