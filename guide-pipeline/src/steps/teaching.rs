//! Step 5: Formulate Teaching — synthesize the grounded answer.
//!
//! The one stage with a local-recovery policy: a malformed reply falls back
//! to a fixed teaching skeleton instead of failing the request. The outcome
//! type records which path was taken.

use std::time::Instant;

use llm_service::{GenOptions, TextGenerator};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::extract::extract_json;
use crate::models::{
    ContextData, ExecutionStep, LevelGuidance, SelectedVerse, StepType, SynthesisOutcome,
    TeachingResult,
};

pub(crate) const STEP_NAME: &str = "Formulate Teaching";
const MAX_TOKENS: u32 = 2000;

/// How much raw model text the fallback keeps as the answer body.
const FALLBACK_ANSWER_CHARS: usize = 1000;

/// Synthesizes the teaching from everything the earlier stages produced.
///
/// Never bubbles a parse failure: the degraded branch substitutes the
/// default teaching with the truncated raw reply as its body. Transport
/// failures still propagate — only malformed replies are recovered.
pub(crate) async fn formulate_teaching(
    llm: &dyn TextGenerator,
    question: &str,
    verses: &[SelectedVerse],
    context: &ContextData,
    guidance: &LevelGuidance,
) -> Result<(SynthesisOutcome, ExecutionStep), PipelineError> {
    let started = Instant::now();

    let verse_references: String = verses
        .iter()
        .map(|sv| {
            format!(
                "\nVerse {id} (Chapter {chapter}, Verse {verse})\n\
                 Sanskrit: {sanskrit}\n\
                 Translation: {translation}\n\
                 Commentary: {commentary}\n\
                 Relevance: {relevance}\n",
                id = sv.verse.verse_id,
                chapter = sv.verse.chapter,
                verse = sv.verse.verse,
                sanskrit = sv.verse.sanskrit,
                translation = sv.verse.translation,
                commentary = sv.commentary.as_deref().unwrap_or(""),
                relevance = sv.relevance,
            )
        })
        .collect();

    let context_note = if context.has_previous_context {
        format!(
            "\nPrevious Context: {}\n",
            context.context_summary.as_deref().unwrap_or("")
        )
    } else {
        String::new()
    };

    let prompt = format!(
        "You are a wise spiritual guide well-versed in the Bhagavad Gita. A seeker has asked you a question.\n\
         \n\
         Question: {question}\n\
         {context_note}\n\
         User Level: {level}\n\
         \n\
         Style Guidance: {style}\n\
         Depth Guidance: {depth}\n\
         Tone: {tone}\n\
         \n\
         Relevant Bhagavad Gita Verses:\n\
         {verse_references}\n\
         \n\
         Provide a comprehensive spiritual teaching that:\n\
         1. Directly addresses the question with wisdom from the Gita\n\
         2. References the relevant verses naturally in the explanation\n\
         3. Provides practical application for modern life\n\
         4. Is appropriate for the user's knowledge level\n\
         5. Offers deep insight while remaining accessible\n\
         \n\
         IMPORTANT: Respond ONLY with valid JSON. Use \\n for newlines within strings, not actual line breaks.\n\
         \n\
         Format:\n\
         {{\n\
           \"executive_summary\": \"1-2 sentence overview\",\n\
           \"answer\": \"Main teaching (3-5 paragraphs with \\n\\n between paragraphs)\",\n\
           \"explanation\": \"Practical application (2-3 paragraphs with \\n\\n between paragraphs)\",\n\
           \"related_topics\": [\"topic1\", \"topic2\", \"topic3\"]\n\
         }}",
        level = guidance.level.as_str(),
        style = guidance.style,
        depth = guidance.depth,
        tone = guidance.tone,
    );

    let raw = llm
        .generate(&prompt, GenOptions::with_max_tokens(MAX_TOKENS))
        .await?;

    let outcome = match extract_json::<TeachingResult>(&raw) {
        Ok(teaching) => SynthesisOutcome::Clean(teaching),
        Err(e) => {
            warn!(detail = %e.detail, "step5: reply did not parse, using fallback teaching");
            SynthesisOutcome::Degraded {
                teaching: fallback_teaching(&raw),
                reason: e.detail,
            }
        }
    };

    let teaching = outcome.teaching();
    debug!(
        degraded = outcome.is_degraded(),
        answer_len = teaching.answer.len(),
        "step5: teaching formulated"
    );

    let step = ExecutionStep::new(
        5,
        STEP_NAME,
        StepType::Synthesis,
        json!({
            "verses_referenced": verses.len(),
            "answer_length": teaching.answer.len(),
            "user_level": guidance.level.as_str(),
            "degraded": outcome.is_degraded(),
        }),
        started.elapsed().as_millis() as u64,
    );

    Ok((outcome, step))
}

/// Fixed teaching skeleton used when the reply cannot be parsed.
fn fallback_teaching(raw: &str) -> TeachingResult {
    TeachingResult {
        executive_summary:
            "The Gita teaches performing duty without attachment to results (Nishkama Karma)."
                .to_string(),
        answer: raw.chars().take(FALLBACK_ANSWER_CHARS).collect(),
        explanation:
            "This principle of Karma Yoga guides us to focus on our actions while surrendering outcomes."
                .to_string(),
        related_topics: vec![
            "Karma Yoga".to_string(),
            "Nishkama Karma".to_string(),
            "Detachment".to_string(),
        ],
    }
}
