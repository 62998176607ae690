//! Step 6: Suggest Next Steps — follow-up questions from the teaching.
//!
//! Unlike step 5 there is no fallback here: a malformed reply fails the
//! request. A successful response always carries 3-5 suggestions.

use std::time::Instant;

use llm_service::{GenOptions, TextGenerator};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::PipelineError;
use crate::extract::extract_json;
use crate::models::{ExecutionStep, StepType, TeachingResult};

pub(crate) const STEP_NAME: &str = "Suggest Next Steps";
const MAX_TOKENS: u32 = 500;

/// At most five suggestions survive, matching what the prompt asks for.
const MAX_SUGGESTIONS: usize = 5;

/// Model reply shape for the suggestion call.
#[derive(Debug, Deserialize)]
struct SuggestionReply {
    suggested_questions: Vec<String>,
}

/// Proposes 3-5 follow-up questions building on the teaching.
pub(crate) async fn suggest_next_steps(
    llm: &dyn TextGenerator,
    question: &str,
    teaching: &TeachingResult,
) -> Result<(Vec<String>, ExecutionStep), PipelineError> {
    let started = Instant::now();

    let prompt = format!(
        "Based on this spiritual teaching, suggest 3-5 follow-up questions that would deepen the seeker's understanding.\n\
         \n\
         Original Question: {question}\n\
         Teaching Summary: {summary}\n\
         Related Topics: {topics}\n\
         \n\
         Create questions that:\n\
         1. Build naturally from this teaching\n\
         2. Explore related concepts from the Gita\n\
         3. Help the seeker apply these teachings more deeply\n\
         4. Encourage progressive spiritual development\n\
         \n\
         Respond in JSON format:\n\
         {{\n\
           \"suggested_questions\": [\n\
             \"Question 1?\",\n\
             \"Question 2?\",\n\
             \"Question 3?\"\n\
           ]\n\
         }}\n\
         \n\
         Provide 3-5 questions.",
        summary = teaching.executive_summary,
        topics = teaching.related_topics.join(", "),
    );

    let raw = llm
        .generate(&prompt, GenOptions::with_max_tokens(MAX_TOKENS))
        .await?;

    let reply: SuggestionReply =
        extract_json(&raw).map_err(|e| PipelineError::MalformedReply {
            stage: STEP_NAME,
            detail: e.detail,
        })?;

    let mut questions = reply.suggested_questions;
    questions.truncate(MAX_SUGGESTIONS);

    debug!(count = questions.len(), "step6: follow-ups suggested");

    let step = ExecutionStep::new(
        6,
        STEP_NAME,
        StepType::Guidance,
        json!({
            "suggested_questions_count": questions.len(),
            "related_topics_count": teaching.related_topics.len(),
        }),
        started.elapsed().as_millis() as u64,
    );

    Ok((questions, step))
}
