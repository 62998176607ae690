//! Step 1: Understand Intent — classify the question's topic and intent.

use std::time::Instant;

use llm_service::{GenOptions, TextGenerator};
use serde_json::json;
use tracing::debug;

use crate::concepts::KEY_CONCEPTS;
use crate::error::PipelineError;
use crate::extract::extract_json;
use crate::models::{ExecutionStep, IntentAnalysis, StepType};

pub(crate) const STEP_NAME: &str = "Understand Intent";
const MAX_TOKENS: u32 = 500;

/// Issues one generation call and parses the reply into [`IntentAnalysis`].
///
/// A malformed reply is a hard failure for the whole pipeline — every later
/// stage depends on this structure, so there is no fallback here.
pub(crate) async fn understand_intent(
    llm: &dyn TextGenerator,
    question: &str,
) -> Result<(IntentAnalysis, ExecutionStep), PipelineError> {
    let started = Instant::now();

    let prompt = format!(
        "Analyze this spiritual question and extract the core intent and key concepts.\n\
         \n\
         Question: {question}\n\
         \n\
         Identify:\n\
         1. The main spiritual topic or concern\n\
         2. Key Bhagavad Gita concepts that might be relevant (from: {concepts}, etc.)\n\
         3. The type of guidance being sought (understanding, practical application, resolution of doubt, etc.)\n\
         4. Any specific life situations or challenges mentioned\n\
         \n\
         Respond in JSON format:\n\
         {{\n\
           \"core_topic\": \"brief description\",\n\
           \"key_concepts\": [\"concept1\", \"concept2\"],\n\
           \"guidance_type\": \"type of guidance sought\",\n\
           \"life_context\": \"specific situation if mentioned, otherwise null\"\n\
         }}",
        concepts = KEY_CONCEPTS[..10].join(", "),
    );

    let raw = llm
        .generate(&prompt, GenOptions::with_max_tokens(MAX_TOKENS))
        .await?;

    let intent: IntentAnalysis =
        extract_json(&raw).map_err(|e| PipelineError::MalformedReply {
            stage: STEP_NAME,
            detail: e.detail,
        })?;

    debug!(
        topic = %intent.core_topic,
        concepts = intent.key_concepts.len(),
        "step1: intent classified"
    );

    let step = ExecutionStep::new(
        1,
        STEP_NAME,
        StepType::Analysis,
        json!({
            "question": question,
            "identified_topic": intent.core_topic,
            "key_concepts": intent.key_concepts,
            "guidance_type": intent.guidance_type,
        }),
        started.elapsed().as_millis() as u64,
    );

    Ok((intent, step))
}
