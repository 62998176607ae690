//! Step 3: Check Context — reconcile the question with prior conversation.
//!
//! Cost varies: zero generation calls without caller-supplied context,
//! exactly one with it. Either branch emits a step so the trace stays a
//! complete six-element ledger.

use std::time::Instant;

use llm_service::{GenOptions, TextGenerator};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::PipelineError;
use crate::extract::extract_json;
use crate::models::{ContextData, ExecutionStep, StepType};

pub(crate) const STEP_NAME: &str = "Check Context";
const MAX_TOKENS: u32 = 500;

/// Model reply shape for the reconciliation call.
#[derive(Debug, Deserialize)]
struct ContextReply {
    #[serde(default)]
    is_followup: bool,
    #[serde(default)]
    context_summary: Option<String>,
    #[serde(default)]
    key_points_to_address: Vec<String>,
}

/// Determines how the prior context relates to the current question.
pub(crate) async fn check_context(
    llm: &dyn TextGenerator,
    question: &str,
    context: Option<&str>,
) -> Result<(ContextData, ExecutionStep), PipelineError> {
    let started = Instant::now();

    let data = match context {
        None => ContextData::none(),
        Some(prior) => {
            let prompt = format!(
                "Analyze the conversation context and determine how it relates to the current question.\n\
                 \n\
                 Previous Context: {prior}\n\
                 Current Question: {question}\n\
                 \n\
                 Determine:\n\
                 1. Is this a follow-up question to the previous context?\n\
                 2. What key points from the context should inform the answer?\n\
                 3. Are there any contradictions or shifts in the user's inquiry?\n\
                 \n\
                 Respond in JSON format:\n\
                 {{\n\
                   \"is_followup\": true,\n\
                   \"context_summary\": \"brief summary of relevant context\",\n\
                   \"key_points_to_address\": [\"point1\", \"point2\"]\n\
                 }}"
            );

            let raw = llm
                .generate(&prompt, GenOptions::with_max_tokens(MAX_TOKENS))
                .await?;

            let reply: ContextReply =
                extract_json(&raw).map_err(|e| PipelineError::MalformedReply {
                    stage: STEP_NAME,
                    detail: e.detail,
                })?;

            ContextData {
                has_previous_context: true,
                context_summary: reply.context_summary,
                conversation_continuation: reply.is_followup,
                key_points: reply.key_points_to_address,
            }
        }
    };

    debug!(
        has_context = data.has_previous_context,
        followup = data.conversation_continuation,
        "step3: context checked"
    );

    let step = ExecutionStep::new(
        3,
        STEP_NAME,
        StepType::ContextAnalysis,
        serde_json::to_value(&data).unwrap_or_else(|_| json!({})),
        started.elapsed().as_millis() as u64,
    );

    Ok((data, step))
}
