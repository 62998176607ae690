//! Step 2: Retrieve Verses — semantic selection over the full corpus.
//!
//! The corpus is listed once (identifiers + translations only), the model
//! selects 3-5 verse ids with a per-verse relevance justification, and
//! commentary is then fetched **only** for the retained ids. That second
//! round trip scales with result size, not corpus size.

use std::collections::HashMap;
use std::time::Instant;

use gita_store::VerseStore;
use llm_service::{GenOptions, TextGenerator};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::extract::extract_json;
use crate::models::{ExecutionStep, IntentAnalysis, SelectedVerse, StepType};

pub(crate) const STEP_NAME: &str = "Retrieve Verses";
const MAX_TOKENS: u32 = 1500;

/// Upper bound on selected verses; anything past it is dropped.
const MAX_SELECTED: usize = 5;

/// Commentary excerpts are capped to keep the synthesis prompt bounded.
const COMMENTARY_EXCERPT_CHARS: usize = 500;

/// Model reply shape for the selection call.
#[derive(Debug, Deserialize)]
struct SelectionReply {
    #[serde(default)]
    selected_verses: Vec<SelectionItem>,
}

#[derive(Debug, Deserialize)]
struct SelectionItem {
    verse_id: String,
    #[serde(default)]
    relevance: String,
}

/// Selects the most relevant verses for the question.
///
/// Identifiers the model invents are dropped, never fabricated into verses.
/// Zero valid selections is a success with an empty list — the synthesis
/// stage handles an ungrounded teaching gracefully.
pub(crate) async fn retrieve_verses(
    store: &dyn VerseStore,
    llm: &dyn TextGenerator,
    intent: &IntentAnalysis,
    question: &str,
) -> Result<(Vec<SelectedVerse>, ExecutionStep), PipelineError> {
    let started = Instant::now();

    // Commentary is deferred: candidates carry ids and translations only.
    let corpus = store.list_verses().await?;
    let candidates: Vec<_> = corpus
        .iter()
        .map(|v| {
            json!({
                "verse_id": v.verse_id,
                "translation": v.translation,
            })
        })
        .collect();

    let prompt = format!(
        "Given this spiritual question and the identified key concepts, select the 3-5 most relevant Bhagavad Gita verses.\n\
         \n\
         Question: {question}\n\
         Core Topic: {topic}\n\
         Key Concepts: {concepts}\n\
         \n\
         Available verses (showing translation):\n\
         {verses}\n\
         \n\
         Select the most relevant verses and explain why each is relevant to the question.\n\
         Only use verse_id values from the list above.\n\
         \n\
         Respond in JSON format:\n\
         {{\n\
           \"selected_verses\": [\n\
             {{\n\
               \"verse_id\": \"BG2.47\",\n\
               \"relevance\": \"explanation of why this verse is relevant\"\n\
             }}\n\
           ]\n\
         }}\n\
         \n\
         Select 3-5 verses maximum.",
        topic = intent.core_topic,
        concepts = intent.key_concepts.join(", "),
        verses = serde_json::to_string(&candidates).unwrap_or_default(),
    );

    let raw = llm
        .generate(&prompt, GenOptions::with_max_tokens(MAX_TOKENS))
        .await?;

    let selection: SelectionReply =
        extract_json(&raw).map_err(|e| PipelineError::MalformedReply {
            stage: STEP_NAME,
            detail: e.detail,
        })?;

    let by_id: HashMap<&str, &gita_store::Verse> =
        corpus.iter().map(|v| (v.verse_id.as_str(), v)).collect();

    // Keep selection order (it encodes the model's relevance ranking) and
    // drop hallucinated ids.
    let mut selected = Vec::new();
    for item in selection.selected_verses.into_iter() {
        if selected.len() >= MAX_SELECTED {
            break;
        }
        let Some(verse) = by_id.get(item.verse_id.as_str()) else {
            warn!(verse_id = %item.verse_id, "step2: dropped verse id not present in corpus");
            continue;
        };

        // Second store round trip, for this verse only.
        let commentary = store
            .commentary_for(&verse.verse_id, 1)
            .await?
            .into_iter()
            .next()
            .map(|c| c.commentary.chars().take(COMMENTARY_EXCERPT_CHARS).collect());

        selected.push(SelectedVerse {
            verse: (*verse).clone(),
            relevance: item.relevance,
            commentary,
        });
    }

    debug!(
        corpus = corpus.len(),
        selected = selected.len(),
        "step2: verses retrieved"
    );

    let step = ExecutionStep::new(
        2,
        STEP_NAME,
        StepType::Search,
        json!({
            "total_verses_searched": corpus.len(),
            "verses_selected": selected.len(),
            "selected_verse_ids": selected
                .iter()
                .map(|s| s.verse.verse_id.clone())
                .collect::<Vec<_>>(),
        }),
        started.elapsed().as_millis() as u64,
    );

    Ok((selected, step))
}
