//! Six-step guided-answer workflow.
//!
//! Flow:
//!   1) Understand Intent — classify topic/concepts (1 generation call);
//!   2) Retrieve Verses — corpus listing + model selection + commentary for
//!      the selected subset only;
//!   3) Check Context — reconcile prior conversation (0 or 1 calls);
//!   4) Adapt to Level — pure profile lookup (free);
//!   5) Formulate Teaching — grounded synthesis, local fallback on parse
//!      failure;
//!   6) Suggest Next Steps — follow-up questions.
//!
//! Stages run strictly in order: each stage's output is an explicit input
//! to later stages, never implicit shared state. Every stage emits exactly
//! one [`ExecutionStep`]; a fatal stage error aborts the remaining stages
//! and the request fails atomically — no partial answer is assembled.

mod context;
mod followup;
mod intent;
mod level;
mod retrieve;
mod teaching;

use std::sync::Arc;

use gita_store::VerseStore;
use llm_service::TextGenerator;
use tracing::info;

use crate::error::PipelineError;
use crate::models::{ExecutionStep, GuideAnswer, GuideRequest, PipelineRun, VerseRef};

/// Questions above this length are rejected up front.
pub const MAX_QUESTION_CHARS: usize = 500;

/// Caller-supplied context is truncated to this length before use.
pub const MAX_CONTEXT_CHARS: usize = 1000;

/// The guided-answer pipeline.
///
/// Holds the two external capabilities behind their traits; construct once
/// and share via `Arc`. The pipeline itself keeps no cross-request state.
pub struct GuidePipeline {
    llm: Arc<dyn TextGenerator>,
    store: Arc<dyn VerseStore>,
}

impl GuidePipeline {
    pub fn new(llm: Arc<dyn TextGenerator>, store: Arc<dyn VerseStore>) -> Self {
        Self { llm, store }
    }

    /// Runs the complete six-step workflow for one request.
    ///
    /// The returned [`PipelineRun`] carries the answer, the full six-element
    /// trace, and `execution_time_ms` — the sum of per-step durations, not
    /// wall-clock request time.
    ///
    /// # Errors
    /// - [`PipelineError::Validation`] for empty/oversized questions
    /// - [`PipelineError::MalformedReply`] for fatal parse failures
    ///   (stages 1, 2, 3, 6)
    /// - [`PipelineError::Llm`] / [`PipelineError::Store`] when an outbound
    ///   call fails; no stage retries internally
    pub async fn run(&self, request: GuideRequest) -> Result<PipelineRun, PipelineError> {
        let question = request.question.trim().to_string();
        if question.is_empty() {
            return Err(PipelineError::Validation("question must not be empty".into()));
        }
        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(PipelineError::Validation(format!(
                "question must be at most {MAX_QUESTION_CHARS} characters"
            )));
        }

        let context: Option<String> = request
            .context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| c.chars().take(MAX_CONTEXT_CHARS).collect());

        let mut trace: Vec<ExecutionStep> = Vec::with_capacity(6);

        // Step 1: Understand Intent
        let (intent, step1) = intent::understand_intent(self.llm.as_ref(), &question).await?;
        trace.push(step1);

        // Step 2: Retrieve Verses
        let (verses, step2) =
            retrieve::retrieve_verses(self.store.as_ref(), self.llm.as_ref(), &intent, &question)
                .await?;
        trace.push(step2);

        // Step 3: Check Context
        let (context_data, step3) =
            context::check_context(self.llm.as_ref(), &question, context.as_deref()).await?;
        trace.push(step3);

        // Step 4: Adapt to Level
        let (guidance, step4) = level::adapt_to_level(request.user_level);
        trace.push(step4);

        // Step 5: Formulate Teaching
        let (outcome, step5) = teaching::formulate_teaching(
            self.llm.as_ref(),
            &question,
            &verses,
            &context_data,
            &guidance,
        )
        .await?;
        trace.push(step5);

        // Step 6: Suggest Next Steps
        let (suggestions, step6) =
            followup::suggest_next_steps(self.llm.as_ref(), &question, outcome.teaching()).await?;
        trace.push(step6);

        let execution_time_ms = trace.iter().map(|s| s.duration_ms).sum();
        let teaching = outcome.teaching();

        info!(
            verses = verses.len(),
            suggestions = suggestions.len(),
            degraded = outcome.is_degraded(),
            execution_time_ms,
            "guided answer complete"
        );

        let answer = GuideAnswer {
            teaching: teaching.answer.clone(),
            executive_summary: teaching.executive_summary.clone(),
            explanation: teaching.explanation.clone(),
            verse_references: verses.iter().map(VerseRef::from).collect(),
            related_topics: teaching.related_topics.clone(),
            suggested_questions: suggestions,
        };

        Ok(PipelineRun {
            answer,
            trace,
            execution_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use gita_store::{Commentary, JsonVerseStore, StoreError, Verse, VerseStore};
    use llm_service::config::llm_provider::LlmProvider;
    use llm_service::error_handler::{LlmError, ProviderError, ProviderErrorKind};
    use llm_service::{GenOptions, TextGenerator};
    use tokio::sync::Mutex;

    use super::*;
    use crate::models::{StepType, UserLevel};

    /// Generator replaying a fixed script; counts every call.
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str, _opts: GenOptions) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies.lock().await.pop_front().ok_or_else(|| {
                // Script exhausted: behaves like a provider outage.
                ProviderError::new(LlmProvider::Ollama, ProviderErrorKind::EmptyCompletion).into()
            })
        }
    }

    /// Store wrapper counting commentary round trips.
    struct CountingStore {
        inner: JsonVerseStore,
        commentary_calls: AtomicUsize,
    }

    impl CountingStore {
        fn new(inner: JsonVerseStore) -> Arc<Self> {
            Arc::new(Self {
                inner,
                commentary_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VerseStore for CountingStore {
        async fn list_verses(&self) -> Result<Vec<Verse>, StoreError> {
            self.inner.list_verses().await
        }

        async fn commentary_for(
            &self,
            verse_id: &str,
            limit: usize,
        ) -> Result<Vec<Commentary>, StoreError> {
            self.commentary_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.commentary_for(verse_id, limit).await
        }
    }

    fn corpus() -> JsonVerseStore {
        let verses = vec![
            verse("BG2.47", 2, 47, "You have a right to perform your duty."),
            verse("BG2.48", 2, 48, "Perform your duty equipoised."),
            verse("BG3.5", 3, 5, "Everyone is forced to act helplessly."),
            verse("BG4.7", 4, 7, "Whenever there is a decline in righteousness."),
        ];
        let commentaries = vec![Commentary {
            verse_id: "BG2.47".to_string(),
            author_name: "Shankara".to_string(),
            commentary: "c".repeat(800),
        }];
        JsonVerseStore::from_parts(verses, commentaries).unwrap()
    }

    fn verse(id: &str, chapter: u32, number: u32, translation: &str) -> Verse {
        Verse {
            verse_id: id.to_string(),
            chapter,
            verse: number,
            sanskrit: "श्लोक".to_string(),
            transliteration: "śloka".to_string(),
            translation: translation.to_string(),
        }
    }

    const INTENT_REPLY: &str = r#"{
        "core_topic": "the nature of duty",
        "key_concepts": ["Dharma", "Karma Yoga"],
        "guidance_type": "understanding",
        "life_context": null
    }"#;

    const SELECTION_REPLY: &str = r#"{
        "selected_verses": [
            { "verse_id": "BG2.47", "relevance": "directly about duty" },
            { "verse_id": "BG2.48", "relevance": "equanimity in action" },
            { "verse_id": "BG3.5", "relevance": "action is unavoidable" }
        ]
    }"#;

    const CONTEXT_REPLY: &str = r#"{
        "is_followup": true,
        "context_summary": "We discussed acting without attachment.",
        "key_points_to_address": ["detachment from results"]
    }"#;

    const TEACHING_REPLY: &str = r#"{
        "executive_summary": "Dharma is your sacred duty.",
        "answer": "Dharma means righteous duty.\n\nIt is discovered, not chosen.",
        "explanation": "Begin by observing where duty and desire conflict.",
        "related_topics": ["Svadharma", "Karma Yoga"]
    }"#;

    const FOLLOWUP_REPLY: &str = r#"{
        "suggested_questions": [
            "What is svadharma?",
            "How do I act without attachment?",
            "What does the Gita say about doubt?"
        ]
    }"#;

    fn request(question: &str, context: Option<&str>) -> GuideRequest {
        GuideRequest {
            question: question.to_string(),
            user_level: UserLevel::Beginner,
            context: context.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn happy_path_without_context_skips_the_context_call() {
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            SELECTION_REPLY,
            TEACHING_REPLY,
            FOLLOWUP_REPLY,
        ]);
        let store = CountingStore::new(corpus());
        let pipeline = GuidePipeline::new(llm.clone(), store.clone());

        let run = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap();

        // Exactly four generation calls: stage 3 costs nothing without context.
        assert_eq!(llm.calls(), 4);

        assert!(!run.answer.teaching.is_empty());
        assert!(!run.answer.executive_summary.is_empty());
        assert!(run.answer.verse_references.len() <= 5);
        assert!(run.answer.suggested_questions.len() >= 3);
        assert!(run.answer.suggested_questions.len() <= 5);

        // Trace is a complete ledger: 6 steps, numbered 1..=6 in call order.
        assert_eq!(run.trace.len(), 6);
        for (i, step) in run.trace.iter().enumerate() {
            assert_eq!(step.step_number as usize, i + 1);
        }
        assert_eq!(run.trace[2].step_type, StepType::ContextAnalysis);
        assert_eq!(
            run.trace[2].details["has_previous_context"],
            serde_json::Value::Bool(false)
        );

        // Total time is the sum of step durations.
        let sum: u64 = run.trace.iter().map(|s| s.duration_ms).sum();
        assert_eq!(run.execution_time_ms, sum);
    }

    #[tokio::test]
    async fn context_branch_costs_exactly_one_extra_call() {
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            SELECTION_REPLY,
            CONTEXT_REPLY,
            TEACHING_REPLY,
            FOLLOWUP_REPLY,
        ]);
        let store = CountingStore::new(corpus());
        let pipeline = GuidePipeline::new(llm.clone(), store);

        let run = pipeline
            .run(request(
                "How do I practice this at work?",
                Some("Dharma means righteous duty. It is discovered, not chosen."),
            ))
            .await
            .unwrap();

        assert_eq!(llm.calls(), 5);
        assert_eq!(run.trace.len(), 6);
        assert_eq!(
            run.trace[2].details["conversation_continuation"],
            serde_json::Value::Bool(true)
        );
    }

    #[tokio::test]
    async fn commentary_is_fetched_only_for_selected_verses() {
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            SELECTION_REPLY,
            TEACHING_REPLY,
            FOLLOWUP_REPLY,
        ]);
        let store = CountingStore::new(corpus());
        let pipeline = GuidePipeline::new(llm, store.clone());

        let run = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap();

        let selected = run.answer.verse_references.len();
        let fetches = store.commentary_calls.load(Ordering::SeqCst);
        assert_eq!(selected, 3);
        assert!(fetches <= selected);
        assert!(selected <= 5);

        // The one stored commentary is truncated to the excerpt cap.
        // (Selected set includes BG2.47, whose commentary is 800 chars.)
        assert!(fetches >= 1);
    }

    #[tokio::test]
    async fn hallucinated_verse_ids_are_dropped() {
        let selection = r#"{
            "selected_verses": [
                { "verse_id": "BG2.47", "relevance": "real" },
                { "verse_id": "BG99.99", "relevance": "invented" }
            ]
        }"#;
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            selection,
            TEACHING_REPLY,
            FOLLOWUP_REPLY,
        ]);
        let pipeline = GuidePipeline::new(llm, CountingStore::new(corpus()));

        let run = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap();

        assert_eq!(run.answer.verse_references.len(), 1);
        assert_eq!(run.answer.verse_references[0].chapter, 2);
        assert_eq!(run.answer.verse_references[0].verse, 47);
    }

    #[tokio::test]
    async fn zero_valid_selections_still_succeeds() {
        let selection = r#"{ "selected_verses": [] }"#;
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            selection,
            TEACHING_REPLY,
            FOLLOWUP_REPLY,
        ]);
        let pipeline = GuidePipeline::new(llm, CountingStore::new(corpus()));

        let run = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap();

        assert!(run.answer.verse_references.is_empty());
        assert!(!run.answer.teaching.is_empty());
        assert_eq!(run.trace.len(), 6);
    }

    #[tokio::test]
    async fn malformed_intent_reply_is_fatal() {
        let llm = ScriptedGenerator::new(&["this is not json at all"]);
        let pipeline = GuidePipeline::new(llm, CountingStore::new(corpus()));

        let err = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::MalformedReply { stage, .. } if stage == "Understand Intent"
        ));
    }

    #[tokio::test]
    async fn malformed_teaching_reply_degrades_instead_of_failing() {
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            SELECTION_REPLY,
            "sorry, prose instead of the requested structure",
            FOLLOWUP_REPLY,
        ]);
        let pipeline = GuidePipeline::new(llm, CountingStore::new(corpus()));

        let run = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap();

        // Fallback teaching is substituted; default themes are visible.
        assert!(run.answer.executive_summary.contains("Nishkama Karma"));
        assert!(!run.answer.teaching.is_empty());
        assert!(
            run.answer
                .related_topics
                .contains(&"Karma Yoga".to_string())
        );
        assert_eq!(
            run.trace[4].details["degraded"],
            serde_json::Value::Bool(true)
        );
        assert_eq!(run.trace.len(), 6);
    }

    #[tokio::test]
    async fn malformed_followup_reply_is_fatal() {
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            SELECTION_REPLY,
            TEACHING_REPLY,
            "no questions today",
        ]);
        let pipeline = GuidePipeline::new(llm, CountingStore::new(corpus()));

        let err = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::MalformedReply { stage, .. } if stage == "Suggest Next Steps"
        ));
    }

    #[tokio::test]
    async fn upstream_call_failure_aborts_the_request() {
        // Script covers stage 1 only; stage 2's call fails like an outage.
        let llm = ScriptedGenerator::new(&[INTENT_REPLY]);
        let pipeline = GuidePipeline::new(llm, CountingStore::new(corpus()));

        let err = pipeline
            .run(request("What is dharma?", None))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Llm(_)));
    }

    #[tokio::test]
    async fn question_length_boundary() {
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            SELECTION_REPLY,
            TEACHING_REPLY,
            FOLLOWUP_REPLY,
        ]);
        let pipeline = GuidePipeline::new(llm, CountingStore::new(corpus()));

        // Exactly 500 characters is accepted.
        let ok = pipeline.run(request(&"q".repeat(500), None)).await;
        assert!(ok.is_ok());

        // 501 characters is rejected before any stage runs.
        let err = pipeline
            .run(request(&"q".repeat(501), None))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_question_is_rejected() {
        let llm = ScriptedGenerator::new(&[]);
        let pipeline = GuidePipeline::new(llm.clone(), CountingStore::new(corpus()));

        let err = pipeline.run(request("   ", None)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn blank_context_takes_the_free_branch() {
        let llm = ScriptedGenerator::new(&[
            INTENT_REPLY,
            SELECTION_REPLY,
            TEACHING_REPLY,
            FOLLOWUP_REPLY,
        ]);
        let pipeline = GuidePipeline::new(llm.clone(), CountingStore::new(corpus()));

        let run = pipeline
            .run(request("What is dharma?", Some("   ")))
            .await
            .unwrap();

        assert_eq!(llm.calls(), 4);
        assert_eq!(
            run.trace[2].details["has_previous_context"],
            serde_json::Value::Bool(false)
        );
    }
}
