//! Guided-answer pipeline for the Sage backend.
//!
//! Turns one spiritual question into a verse-grounded teaching through six
//! ordered stages, each contributing a typed intermediate and an execution
//! step for the trace. The pipeline talks to the outside world only through
//! two traits: [`llm_service::TextGenerator`] for text generation and
//! [`gita_store::VerseStore`] for the corpus.
//!
//! Entry point: [`GuidePipeline::run`].

pub mod error;
pub mod extract;
pub mod models;
pub mod steps;

mod concepts;

pub use error::PipelineError;
pub use models::{
    ExecutionStep, GuideAnswer, GuideRequest, PipelineRun, StepType, UserLevel, VerseRef,
};
pub use steps::{GuidePipeline, MAX_CONTEXT_CHARS, MAX_QUESTION_CHARS};
