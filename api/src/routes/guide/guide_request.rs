use guide_pipeline::{GuideAnswer, UserLevel};
use serde::{Deserialize, Serialize};

/// Request payload for /guide.
#[derive(Debug, Deserialize)]
pub struct GuideRequestBody {
    /// The seeker's question (trimmed, non-empty, at most 500 characters).
    pub question: String,
    /// Knowledge level; defaults to beginner when omitted.
    #[serde(default)]
    pub user_level: UserLevel,
    /// Optional prior-answer text for conversational continuity.
    #[serde(default)]
    pub context: Option<String>,
}

/// Response payload for /guide.
#[derive(Debug, Serialize)]
pub struct GuideResponseBody {
    /// The verse-grounded teaching.
    pub answer: GuideAnswer,
    /// Sum of per-stage durations in milliseconds (excludes transport and
    /// validation overhead, so it will differ from observed latency).
    pub execution_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_level_defaults_to_beginner_when_omitted() {
        let body: GuideRequestBody =
            serde_json::from_str(r#"{"question":"What is dharma?"}"#).unwrap();
        assert_eq!(body.user_level, UserLevel::Beginner);
        assert!(body.context.is_none());
    }

    #[test]
    fn user_level_accepts_lowercase_tags() {
        let body: GuideRequestBody = serde_json::from_str(
            r#"{"question":"What is dharma?","user_level":"advanced","context":"prior"}"#,
        )
        .unwrap();
        assert_eq!(body.user_level, UserLevel::Advanced);
        assert_eq!(body.context.as_deref(), Some("prior"));
    }
}
