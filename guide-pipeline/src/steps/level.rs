//! Step 4: Adapt to Level — deterministic presentation profile lookup.
//!
//! Pure table lookup, zero generation calls, duration effectively 0 — but
//! the stage still emits a step so every run's trace has all six entries.

use serde_json::json;

use crate::models::{ExecutionStep, LevelGuidance, StepType, UserLevel};

pub(crate) const STEP_NAME: &str = "Adapt to Level";

/// Returns the fixed style/depth/tone profile for `level`.
pub(crate) fn adapt_to_level(level: UserLevel) -> (LevelGuidance, ExecutionStep) {
    let guidance = match level {
        UserLevel::Beginner => LevelGuidance {
            level,
            style: "Use simple language, explain Sanskrit terms, provide relatable examples",
            depth: "Focus on practical application and basic concepts",
            tone: "Warm, encouraging, accessible",
        },
        UserLevel::Intermediate => LevelGuidance {
            level,
            style: "Balance technical terms with explanations, draw connections between concepts",
            depth: "Explore philosophical nuances and interconnections",
            tone: "Engaging, intellectually stimulating",
        },
        UserLevel::Advanced => LevelGuidance {
            level,
            style: "Use philosophical terminology, reference commentaries, explore subtle meanings",
            depth: "Deep philosophical analysis, multiple interpretations, scholarly context",
            tone: "Profound, contemplative, scholarly",
        },
    };

    let step = ExecutionStep::new(
        4,
        STEP_NAME,
        StepType::Personalization,
        json!({
            "user_level": level.as_str(),
            "style_guidance": guidance.style,
            "depth_guidance": guidance.depth,
        }),
        0,
    );

    (guidance, step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_deterministic() {
        for level in [
            UserLevel::Beginner,
            UserLevel::Intermediate,
            UserLevel::Advanced,
        ] {
            let (a, _) = adapt_to_level(level);
            let (b, _) = adapt_to_level(level);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn levels_get_distinct_profiles() {
        let (beginner, _) = adapt_to_level(UserLevel::Beginner);
        let (advanced, _) = adapt_to_level(UserLevel::Advanced);
        assert_ne!(beginner.style, advanced.style);
        assert_ne!(beginner.tone, advanced.tone);
    }

    #[test]
    fn step_is_free_and_numbered_four() {
        let (_, step) = adapt_to_level(UserLevel::Beginner);
        assert_eq!(step.step_number, 4);
        assert_eq!(step.duration_ms, 0);
        assert_eq!(step.step_type, StepType::Personalization);
    }
}
