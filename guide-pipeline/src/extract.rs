//! Structured extraction from model replies.
//!
//! Generation providers do not guarantee well-formed output: replies are
//! frequently wrapped in markdown code fences or surrounded by prose. This
//! module is the single place where raw text becomes a validated typed
//! record — malformed text never propagates as valid domain data.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// The reply could not be parsed as the requested shape.
#[derive(Debug, Error)]
#[error("structured extraction failed: {detail}")]
pub struct ExtractError {
    /// Serde error plus a short, log-safe reply preview.
    pub detail: String,
}

/// Parses `raw` as JSON of type `T`, tolerating common reply wrappers.
///
/// Strategy:
/// 1. strip ```json / ``` code fences and trim;
/// 2. try a direct parse;
/// 3. if the reply has prose around the object, retry on the outermost
///    `{...}` slice.
///
/// # Errors
/// Returns [`ExtractError`] when no strategy yields valid `T`.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let clean = strip_fences(raw);

    match serde_json::from_str::<T>(&clean) {
        Ok(v) => Ok(v),
        Err(first_err) => {
            if let Some(slice) = outer_object(&clean) {
                if let Ok(v) = serde_json::from_str::<T>(slice) {
                    return Ok(v);
                }
            }
            Err(ExtractError {
                detail: format!("{first_err}; reply preview: {}", preview(&clean)),
            })
        }
    }
}

/// Trim common code-fence wrappers around JSON.
fn strip_fences(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

/// Outermost `{...}` slice, if any.
fn outer_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end > start { Some(&s[start..=end]) } else { None }
}

fn preview(s: &str) -> String {
    s.chars().take(160).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        topic: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn parses_bare_json() {
        let r: Reply = extract_json(r#"{"topic": "dharma", "tags": ["duty"]}"#).unwrap();
        assert_eq!(r.topic, "dharma");
        assert_eq!(r.tags, vec!["duty"]);
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"topic\": \"karma\"}\n```";
        let r: Reply = extract_json(raw).unwrap();
        assert_eq!(r.topic, "karma");
    }

    #[test]
    fn parses_fenced_json_without_language_tag() {
        let raw = "```\n{\"topic\": \"moksha\"}\n```";
        let r: Reply = extract_json(raw).unwrap();
        assert_eq!(r.topic, "moksha");
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let raw = "Here is the analysis you asked for:\n{\"topic\": \"yoga\"}\nHope it helps!";
        let r: Reply = extract_json(raw).unwrap();
        assert_eq!(r.topic, "yoga");
    }

    #[test]
    fn rejects_garbage() {
        let err = extract_json::<Reply>("the model had a bad day").unwrap_err();
        assert!(err.detail.contains("reply preview"));
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(extract_json::<Reply>(r#"{"totally": "different"}"#).is_err());
    }
}
