/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// This enum distinguishes between a local Ollama runtime and the hosted
/// Anthropic Messages API.
///
/// Adding more providers in the future (e.g., OpenAI, Mistral API)
/// can be done by extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
    /// Anthropic Messages API (Claude models).
    Anthropic,
}
