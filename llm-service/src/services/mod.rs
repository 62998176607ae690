pub mod anthropic_service;
pub mod ollama_service;
