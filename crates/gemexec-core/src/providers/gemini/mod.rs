//! Gemini provider (Generative Language API, API key auth).

pub mod api;

pub use api::{DEFAULT_BASE_URL, GeminiClient, GeminiConfig, build_generate_request};
