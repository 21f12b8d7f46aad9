//! Text-generation service boundary.
//!
//! Agents consume the reasoning service through the `TextGenerator`
//! trait; the Ollama-backed implementation lives in `client`.

pub mod client;

pub use client::{GenerateOptions, LlmConfig, OllamaClient, TextGenerator};
