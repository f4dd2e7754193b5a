//! Remote completion service access.

pub mod client;
pub mod gemini;
pub mod prompt;
pub mod schema;

pub use client::{CompletionClient, CompletionRequest, InlineDocument};
pub use gemini::GeminiClient;
