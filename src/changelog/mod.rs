//! Changelog generation through a text-generation backend.

pub mod prompt;
mod summarizer;

pub use prompt::{create_system_prompt, create_user_prompt};
pub use summarizer::{CompletionBackend, OpenAiCompatibleBackend, summarize};
