//! Language-model backends.
//!
//! Each backend implements [`TextGenerator`](crate::TextGenerator) for one
//! provider dialect.

mod openai;

pub use openai::{OPENAI_BASE_URL, OpenAiBackend, OpenAiBackendBuilder};
