//! Language-model calling interface.

pub mod errors;
pub mod types;

pub use errors::ModelError;
pub use types::{GenerateRequest, GenerateResponse, JsonResponse, TextGenerator};
