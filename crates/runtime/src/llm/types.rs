use super::errors::ModelError;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

/// A structured-output contract for one call.
///
/// `schema` is a JSON Schema the reply text must conform to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonResponse {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl JsonResponse {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// Everything needed for one text generation.
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    pub json_response: Option<&'a JsonResponse>,
}

/// The text a model produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    pub text: String,
}

impl GenerateResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Trait for language-model providers.
///
/// Implementations make a single attempt per call; retrying is the
/// caller's job.
pub trait TextGenerator: Send + Sync {
    fn generate_text(
        &self,
        request: GenerateRequest<'_>,
    ) -> impl Future<Output = Result<GenerateResponse, ModelError>> + Send;
}

impl<T: TextGenerator> TextGenerator for std::sync::Arc<T> {
    fn generate_text(
        &self,
        request: GenerateRequest<'_>,
    ) -> impl Future<Output = Result<GenerateResponse, ModelError>> + Send {
        (**self).generate_text(request)
    }
}
