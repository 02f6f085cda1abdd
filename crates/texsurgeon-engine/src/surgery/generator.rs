use std::future::Future;

/// The external text-generation service.
///
/// Implementations return the generated text or an error; an empty or
/// whitespace-only reply is treated by the orchestrator as a failed attempt.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// A generator that always answers with the same text.
///
/// Used to replay a previously captured response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedResponse(pub String);

impl TextGenerator for FixedResponse {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}
