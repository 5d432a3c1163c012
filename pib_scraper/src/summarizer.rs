use crate::ai::CompletionService;
use std::sync::Arc;
use tracing::warn;

/// Turns article text into a Context / Data / Keywords summary.
#[derive(Clone)]
pub struct Summarizer {
    service: Arc<dyn CompletionService>,
}

impl Summarizer {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    /// Service failures come back as the summary text itself.
    pub async fn summarize(&self, text: &str) -> String {
        match self.service.complete(&build_prompt(text)).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "summarization failed");
                format!("Error: {e}")
            }
        }
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Summarize this press release.\n\
         \n\
         REQUIRED FORMAT:\n\
         Context- [What is the main event?]\n\
         Data- [Key numbers, amounts, dates]\n\
         Keywords- [3-5 tags]\n\
         \n\
         Do NOT include the URL in the summary.\n\
         Use proper spacing between sections.\n\
         \n\
         Text:\n\
         {text}"
    )
}
