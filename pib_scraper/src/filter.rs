use crate::ai::CompletionService;
use crate::error::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Asks the completion service which titles of one batch match a topic.
#[derive(Clone)]
pub struct RelevanceFilter {
    service: Arc<dyn CompletionService>,
}

impl RelevanceFilter {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    /// Returns batch-local indices. Bounds are not checked here.
    pub async fn filter(&self, titles: &[String], topic: &str) -> Result<BTreeSet<usize>> {
        if titles.is_empty() {
            return Ok(BTreeSet::new());
        }
        let prompt = build_prompt(titles, topic);
        let content = self.service.complete(&prompt).await?;
        debug!(response = %content.trim(), "relevance filter response");
        Ok(parse_indices(content.trim()))
    }
}

pub fn build_prompt(titles: &[String], topic: &str) -> String {
    let list_text = titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{i}. {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Which of these titles match the topic: \"{topic}\"?\n\
         Return ONLY index numbers (e.g. 0, 5). If none, return \"NONE\".\n\
         Titles:\n\
         {list_text}"
    )
}

/// `NONE` anywhere (any case) wins over digits; otherwise every digit run is an index.
pub fn parse_indices(content: &str) -> BTreeSet<usize> {
    if content.to_uppercase().contains("NONE") {
        return BTreeSet::new();
    }
    content
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse::<usize>().ok())
        .collect()
}
