use crate::config::ARTICLE_CHAR_LIMIT;
use crate::error::{Error, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Downloads an article page and keeps only its paragraph text.
pub struct ArticleFetcher {
    client: Client,
}

impl ArticleFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(Error::ClientBuild)?;
        Ok(Self { client })
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.client.get(url).send().await?.text().await?;
        let text = extract_paragraph_text(&body, ARTICLE_CHAR_LIMIT);
        debug!(url, chars = text.chars().count(), "fetched article text");
        Ok(text)
    }
}

/// Trimmed, non-empty `<p>` texts joined by single spaces, cut to `limit` characters.
pub fn extract_paragraph_text(html: &str, limit: usize) -> String {
    let doc = Html::parse_document(html);
    let paragraph_selector = Selector::parse("p").unwrap();

    let text = doc
        .select(&paragraph_selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    match text.char_indices().nth(limit) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
