#![allow(dead_code)]
//! Shared fixtures: a scripted completion service and a mock listing site.

use async_trait::async_trait;
use pib_scraper::ai::CompletionService;
use pib_scraper::config::PipelineConfig;
use pib_scraper::error::{Error, Result};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

type Responder = dyn Fn(&str) -> std::result::Result<String, String> + Send + Sync;

/// Answers every prompt through a closure and records what it was asked.
pub struct ScriptedCompletion {
    responder: Box<Responder>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(reply: &str) -> Arc<Self> {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt).map_err(Error::CompletionApi)
    }
}

pub const FORM_PAGE: &str = r#"<html><body><form method="post">
  <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="vs-token" />
  <input type="hidden" name="__VIEWSTATEGENERATOR" id="__VIEWSTATEGENERATOR" value="gen-token" />
  <input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="ev-token" />
</form></body></html>"#;

/// Listing HTML with one relative release link per title.
pub fn listing_page(prefix: &str, titles: &[&str]) -> String {
    let links: String = titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!(r#"<li><a href="/PressReleasePage.aspx?PRID={prefix}{i}" title="{t}">{t}</a></li>"#))
        .collect();
    format!(r#"<html><body><div class="content-area"><ul>{links}</ul></div></body></html>"#)
}

pub async fn mount_form(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/allRel.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORM_PAGE))
        .mount(server)
        .await;
}

/// Serves `titles` for postbacks selecting `month`.
pub async fn mount_month(server: &MockServer, month: u32, titles: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/allRel.aspx"))
        .and(body_string_contains("__VIEWSTATE=vs-token"))
        .and(body_string_contains(format!("ddlMonth={month}&")))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&format!("{month}0"), titles)))
        .mount(server)
        .await;
}

pub fn config_for(server: &MockServer) -> PipelineConfig {
    PipelineConfig {
        base_url: format!("{}/allRel.aspx?reg=3&lang=1", server.uri()),
        batch_size: 50,
        concurrency: 4,
        http_timeout: Duration::from_secs(5),
        article_timeout: Duration::from_millis(500),
    }
}
