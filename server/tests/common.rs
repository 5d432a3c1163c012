#![allow(dead_code)]
//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on an ephemeral port, wired to a mock listing site
//! (wiremock) and a scripted completion service.

use async_trait::async_trait;
use pib_scraper::ai::CompletionService;
use pib_scraper::config::PipelineConfig;
use pib_scraper::error::{Error, Result};
use pib_scraper::pipeline::Pipeline;
use pib_server::{app, state::AppState};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct ScriptedCompletion {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.reply.is_empty() {
            return Err(Error::CompletionApi("no reply scripted".into()));
        }
        Ok(self.reply.clone())
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub site: MockServer,
    pub service: Arc<ScriptedCompletion>,
    pub state: AppState,
    _server_handle: JoinHandle<()>,
}

const FORM_PAGE: &str = r#"<form>
  <input type="hidden" id="__VIEWSTATE" value="vs" />
  <input type="hidden" id="__VIEWSTATEGENERATOR" value="gen" />
  <input type="hidden" id="__EVENTVALIDATION" value="ev" />
</form>"#;

impl TestApp {
    /// Spawns the server. The mock site lists `titles` for every postback, each linking to
    /// `/article/{i}`; `reply` is what the completion service answers to every prompt.
    pub async fn spawn(titles: &[&str], reply: &str) -> anyhow::Result<Self> {
        let site = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/allRel.aspx"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FORM_PAGE))
            .mount(&site)
            .await;

        let links: String = titles
            .iter()
            .enumerate()
            .map(|(i, t)| format!(r#"<a href="/article/{i}?relid={i}" title="{t}">{t}</a>"#))
            .collect();
        Mock::given(method("POST"))
            .and(path("/allRel.aspx"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!(r#"<div class="content-area">{links}</div>"#)),
            )
            .mount(&site)
            .await;

        let service = Arc::new(ScriptedCompletion {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let config = PipelineConfig {
            base_url: format!("{}/allRel.aspx?reg=3&lang=1", site.uri()),
            batch_size: 50,
            concurrency: 4,
            http_timeout: Duration::from_secs(5),
            article_timeout: Duration::from_secs(2),
        };
        let pipeline = Pipeline::new(&config, service.clone())?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = format!("http://{}", listener.local_addr()?);
        let state = AppState::new(pipeline);
        let router = app(state.clone(), None);
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Ok(Self {
            address,
            client: reqwest::Client::new(),
            site,
            service,
            state,
            _server_handle: server_handle,
        })
    }

    pub async fn mount_article(&self, i: usize, html: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/article/{i}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
            .mount(&self.site)
            .await;
    }

    pub async fn start_run(&self, body: &Value) -> anyhow::Result<String> {
        let created: Value = self
            .client
            .post(format!("{}/api/runs", self.address))
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        Ok(created["run_id"].as_str().unwrap_or_default().to_string())
    }

    pub async fn poll(&self, run_id: &str) -> anyhow::Result<Value> {
        Ok(self
            .client
            .get(format!("{}/api/runs/{run_id}", self.address))
            .send()
            .await?
            .json()
            .await?)
    }

    /// Starts a run and polls it until it reaches a terminal status.
    pub async fn run_to_completion(&self, body: Value) -> anyhow::Result<Value> {
        Ok(self.finish_run(body).await?.1)
    }

    /// Like `run_to_completion`, also returning the run id.
    pub async fn finish_run(&self, body: Value) -> anyhow::Result<(String, Value)> {
        let run_id = self.start_run(&body).await?;
        for _ in 0..100 {
            let status = self.poll(&run_id).await?;
            if matches!(status["status"].as_str(), Some("complete") | Some("no_data")) {
                return Ok((run_id, status));
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("run {run_id} did not finish")
    }
}
