use crate::ai::CompletionService;
use crate::article::ArticleFetcher;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::filter::RelevanceFilter;
use crate::harvester::Harvester;
use crate::summarizer::Summarizer;
use crate::{pdf, DateSelection, HarvestDate, ListingItem};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// What a user asks one run to do. A blank topic disables filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub topic: String,
    pub selection: DateSelection,
}

/// Progress reported while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Harvesting { requests: usize },
    Filtering { completed: usize, total: usize },
}

/// The retained items of a completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineResult {
    pub topic: Option<String>,
    pub items: Vec<ListingItem>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Complete(PipelineResult),
    /// Harvesting produced nothing at all.
    NoData,
}

/// A rendered summary for one result item.
#[derive(Debug, Clone)]
pub struct SummaryArtifact {
    pub index: usize,
    pub title: String,
    pub summary: String,
    pub pdf: Vec<u8>,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub enum SummaryOutcome {
    Ready(SummaryArtifact),
    CouldNotFetch,
    RenderFailed(String),
}

/// Harvest → filter for runs, and fetch → summarize → render for single items.
pub struct Pipeline {
    harvester: Arc<Harvester>,
    filter: RelevanceFilter,
    fetcher: ArticleFetcher,
    summarizer: Summarizer,
    batch_size: usize,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig, service: Arc<dyn CompletionService>) -> Result<Self> {
        Ok(Self {
            harvester: Arc::new(Harvester::new(&config.base_url, config.http_timeout)?),
            filter: RelevanceFilter::new(service.clone()),
            fetcher: ArticleFetcher::new(config.article_timeout)?,
            summarizer: Summarizer::new(service),
            batch_size: config.batch_size.max(1),
            concurrency: config.concurrency.max(1),
        })
    }

    pub async fn run<F>(&self, request: &RunRequest, progress: F) -> RunOutcome
    where
        F: Fn(RunPhase) + Send + Sync,
    {
        let dates = request.selection.harvest_dates();
        progress(RunPhase::Harvesting { requests: dates.len() });
        let harvested = self.harvest_all(dates).await;
        if harvested.is_empty() {
            info!("no data found");
            return RunOutcome::NoData;
        }
        info!(count = harvested.len(), "scraped raw items");

        let topic = request.topic.trim();
        let items = if topic.is_empty() {
            harvested
        } else {
            self.filter_all(harvested, topic, &progress).await
        };
        info!(count = items.len(), "pipeline complete");

        RunOutcome::Complete(PipelineResult {
            topic: (!topic.is_empty()).then(|| topic.to_string()),
            items,
            completed_at: Some(Utc::now()),
        })
    }

    /// One harvest per date, merged back in request order. Failed harvests contribute nothing.
    async fn harvest_all(&self, dates: Vec<HarvestDate>) -> Vec<ListingItem> {
        let mut results = stream::iter(dates.into_iter().enumerate())
            .map(|(position, date)| {
                let harvester = Arc::clone(&self.harvester);
                async move { (position, date, harvester.harvest(date).await) }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        results.sort_by_key(|(position, _, _)| *position);

        results
            .into_iter()
            .flat_map(|(_, date, result)| match result {
                Ok(items) => items,
                Err(e) => {
                    warn!(label = %date.label(), error = %e, "harvest failed");
                    Vec::new()
                }
            })
            .collect()
    }

    /// Keeps matched items in their original order. A failed batch counts as "no matches".
    async fn filter_all<F>(&self, items: Vec<ListingItem>, topic: &str, progress: &F) -> Vec<ListingItem>
    where
        F: Fn(RunPhase) + Send + Sync,
    {
        let batches: Vec<&[ListingItem]> = items.chunks(self.batch_size).collect();
        let total = batches.len();
        progress(RunPhase::Filtering { completed: 0, total });

        let title_batches: Vec<Vec<String>> = batches
            .iter()
            .map(|batch| batch.iter().map(|item| item.title.clone()).collect())
            .collect();
        let mut pending = stream::iter(title_batches.into_iter().enumerate())
            .map(|(position, titles)| {
                let filter = self.filter.clone();
                let topic = topic.to_string();
                async move { (position, filter.filter(&titles, &topic).await) }
            })
            .buffer_unordered(self.concurrency);

        let mut matched: Vec<(usize, usize)> = Vec::new();
        let mut completed = 0;
        while let Some((position, result)) = pending.next().await {
            let batch_len = batches[position].len();
            match result {
                Ok(indices) => matched.extend(
                    indices
                        .into_iter()
                        .filter(|&idx| idx < batch_len)
                        .map(|idx| (position, idx)),
                ),
                Err(e) => warn!(batch = position, error = %e, "batch failed"),
            }
            completed += 1;
            progress(RunPhase::Filtering { completed, total });
        }

        matched.sort_unstable();
        matched
            .into_iter()
            .map(|(position, idx)| batches[position][idx].clone())
            .collect()
    }

    /// Fetch, summarize and render one item. Nothing is cached; every call starts over.
    pub async fn summarize_item(&self, index: usize, item: &ListingItem) -> SummaryOutcome {
        let text = match self.fetcher.fetch_text(&item.url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url = %item.url, error = %e, "article fetch failed");
                String::new()
            }
        };
        if text.is_empty() {
            return SummaryOutcome::CouldNotFetch;
        }

        let summary = self.summarizer.summarize(&text).await;
        match pdf::render(&item.title, &summary) {
            Ok(pdf) => SummaryOutcome::Ready(SummaryArtifact {
                index,
                title: item.title.clone(),
                summary,
                pdf,
                file_name: format!("Summary_{index}.pdf"),
            }),
            Err(e) => {
                warn!(error = %e, "pdf rendering failed");
                SummaryOutcome::RenderFailed(e.to_string())
            }
        }
    }
}

#[derive(Default)]
struct Published {
    sequence: u64,
    result: Arc<PipelineResult>,
}

/// The session's current result set, replaced whole at the end of each run.
///
/// Publishing is ordered by a caller-assigned sequence number: a run that started earlier
/// never overwrites the result of one that started later, whichever finishes first.
#[derive(Clone, Default)]
pub struct ResultSet {
    inner: Arc<RwLock<Published>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Arc<PipelineResult> {
        match self.inner.read() {
            Ok(guard) => guard.result.clone(),
            Err(poisoned) => poisoned.into_inner().result.clone(),
        }
    }

    /// Installs `result` unless a higher sequence has already been published.
    pub fn publish(&self, sequence: u64, result: Arc<PipelineResult>) -> bool {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if sequence < guard.sequence {
            return false;
        }
        *guard = Published { sequence, result };
        true
    }

    pub fn item(&self, index: usize) -> Option<ListingItem> {
        self.current().items.get(index).cloned()
    }
}
