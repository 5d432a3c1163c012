use dashmap::DashMap;
use pib_scraper::pipeline::{Pipeline, PipelineResult, ResultSet, RunOutcome, RunPhase};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// How many finished runs stay pollable before the oldest is forgotten.
pub const RETAINED_FINISHED_RUNS: usize = 256;

// Where a run currently is:
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Harvesting { requests: usize },
    Filtering { completed: usize, total: usize },
    Complete { items: usize, result: Arc<PipelineResult> },
    NoData,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Complete { .. } | RunStatus::NoData)
    }
}

impl From<RunPhase> for RunStatus {
    fn from(phase: RunPhase) -> Self {
        match phase {
            RunPhase::Harvesting { requests } => RunStatus::Harvesting { requests },
            RunPhase::Filtering { completed, total } => RunStatus::Filtering { completed, total },
        }
    }
}

/// run_id → RunStatus. In-flight runs are always kept; finished ones are evicted
/// oldest first once more than `retain` have piled up.
#[derive(Clone)]
pub struct RunRegistry {
    statuses: Arc<DashMap<Uuid, RunStatus>>,
    finished: Arc<Mutex<VecDeque<Uuid>>>,
    next_sequence: Arc<AtomicU64>,
    retain: usize,
}

impl RunRegistry {
    pub fn new(retain: usize) -> Self {
        RunRegistry {
            statuses: Arc::new(DashMap::new()),
            finished: Arc::new(Mutex::new(VecDeque::new())),
            next_sequence: Arc::new(AtomicU64::new(0)),
            retain,
        }
    }

    /// Records a new pending run. The sequence number orders runs by start time.
    pub fn start(&self) -> (Uuid, u64) {
        let run_id = Uuid::new_v4();
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.statuses.insert(run_id, RunStatus::Pending);
        (run_id, sequence)
    }

    pub fn update(&self, run_id: Uuid, status: RunStatus) {
        self.statuses.insert(run_id, status);
    }

    pub fn finish(&self, run_id: Uuid, status: RunStatus) {
        self.statuses.insert(run_id, status);
        let mut finished = match self.finished.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        finished.push_back(run_id);
        while finished.len() > self.retain {
            if let Some(evicted) = finished.pop_front() {
                self.statuses.remove(&evicted);
            }
        }
    }

    pub fn get(&self, run_id: &Uuid) -> Option<RunStatus> {
        self.statuses.get(run_id).map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

// Shared by every handler: the pipeline, the run registry, and the session result set.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub runs: RunRegistry,
    pub results: ResultSet,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        AppState {
            pipeline: Arc::new(pipeline),
            runs: RunRegistry::new(RETAINED_FINISHED_RUNS),
            results: ResultSet::new(),
        }
    }

    /// Turns a run's outcome into its final status, publishing the result set first
    /// unless a later-started run has already published.
    pub fn complete_run(&self, run_id: Uuid, sequence: u64, outcome: RunOutcome) -> RunStatus {
        let status = match outcome {
            RunOutcome::Complete(result) => {
                let result = Arc::new(result);
                self.results.publish(sequence, result.clone());
                RunStatus::Complete {
                    items: result.items.len(),
                    result,
                }
            }
            RunOutcome::NoData => RunStatus::NoData,
        };
        self.runs.finish(run_id, status.clone());
        status
    }
}
