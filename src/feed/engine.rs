//! Feed Engine
//!
//! Background tasks for periodic feed ingestion.
//!
//! ```text
//!  poll task                    ingest task
//!  SourcePoller ──mpsc<PollReport>──▶ assign → classify → FeedStore
//!                                               │
//!                                               └──▶ watch<FeedStatus>
//! ```
//!
//! The poll task is the only caller of the source and awaits each poll before
//! scheduling the next, so polls never overlap. The ingest task is the only
//! writer of the store and of the status record.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::classifier::Classifier;
use super::identity;
use super::poller::{PollSchedule, SourcePoller};
use super::query::{QueryEngine, QueryPage, QuerySpec};
use super::rules::RiskThresholds;
use super::source::FlowSource;
use super::status::FeedStatus;
use super::store::{FeedReader, FeedStore};
use super::types::{FeedSnapshot, IdentifiedFlow, RawFlow};
use crate::constants::POLL_CHANNEL_CAPACITY;
use crate::error::{QuerySpecError, SourceError};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub max_backoff: Duration,
    pub risk: RiskThresholds,
    pub max_page_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let schedule = PollSchedule::default();
        Self {
            poll_interval: schedule.interval,
            fetch_timeout: schedule.fetch_timeout,
            max_backoff: schedule.max_backoff,
            risk: RiskThresholds::default(),
            max_page_size: crate::constants::DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Outcome of one poll, sent from the poll task to the ingest task
#[derive(Debug)]
struct PollReport {
    outcome: Result<Vec<RawFlow>, SourceError>,
    consecutive_failures: u32,
    completed_at: DateTime<Utc>,
}

/// Running engine handle. Dropping it stops polling.
pub struct FeedEngine {
    reader: FeedReader,
    status: watch::Receiver<FeedStatus>,
    queries: QueryEngine,
    shutdown: Option<oneshot::Sender<()>>,
    poll_task: JoinHandle<()>,
    ingest_task: JoinHandle<()>,
}

impl FeedEngine {
    /// Spawn the poll and ingest tasks. Must be called inside a tokio runtime.
    pub fn start<S: FlowSource>(source: S, settings: EngineSettings) -> Self {
        let schedule = PollSchedule {
            interval: settings.poll_interval,
            fetch_timeout: settings.fetch_timeout,
            max_backoff: settings.max_backoff,
        };

        tracing::info!(
            interval_ms = settings.poll_interval.as_millis() as u64,
            timeout_ms = settings.fetch_timeout.as_millis() as u64,
            "starting traffic feed engine"
        );

        let store = FeedStore::new();
        let reader = store.reader();
        let (status_tx, status_rx) = watch::channel(FeedStatus::default());
        let (report_tx, report_rx) = mpsc::channel(POLL_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let poller = SourcePoller::new(source, schedule);
        let poll_task = tokio::spawn(poll_loop(poller, report_tx, shutdown_rx));

        let classifier = Classifier::new(settings.risk.clone());
        let ingest_task = tokio::spawn(ingest_loop(report_rx, store, classifier, status_tx));

        Self {
            reader,
            status: status_rx,
            queries: QueryEngine::new(settings.max_page_size),
            shutdown: Some(shutdown_tx),
            poll_task,
            ingest_task,
        }
    }

    pub fn reader(&self) -> FeedReader {
        self.reader.clone()
    }

    pub fn snapshot(&self) -> Arc<FeedSnapshot> {
        self.reader.current()
    }

    pub fn status(&self) -> FeedStatus {
        self.status.borrow().clone()
    }

    pub fn status_watch(&self) -> watch::Receiver<FeedStatus> {
        self.status.clone()
    }

    pub fn query(&self, spec: &QuerySpec) -> Result<QueryPage, QuerySpecError> {
        self.queries.run(&self.reader.current(), spec)
    }

    /// Cancel the pending timer, let an in-flight poll finish and be
    /// ingested, then wait for both tasks to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.poll_task.await {
            tracing::error!("poll task ended abnormally: {}", e);
        }
        if let Err(e) = self.ingest_task.await {
            tracing::error!("ingest task ended abnormally: {}", e);
        }
        tracing::info!("traffic feed engine stopped");
    }
}

async fn poll_loop<S: FlowSource>(
    mut poller: SourcePoller<S>,
    reports: mpsc::Sender<PollReport>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut next_poll = Instant::now();

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = tokio::time::sleep_until(next_poll) => {}
        }

        let started = Instant::now();
        let outcome = poller.poll().await;
        let report = PollReport {
            outcome,
            consecutive_failures: poller.consecutive_failures(),
            completed_at: Utc::now(),
        };

        // A poll that overran its slot is followed immediately by the next one
        next_poll = started + poller.next_delay();

        if reports.send(report).await.is_err() {
            tracing::warn!("ingest task gone, stopping poll loop");
            break;
        }
    }
}

async fn ingest_loop(
    mut reports: mpsc::Receiver<PollReport>,
    store: FeedStore,
    classifier: Classifier,
    status: watch::Sender<FeedStatus>,
) {
    while let Some(report) = reports.recv().await {
        match report.outcome {
            Ok(batch) => {
                let received = batch.len();
                let (flows, dropped) = ingest_batch(&classifier, batch);
                let snapshot = store.replace(flows, report.completed_at);

                tracing::debug!(
                    generation = snapshot.generation,
                    flows = snapshot.len(),
                    malicious = snapshot.malicious_count(),
                    "snapshot refreshed"
                );
                if dropped > 0 {
                    tracing::warn!(dropped, received, "dropped invalid flow records");
                }

                status.send_modify(|s| {
                    s.last_poll_succeeded = true;
                    s.consecutive_failures = report.consecutive_failures;
                    s.last_snapshot_size = snapshot.len();
                    s.generation = snapshot.generation;
                    s.polls += 1;
                    s.last_poll_at = Some(report.completed_at);
                    s.last_success_at = Some(report.completed_at);
                    s.last_error = None;
                    s.dropped_records = dropped;
                });
            }
            Err(e) => {
                status.send_modify(|s| {
                    s.last_poll_succeeded = false;
                    s.consecutive_failures = report.consecutive_failures;
                    s.polls += 1;
                    s.last_poll_at = Some(report.completed_at);
                    s.last_error = Some(e.to_string());
                });
            }
        }
    }
}

/// Assign ids, then classify. Invalid records are dropped and counted.
pub fn ingest_batch(classifier: &Classifier, batch: Vec<RawFlow>) -> (Vec<IdentifiedFlow>, usize) {
    let mut dropped = 0;
    let flows = identity::assign(batch)
        .into_iter()
        .filter_map(|sequenced| match classifier.build(sequenced.item) {
            Ok(record) => Some(IdentifiedFlow {
                sequence_id: sequenced.sequence_id,
                record,
            }),
            Err(e) => {
                tracing::warn!(sequence_id = sequenced.sequence_id, error = %e, "dropping flow record");
                dropped += 1;
                None
            }
        })
        .collect();
    (flows, dropped)
}
