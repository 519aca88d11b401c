//! Request dispatcher: one concurrent task per input line.
//!
//! The dispatch loop reads lines in order and, for each one, waits the
//! pacing delay and then spawns an independent task. Tasks start at a steady
//! cadence no matter how long earlier ones take, so the number in flight is
//! roughly `latency / delay`. An optional gate caps it explicitly.
//! Finished tasks are reaped on every pass, so the dispatcher holds state
//! only for tasks still in flight, however long the input is.
//!
//! # Task lifecycle
//!
//! ```text
//! Created -> Sent -> Read -> Decided -> Reported | Persisted
//!    \________\_______\__________________\______> Failed
//! ```
//!
//! Each task ends by sending one [`Outcome`]. No task failure stops the run.
//!
//! # Example
//!
//! ```no_run
//! use fff_core::config::ProbeSettings;
//! use fff_core::probe::{Dispatcher, HttpClient, spawn_output_writer};
//! use tokio::io::BufReader;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeSettings::default().into_config();
//! let client = HttpClient::new(&config.client)?;
//! let dispatcher = Dispatcher::new(config, client)?;
//!
//! let (tx, rx) = mpsc::unbounded_channel();
//! let printer = spawn_output_writer(rx, tokio::io::stdout(), tokio::io::stderr());
//! let stats = dispatcher.run(BufReader::new(tokio::io::stdin()), tx).await?;
//! printer.await??;
//! println!("saved {}", stats.saved());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::artifact::ArtifactWriter;
use super::client::HttpClient;
use super::report::Outcome;
use crate::config::ProbeConfig;

/// Error type for dispatcher operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Concurrency gate larger than the semaphore supports.
    #[error("invalid concurrency value {value}: must be at most {}", Semaphore::MAX_PERMITS)]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The concurrency gate was closed unexpectedly.
    #[error("concurrency gate closed unexpectedly")]
    GateClosed,

    /// The line source failed.
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

/// Counters for one run, updated from concurrent tasks.
#[derive(Debug, Default)]
pub struct DispatchStats {
    saved: AtomicUsize,
    reported: AtomicUsize,
    failed: AtomicUsize,
    ignored: AtomicUsize,
    peak_pending: AtomicUsize,
}

impl DispatchStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Responses written to artifacts.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }

    /// Responses reported but not saved.
    #[must_use]
    pub fn reported(&self) -> usize {
        self.reported.load(Ordering::SeqCst)
    }

    /// Tasks that ended in a failure.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Input lines that were not valid URLs.
    #[must_use]
    pub fn ignored(&self) -> usize {
        self.ignored.load(Ordering::SeqCst)
    }

    /// Largest number of launched but unreaped tasks seen during the run.
    #[must_use]
    pub fn peak_pending(&self) -> usize {
        self.peak_pending.load(Ordering::SeqCst)
    }

    /// Every dispatched task.
    #[must_use]
    pub fn total(&self) -> usize {
        self.saved() + self.reported() + self.failed() + self.ignored()
    }

    fn record(&self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Ignored { .. } => &self.ignored,
            Outcome::Reported { .. } => &self.reported,
            Outcome::Saved { .. } => &self.saved,
            Outcome::Failed(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn note_pending(&self, pending: usize) {
        self.peak_pending.fetch_max(pending, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> Self {
        Self {
            saved: AtomicUsize::new(self.saved()),
            reported: AtomicUsize::new(self.reported()),
            failed: AtomicUsize::new(self.failed()),
            ignored: AtomicUsize::new(self.ignored()),
            peak_pending: AtomicUsize::new(self.peak_pending()),
        }
    }
}

/// Dispatches one probe task per input line.
#[derive(Debug)]
pub struct Dispatcher {
    config: Arc<ProbeConfig>,
    client: HttpClient,
    writer: ArtifactWriter,
    /// `None` when concurrency is unbounded.
    gate: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    /// Creates a dispatcher for `config`, sending through `client`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the configured gate
    /// exceeds [`Semaphore::MAX_PERMITS`].
    pub fn new(config: ProbeConfig, client: HttpClient) -> Result<Self, EngineError> {
        let gate = match config.concurrency {
            0 => None,
            n if n > Semaphore::MAX_PERMITS => {
                return Err(EngineError::InvalidConcurrency { value: n });
            }
            n => Some(Arc::new(Semaphore::new(n))),
        };

        debug!(
            method = %config.method,
            delay_ms = config.delay.as_millis(),
            concurrency = config.concurrency,
            output_dir = %config.output_dir.display(),
            "creating dispatcher"
        );

        Ok(Self {
            writer: ArtifactWriter::new(config.output_dir.clone()),
            config: Arc::new(config),
            client,
            gate,
        })
    }

    /// Reads `input` to the end, launching one task per line, then waits for
    /// every task to finish.
    ///
    /// Outcomes are sent to `outcomes`; the sender is dropped when this
    /// returns, which closes the channel once every task is done.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Input`] if reading `input` fails. Tasks already
    /// launched are still awaited first. Individual task failures are never
    /// errors here; they are reported as outcomes and counted.
    #[instrument(skip_all, fields(delay_ms = self.config.delay.as_millis()))]
    pub async fn run<R>(
        &self,
        input: R,
        outcomes: UnboundedSender<Outcome>,
    ) -> Result<DispatchStats, EngineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let stats = Arc::new(DispatchStats::new());
        let mut tasks = JoinSet::new();
        let mut lines = input.split(b'\n');

        info!("starting dispatch");

        let read_result = loop {
            let line = match lines.next_segment().await {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(EngineError::Input(e)),
            };
            let raw_url = decode_line(&line);

            if self.config.delay.is_zero() {
                // Lets finished tasks complete so they can be reaped below.
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.config.delay).await;
            }

            while let Some(result) = tasks.try_join_next() {
                reap(result, &stats);
            }

            let permit = match &self.gate {
                Some(gate) => match Arc::clone(gate).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => break Err(EngineError::GateClosed),
                },
                None => None,
            };

            let config = Arc::clone(&self.config);
            let client = self.client.clone();
            let writer = self.writer.clone();
            let task_stats = Arc::clone(&stats);
            let outcomes = outcomes.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let outcome = probe(&config, &client, &writer, raw_url).await;
                task_stats.record(&outcome);
                // The receiver only goes away when the process is shutting down.
                let _ = outcomes.send(outcome);
            });
            stats.note_pending(tasks.len());
        };

        debug!(task_count = tasks.len(), "waiting for tasks to complete");

        while let Some(result) = tasks.join_next().await {
            reap(result, &stats);
        }

        info!(
            saved = stats.saved(),
            reported = stats.reported(),
            failed = stats.failed(),
            ignored = stats.ignored(),
            total = stats.total(),
            peak_pending = stats.peak_pending(),
            "dispatch complete"
        );

        read_result.map(|()| stats.snapshot())
    }
}

/// Runs one input line through fetch, decide and persist.
#[instrument(skip(config, client, writer))]
pub async fn probe(
    config: &ProbeConfig,
    client: &HttpClient,
    writer: &ArtifactWriter,
    raw_url: String,
) -> Outcome {
    let Some(request) = config.request_for(&raw_url) else {
        debug!("skipping line that is not an absolute URL");
        return Outcome::Ignored { raw_url };
    };

    let response = match client.fetch(&request).await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "probe failed");
            return Outcome::Failed(e);
        }
    };

    let status = response.status;
    let decision = config.policy.evaluate(status, &response.body);
    debug!(status, save = decision.save, reason = %decision.reason, "decided");

    if !decision.save {
        return Outcome::Reported { raw_url, status };
    }

    match writer.write(&request, &response).await {
        Ok(path) => Outcome::Saved {
            path,
            raw_url,
            status,
        },
        Err(e) => Outcome::Failed(e),
    }
}

/// Counts a task that ended in a panic or cancellation as failed.
fn reap(result: Result<(), JoinError>, stats: &DispatchStats) {
    if let Err(e) = result {
        warn!(error = %e, "probe task panicked");
        stats.increment_failed();
    }
}

/// Strips the line terminator and decodes lossily.
fn decode_line(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
