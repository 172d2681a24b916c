//! Generic concurrent probe engine.
//!
//! Every tool in this crate is the same algorithm underneath: enumerate a
//! candidate space, probe each candidate under a bounded worker count, detect
//! successes, terminate early when asked. [`run`] is that algorithm, written
//! once, parameterized by a [`Candidates`] source and a probe closure.

pub mod cancel;
pub mod outcome;
pub mod progress;
pub mod source;

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::AHashSet;
use futures::stream::{self, StreamExt};

pub use cancel::{CancelController, CancelReason};
pub use outcome::{Outcome, ProbeError, SourceError};
pub use progress::{Progress, ProgressSnapshot};
pub use source::{Candidates, ClampNotice};

/// When the run stops relative to successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop as soon as one success is observed.
    FirstMatch,
    /// Run until the source is exhausted, collecting every success.
    Exhaustive,
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The candidate source was exhausted.
    Completed,
    /// A first-match run found its success.
    MatchFound,
    /// Externally interrupted.
    Cancelled,
    /// The overall deadline elapsed.
    DeadlineExceeded,
}

/// Immutable per-run settings.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Upper bound on concurrently executing probes.
    pub workers: usize,
    /// Backstop timeout per probe, independent of any timeout the probe
    /// applies internally.
    pub probe_timeout: Duration,
    pub mode: Mode,
    /// Optional wall-clock bound on the whole run.
    pub deadline: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 50,
            probe_timeout: Duration::from_secs(10),
            mode: Mode::Exhaustive,
            deadline: None,
        }
    }
}

/// One retained success.
#[derive(Debug, Clone)]
pub struct Hit<C, P> {
    pub candidate: C,
    pub payload: P,
}

/// Final state of a run. Always produced, whatever the termination trigger.
#[derive(Debug)]
pub struct RunResult<C, P> {
    /// Deduplicated successes in the order they were observed.
    pub hits: Vec<Hit<C, P>>,
    pub completed: u64,
    pub errors: u64,
    /// Candidate-space size, when the source knows it.
    pub total: Option<u64>,
    pub reason: TerminationReason,
    pub elapsed: Duration,
}

/// Drive `probe` over every candidate with at most `cfg.workers` in flight.
///
/// Candidates are pulled lazily from the source; the pull stops as soon as
/// the controller trips. In first-match mode the first observed success
/// returns immediately and in-flight probes are dropped. On an external
/// interrupt in-flight probes drain; on deadline they are aborted.
///
/// The probe reports `Ok(Some(payload))` for a success, `Ok(None)` for a
/// miss, and `Err` for an inconclusive attempt. Errors never abort the run.
pub async fn run<C, P, F, Fut>(
    source: Candidates<C>,
    cfg: RunConfig,
    ctrl: CancelController,
    progress: Arc<Progress>,
    probe: F,
) -> RunResult<C, P>
where
    C: Clone + Eq + Hash + std::fmt::Debug + Send + 'static,
    P: Send + 'static,
    F: Fn(C) -> Fut,
    Fut: Future<Output = anyhow::Result<Option<P>>>,
{
    let started = Instant::now();
    let total = source.total();
    progress.set_total(total);

    let workers = cfg.workers.max(1);
    let probe_timeout = cfg.probe_timeout;
    let mode = cfg.mode;
    tracing::debug!(workers, ?total, mode = ?cfg.mode, "starting probe run");

    let mut hits: Vec<Hit<C, P>> = Vec::new();
    let mut seen: AHashSet<C> = AHashSet::new();
    let mut completed = 0u64;
    let mut errors = 0u64;

    {
        let probe = &probe;
        let ctrl_ref = &ctrl;
        let hits_ref = &mut hits;
        let seen_ref = &mut seen;
        let completed_ref = &mut completed;
        let errors_ref = &mut errors;
        let progress_ref = &progress;

        let consume = async move {
            let outcomes = stream::iter(source.into_iter())
                .take_until(ctrl_ref.token().cancelled_owned())
                .map(|candidate| async move {
                    match tokio::time::timeout(probe_timeout, probe(candidate.clone())).await {
                        Ok(Ok(Some(payload))) => Outcome::Success { candidate, payload },
                        Ok(Ok(None)) => Outcome::Failure { candidate },
                        Ok(Err(e)) => Outcome::Error {
                            candidate,
                            cause: ProbeError::Failed(e),
                        },
                        Err(_) => Outcome::Error {
                            candidate,
                            cause: ProbeError::Timeout(probe_timeout),
                        },
                    }
                })
                .buffer_unordered(workers);
            futures::pin_mut!(outcomes);

            // Single aggregation path: all ResultSet/Progress writes happen
            // here, so probes never touch shared mutable state.
            while let Some(outcome) = outcomes.next().await {
                *completed_ref += 1;
                progress_ref.record_completed();
                match outcome {
                    Outcome::Success { candidate, payload } => {
                        if seen_ref.insert(candidate.clone()) {
                            hits_ref.push(Hit { candidate, payload });
                            progress_ref.record_hit();
                        }
                        if mode == Mode::FirstMatch {
                            ctrl_ref.trip(CancelReason::MatchFound);
                            break;
                        }
                    }
                    Outcome::Failure { .. } => {}
                    Outcome::Error { candidate, cause } => {
                        *errors_ref += 1;
                        progress_ref.record_error();
                        tracing::debug!(?candidate, error = %cause, "probe error");
                    }
                }
            }
        };

        match cfg.deadline {
            Some(deadline) => {
                if tokio::time::timeout(deadline, consume).await.is_err() {
                    ctrl.trip(CancelReason::DeadlineExceeded);
                }
            }
            None => consume.await,
        }
    }

    let reason = match ctrl.reason() {
        Some(CancelReason::MatchFound) => TerminationReason::MatchFound,
        Some(CancelReason::Interrupted) => TerminationReason::Cancelled,
        Some(CancelReason::DeadlineExceeded) => TerminationReason::DeadlineExceeded,
        None => TerminationReason::Completed,
    };

    let elapsed = started.elapsed();
    tracing::debug!(?reason, completed, errors, hits = hits.len(), ?elapsed, "probe run finished");

    RunResult {
        hits,
        completed,
        errors,
        total,
        reason,
        elapsed,
    }
}
