use std::time::Duration;

use thiserror::Error;

/// Why a probe attempt failed without producing a verdict.
///
/// Probe errors are per-candidate: they are counted and logged by the run
/// loop but never abort the run.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The engine's backstop timeout fired before the probe returned.
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    /// The probe itself reported an error (network failure, parse error, ...).
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// A candidate source could not be opened at all. Fatal: no partial run is
/// attempted.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open candidate source {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of probing one candidate.
#[derive(Debug)]
pub enum Outcome<C, P> {
    /// The probe's success predicate held. `payload` is probe-defined
    /// auxiliary data (resolved URL, banner, ...).
    Success { candidate: C, payload: P },
    /// The candidate was checked and is not a match.
    Failure { candidate: C },
    /// The check itself failed; the candidate's status is unknown.
    Error { candidate: C, cause: ProbeError },
}

impl<C, P> Outcome<C, P> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}
