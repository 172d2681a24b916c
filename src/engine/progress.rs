use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Live run counters, written by the run loop's single aggregation path and
/// read concurrently by reporting tasks (progress bar ticker).
#[derive(Debug, Default)]
pub struct Progress {
    completed: AtomicU64,
    errors: AtomicU64,
    hits: AtomicU64,
    total: AtomicU64,
    total_known: AtomicBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub errors: u64,
    pub hits: u64,
    /// `None` while the candidate space size is unknown (lazy wordlists).
    pub total: Option<u64>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_total(&self, total: Option<u64>) {
        if let Some(t) = total {
            self.total.store(t, Ordering::Relaxed);
            self.total_known.store(true, Ordering::Release);
        }
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Safe to call from any thread while jobs are still in flight.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let total = if self.total_known.load(Ordering::Acquire) {
            Some(self.total.load(Ordering::Relaxed))
        } else {
            None
        };
        ProgressSnapshot {
            completed: self.completed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let p = Progress::new();
        assert_eq!(p.snapshot().total, None);

        p.set_total(Some(10));
        p.record_completed();
        p.record_completed();
        p.record_error();
        p.record_hit();

        let snap = p.snapshot();
        assert_eq!(snap.completed, 2);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.total, Some(10));
    }
}
