use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::outcome::SourceError;

/// Recorded when a generative keyspace was larger than the configured safety
/// ceiling and got clamped down instead of refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampNotice {
    pub requested_max_len: usize,
    pub applied_max_len: usize,
}

/// A lazy candidate source: boxed iterator plus an optional known total.
///
/// Candidates are pulled one at a time by the scheduler, never
/// bulk-materialized, so memory stays bounded by the worker count no matter
/// how large the space is.
pub struct Candidates<C> {
    iter: Box<dyn Iterator<Item = C> + Send>,
    total: Option<u64>,
    clamp: Option<ClampNotice>,
}

impl<C> std::fmt::Debug for Candidates<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidates")
            .field("total", &self.total)
            .field("clamp", &self.clamp)
            .finish_non_exhaustive()
    }
}

impl<C> Candidates<C> {
    /// Fixed in-memory candidate set (e.g. DNS record types).
    pub fn from_values(values: Vec<C>) -> Self
    where
        C: Send + 'static,
    {
        let total = values.len() as u64;
        Self {
            iter: Box::new(values.into_iter()),
            total: Some(total),
            clamp: None,
        }
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn clamp_notice(&self) -> Option<ClampNotice> {
        self.clamp
    }

    pub(crate) fn into_iter(self) -> Box<dyn Iterator<Item = C> + Send> {
        self.iter
    }
}

impl Candidates<String> {
    /// Newline-delimited wordlist. Blank lines are skipped, lines are not
    /// deduplicated. The total stays unknown: the file is streamed, not
    /// counted up front.
    pub fn wordlist(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Unavailable {
            path: path.display().to_string(),
            source,
        })?;
        let iter = BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty());
        Ok(Self {
            iter: Box::new(iter),
            total: None,
            clamp: None,
        })
    }

    /// Every combination with repetition over `alphabet`, shortest lengths
    /// first, lexicographic (alphabet order) within a length.
    ///
    /// `max_len` above `ceiling` is clamped down with a warning rather than
    /// refused or run unbounded.
    pub fn keyspace(alphabet: Vec<char>, min_len: usize, max_len: usize, ceiling: usize) -> Self {
        let min_len = min_len.max(1);
        let mut applied_max = max_len.max(min_len);
        let mut clamp = None;
        if applied_max > ceiling {
            tracing::warn!(
                requested = applied_max,
                ceiling,
                "keyspace exceeds safety ceiling, clamping max length"
            );
            clamp = Some(ClampNotice {
                requested_max_len: applied_max,
                applied_max_len: ceiling,
            });
            applied_max = ceiling;
        }

        let total = keyspace_size(alphabet.len(), min_len, applied_max);
        Self {
            iter: Box::new(KeyspaceIter::new(alphabet, min_len, applied_max)),
            total,
            clamp,
        }
    }
}

impl Candidates<u16> {
    /// Inclusive port range.
    pub fn port_range(start: u16, end: u16) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let total = u64::from(end) - u64::from(start) + 1;
        Self {
            iter: Box::new(start..=end),
            total: Some(total),
            clamp: None,
        }
    }
}

/// Sum of alphabet^len over the length range, `None` if it overflows u64.
fn keyspace_size(alphabet_len: usize, min_len: usize, max_len: usize) -> Option<u64> {
    if alphabet_len == 0 {
        return Some(0);
    }
    let base = alphabet_len as u128;
    let mut total: u128 = 0;
    for len in min_len..=max_len {
        total = total.checked_add(base.checked_pow(len as u32)?)?;
    }
    u64::try_from(total).ok()
}

/// Odometer-style generator over ordered combinations with repetition.
struct KeyspaceIter {
    alphabet: Vec<char>,
    max_len: usize,
    indices: Vec<usize>,
    done: bool,
}

impl KeyspaceIter {
    fn new(alphabet: Vec<char>, min_len: usize, max_len: usize) -> Self {
        let done = alphabet.is_empty() || min_len > max_len;
        Self {
            alphabet,
            max_len,
            indices: vec![0; min_len],
            done,
        }
    }
}

impl Iterator for KeyspaceIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        let current: String = self.indices.iter().map(|&i| self.alphabet[i]).collect();

        // Advance rightmost-first with carry; on full rollover grow length.
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                if self.indices.len() >= self.max_len {
                    self.done = true;
                } else {
                    let next_len = self.indices.len() + 1;
                    self.indices = vec![0; next_len];
                }
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.alphabet.len() {
                break;
            }
            self.indices[pos] = 0;
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn keyspace_shortest_first_lexicographic() {
        let source = Candidates::keyspace(vec!['a', 'b'], 1, 2, 6);
        let all: Vec<String> = source.into_iter().collect();
        assert_eq!(all, vec!["a", "b", "aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn keyspace_total_matches_enumeration() {
        let source = Candidates::keyspace(vec!['x', 'y', 'z'], 1, 3, 6);
        let total = source.total().unwrap();
        let count = source.into_iter().count() as u64;
        assert_eq!(total, count);
        assert_eq!(total, 3 + 9 + 27);
    }

    #[test]
    fn keyspace_clamps_above_ceiling() {
        let source = Candidates::keyspace(vec!['0', '1'], 1, 10, 3);
        let notice = source.clamp_notice().expect("clamp recorded");
        assert_eq!(notice.requested_max_len, 10);
        assert_eq!(notice.applied_max_len, 3);
        assert_eq!(source.total(), Some(2 + 4 + 8));
    }

    #[test]
    fn keyspace_within_ceiling_not_clamped() {
        let source = Candidates::keyspace(vec!['0', '1'], 1, 3, 4);
        assert!(source.clamp_notice().is_none());
    }

    #[test]
    fn port_range_inclusive() {
        let source = Candidates::port_range(1, 100);
        assert_eq!(source.total(), Some(100));
        let ports: Vec<u16> = source.into_iter().collect();
        assert_eq!(ports.first(), Some(&1));
        assert_eq!(ports.last(), Some(&100));
    }

    #[test]
    fn wordlist_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("redscout-wl-{}.txt", std::process::id()));
        let mut f = File::create(&path).unwrap();
        writeln!(f, "admin\n\n  \nmail\nwww").unwrap();
        drop(f);

        let source = Candidates::wordlist(&path).unwrap();
        let words: Vec<String> = source.into_iter().collect();
        std::fs::remove_file(&path).ok();
        assert_eq!(words, vec!["admin", "mail", "www"]);
    }

    #[test]
    fn missing_wordlist_is_source_error() {
        let err = Candidates::wordlist(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("cannot open candidate source"));
    }
}
