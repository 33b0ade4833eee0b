//! Bounded fan-out/fan-in over a batch of candidates.
//!
//! [`run_batch`] drives one worker future per candidate with at most
//! `concurrency` in flight, and returns once every worker has finished.
//! Workers report their own outcome; nothing a worker returns can cancel its
//! siblings. Completion order is unspecified.

use crate::error::Rejection;
use crate::models::{MediaKind, MediaResource};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use tracing::info;

/// Run `worker` over every candidate, `concurrency` at a time.
///
/// # Arguments
///
/// * `candidates` - items to process, consumed lazily as slots free up
/// * `concurrency` - ceiling on in-flight workers; `0` is treated as `1`
/// * `worker` - builds the future for one candidate
///
/// # Returns
///
/// One output per candidate, in completion order, after every worker has
/// finished.
///
/// # Examples
///
/// ```ignore
/// let outcomes = run_batch(urls, 10, |url| fetch_one(url)).await;
/// assert_eq!(outcomes.len(), n_urls);
/// ```
pub async fn run_batch<I, W, Fut>(candidates: I, concurrency: usize, worker: W) -> Vec<Fut::Output>
where
    I: IntoIterator,
    W: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    stream::iter(candidates)
        .map(worker)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// Aggregate counts for one finished batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: usize,
    pub filtered: usize,
    pub too_small: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[MediaResource]) -> Self {
        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.rejection() {
                None if outcome.is_downloaded() => summary.saved += 1,
                None => {}
                Some(Rejection::Keyword { .. }) => summary.filtered += 1,
                Some(Rejection::TooSmall { .. } | Rejection::Undecodable { .. }) => {
                    summary.too_small += 1
                }
                Some(Rejection::Duplicate { .. }) => summary.duplicates += 1,
                Some(
                    Rejection::Fetch { .. } | Rejection::Unresolvable { .. } | Rejection::Save { .. },
                ) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn log(&self, kind: MediaKind) {
        info!(
            event = "complete",
            kind = kind.label(),
            total = self.total,
            saved = self.saved,
            filtered = self.filtered,
            too_small = self.too_small,
            duplicates = self.duplicates,
            failed = self.failed,
            "Batch finished"
        );
        if self.saved == 0 {
            info!(kind = kind.label(), "No media saved");
        }
    }
}
