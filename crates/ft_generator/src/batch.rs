//! Concurrent generation of independent trees.
//!
//! Trees share one read-only [`CalculatedFactors`] and nothing else. Each
//! tree runs on tokio's blocking pool with its own RNG stream, so the batch
//! result does not depend on scheduling.

use crate::builder::{BuildOptions, GenerativeFaultTree};
use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::factors::CalculatedFactors;
use ft_model::FaultTree;
use std::num::NonZeroUsize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use xxhash_rust::xxh64::xxh64;

/// Options of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of trees.
    pub count: usize,
    /// Seed every per-tree seed is derived from.
    pub base_seed: u64,
    /// Tree names are `{name_prefix}{index + 1}`.
    pub name_prefix: String,
    /// Wall-clock budget per tree.
    pub timeout: Option<Duration>,
    /// Maximum trees in flight.
    pub parallelism: usize,
    /// Shared flag that cancels every unfinished tree.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            count: 1,
            base_seed: 123,
            name_prefix: "Autogenerated".to_string(),
            timeout: None,
            parallelism: std::thread::available_parallelism().map_or(4, NonZeroUsize::get),
            cancel: None,
        }
    }
}

impl BatchOptions {
    /// Sets the number of trees.
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Sets the base seed.
    #[must_use]
    pub const fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Sets the tree name prefix.
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Sets the per-tree budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of trees in flight.
    #[must_use]
    pub const fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Attaches a cancellation flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Outcome of one tree in a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// Position in the batch.
    pub index: usize,
    /// Seed the tree was built with.
    pub seed: u64,
    /// The tree, or why it is missing.
    pub outcome: Result<FaultTree>,
}

/// Derives the seed of tree `index` from the batch seed.
pub fn tree_seed(base_seed: u64, index: usize) -> u64 {
    xxh64(&(index as u64).to_le_bytes(), base_seed)
}

/// Generates `options.count` trees concurrently.
///
/// Items come back ordered by index. A failed, timed-out or cancelled tree
/// is reported through its item and never returned partially.
pub async fn generate_batch(factors: Arc<CalculatedFactors>, options: BatchOptions) -> Vec<BatchItem> {
    let semaphore = Arc::new(Semaphore::new(options.parallelism.max(1)));
    let mut tasks = JoinSet::new();

    for index in 0..options.count {
        let seed = tree_seed(options.base_seed, index);
        let build = BuildOptions::default()
            .with_name(format!("{}{}", options.name_prefix, index + 1))
            .with_seed(seed);
        let factors = Arc::clone(&factors);
        let semaphore = Arc::clone(&semaphore);
        let timeout = options.timeout;
        let cancel = options.cancel.clone();

        tasks.spawn(async move {
            let permit = semaphore.acquire_owned().await.ok();
            let joined = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let mut deadline = Deadline::new(timeout);
                if let Some(flag) = cancel {
                    deadline = deadline.with_cancel_flag(flag);
                }
                GenerativeFaultTree::new(&factors, &build)
                    .with_deadline(deadline)
                    .build()
            })
            .await;
            let outcome = joined
                .unwrap_or_else(|e| Err(Error::Invariant(format!("generation task failed: {e}"))));
            BatchItem {
                index,
                seed,
                outcome,
            }
        });
    }

    let mut items = Vec::with_capacity(options.count);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(item) => {
                debug!(index = item.index, ok = item.outcome.is_ok(), "batch item finished");
                items.push(item);
            }
            Err(e) => warn!(error = %e, "batch task aborted"),
        }
    }
    items.sort_by_key(|item| item.index);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GenerationParams;
    use std::sync::atomic::Ordering;

    fn shared_factors(num_basic: usize) -> Arc<CalculatedFactors> {
        let params = GenerationParams {
            num_basic,
            ..GenerationParams::default()
        };
        Arc::new(params.to_factors().unwrap())
    }

    #[test]
    fn seeds_are_distinct_and_stable() {
        let seeds: Vec<u64> = (0..16).map(|i| tree_seed(7, i)).collect();
        let unique: std::collections::HashSet<_> = seeds.iter().collect();
        assert_eq!(unique.len(), seeds.len());
        assert_eq!(tree_seed(7, 3), seeds[3]);
        assert_ne!(tree_seed(8, 3), seeds[3]);
    }

    #[tokio::test]
    async fn batch_is_ordered_and_reproducible() {
        let factors = shared_factors(30);
        let options = BatchOptions::default()
            .with_count(6)
            .with_base_seed(11)
            .with_parallelism(3)
            .with_name_prefix("plant-");

        let first = generate_batch(Arc::clone(&factors), options.clone()).await;
        let second = generate_batch(factors, options).await;

        assert_eq!(first.len(), 6);
        for (i, (a, b)) in first.iter().zip(&second).enumerate() {
            assert_eq!(a.index, i);
            assert_eq!(a.seed, tree_seed(11, i));
            let a = a.outcome.as_ref().unwrap();
            let b = b.outcome.as_ref().unwrap();
            assert_eq!(a.name(), format!("plant-{}", i + 1));
            assert_eq!(a.fingerprint(), b.fingerprint());
        }
    }

    #[tokio::test]
    async fn batch_tree_matches_single_build() {
        let factors = shared_factors(25);
        let items = generate_batch(
            Arc::clone(&factors),
            BatchOptions::default().with_count(2).with_base_seed(5),
        )
        .await;
        let options = BuildOptions::default()
            .with_name("Autogenerated2")
            .with_seed(tree_seed(5, 1));
        let single = crate::builder::generate(&factors, &options).unwrap();
        assert_eq!(
            items[1].outcome.as_ref().unwrap().fingerprint(),
            single.fingerprint()
        );
    }

    #[tokio::test]
    async fn cancelled_batch_reports_every_item() {
        let flag = Arc::new(AtomicBool::new(false));
        flag.store(true, Ordering::SeqCst);
        let items = generate_batch(
            shared_factors(30),
            BatchOptions::default().with_count(4).with_cancel_flag(flag),
        )
        .await;
        assert_eq!(items.len(), 4);
        assert!(items
            .iter()
            .all(|item| matches!(item.outcome, Err(Error::Cancelled))));
    }

    #[tokio::test]
    async fn empty_batch() {
        let items = generate_batch(shared_factors(10), BatchOptions::default().with_count(0)).await;
        assert!(items.is_empty());
    }
}
