use std::sync::Arc;

use crate::fetcher::parallel::{ParallelFetcher, DEFAULT_WORKERS};
use crate::fetcher::{Fetcher, SourceFetcher};
use crate::normalizer::Normalizer;
use crate::rules::ActiveTriggers;
use crate::trigger::Trigger;

/// Wires the fetch collaborator, normalizer and active trigger list together.
pub struct AppContext {
    pub parallel_fetcher: ParallelFetcher,
    pub normalizer: Normalizer,
    pub triggers: ActiveTriggers,
}

impl AppContext {
    pub fn new(triggers: Vec<Arc<Trigger>>, workers: usize) -> Self {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(SourceFetcher::new());
        Self::with_fetcher(fetcher, triggers, workers)
    }

    pub fn with_fetcher(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        triggers: Vec<Arc<Trigger>>,
        workers: usize,
    ) -> Self {
        let parallel_fetcher = ParallelFetcher::with_workers(fetcher, workers);

        Self {
            parallel_fetcher,
            normalizer: Normalizer::new(),
            triggers: ActiveTriggers::new(triggers),
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_WORKERS)
    }
}
