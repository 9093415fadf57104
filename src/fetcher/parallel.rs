use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;

use crate::app::Result;
use crate::domain::Item;
use crate::fetcher::{FetchResult, Fetcher};
use crate::normalizer::Normalizer;

pub const DEFAULT_WORKERS: usize = 10;

/// Cache validators returned with the last successful fetch of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Validators {
    etag: Option<String>,
    last_modified: Option<String>,
}

/// Fetches many sources concurrently, bounded by a worker count.
///
/// Validators are remembered in memory for the life of the process so later
/// polls can be answered with `304 Not Modified`.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
    validators: Arc<Mutex<HashMap<String, Validators>>>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            validators: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fetch and normalize every source. Results come back in `sources`
    /// order; an unchanged source yields no items.
    pub async fn fetch_all(
        &self,
        sources: &[String],
        normalizer: &Normalizer,
    ) -> Vec<(String, Result<Vec<Item>>)> {
        let mut handles = Vec::new();

        for source in sources {
            let source = source.clone();
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let validators = self.validators.clone();
            let normalizer = normalizer.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");

                let result = fetch_single_source(&fetcher, &source, &validators, &normalizer).await;
                (source, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}

async fn fetch_single_source(
    fetcher: &Arc<dyn Fetcher + Send + Sync>,
    source: &str,
    validators: &Mutex<HashMap<String, Validators>>,
    normalizer: &Normalizer,
) -> Result<Vec<Item>> {
    let previous = validators
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(source)
        .cloned()
        .unwrap_or_default();

    let result = fetcher
        .fetch(
            source,
            previous.etag.as_deref(),
            previous.last_modified.as_deref(),
        )
        .await?;

    match result {
        FetchResult::NotModified => {
            tracing::debug!("Source {} not modified", source);
            Ok(Vec::new())
        }
        FetchResult::Content {
            body,
            etag,
            last_modified,
        } => {
            let feed = normalizer.normalize(source, &body)?;

            validators
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(source.to_string(), Validators { etag, last_modified });

            tracing::info!(
                "Fetched {} items from {}",
                feed.items.len(),
                feed.display_title(source)
            );

            Ok(feed.items)
        }
    }
}
