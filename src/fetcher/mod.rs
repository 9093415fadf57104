pub mod file_fetcher;
pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;

pub use file_fetcher::FileFetcher;
pub use http_fetcher::HttpFetcher;

#[derive(Debug)]
pub enum FetchResult {
    /// New content fetched successfully
    Content {
        body: Vec<u8>,
        etag: Option<String>,
        last_modified: Option<String>,
    },
    /// Content not modified (HTTP 304)
    NotModified,
}

#[async_trait]
pub trait Fetcher {
    async fn fetch(
        &self,
        source: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchResult>;
}

/// Dispatches `http(s)://` sources to HTTP and everything else to the
/// filesystem.
#[derive(Default)]
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_remote(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(
        &self,
        source: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchResult> {
        if Self::is_remote(source) {
            self.http.fetch(source, etag, last_modified).await
        } else {
            self.file.fetch(source, etag, last_modified).await
        }
    }
}
