use std::path::Path;

use async_trait::async_trait;

use crate::app::Result;
use crate::fetcher::{FetchResult, Fetcher};

/// Reads feed documents from disk. Accepts plain paths or `file://` URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }

    pub fn path_of(source: &str) -> &Path {
        Path::new(source.strip_prefix("file://").unwrap_or(source))
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(
        &self,
        source: &str,
        _etag: Option<&str>,
        _last_modified: Option<&str>,
    ) -> Result<FetchResult> {
        let body = tokio::fs::read(Self::path_of(source)).await?;
        Ok(FetchResult::Content {
            body,
            etag: None,
            last_modified: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_of_strips_scheme() {
        assert_eq!(FileFetcher::path_of("file:///tmp/a.xml"), Path::new("/tmp/a.xml"));
        assert_eq!(FileFetcher::path_of("feeds/a.xml"), Path::new("feeds/a.xml"));
    }

    #[tokio::test]
    async fn test_fetch_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(&path, b"<rss/>").unwrap();

        let source = format!("file://{}", path.display());
        match FileFetcher::new().fetch(&source, None, None).await.unwrap() {
            FetchResult::Content { body, etag, .. } => {
                assert_eq!(body, b"<rss/>");
                assert!(etag.is_none());
            }
            FetchResult::NotModified => panic!("files are never reported unmodified"),
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("missing.xml");
        let result = FileFetcher::new()
            .fetch(&source.to_string_lossy(), None, None)
            .await;
        assert!(result.is_err());
    }
}
