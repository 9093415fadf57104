use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::FixedOffset;

use crate::app::{AppContext, Result};
use crate::config::{parse_interval, Config};
use crate::filter::filter;
use crate::rules;
use crate::watch::{ConsoleDisplay, Display, WatchConfig, Watcher};

/// Load the config named on the command line, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

pub fn check(rules_path: &Path, zone: FixedOffset) -> Result<()> {
    let triggers = rules::load(rules_path, zone)?;

    if triggers.is_empty() {
        println!("No active triggers (missing ADD line?)");
        return Ok(());
    }

    println!("{} active triggers:", triggers.len());
    for (i, trigger) in triggers.iter().enumerate() {
        println!("  {}. {}", i + 1, trigger);
    }

    Ok(())
}

/// Fetch `sources` once and print what matches. Returns the match count.
pub async fn filter_once(
    rules_path: &Path,
    sources: &[String],
    zone: FixedOffset,
    workers: usize,
) -> Result<usize> {
    // Compile first: a broken rules file must not lead to any output.
    let triggers = rules::load(rules_path, zone)?;
    let ctx = AppContext::new(triggers, workers);

    let results = ctx
        .parallel_fetcher
        .fetch_all(sources, &ctx.normalizer)
        .await;

    let mut items = Vec::new();
    for (source, result) in results {
        match result {
            Ok(fetched) => items.extend(fetched),
            Err(e) => eprintln!("  Error fetching {}: {}", source, e),
        }
    }

    let matched = filter(items, &ctx.triggers.snapshot());
    ConsoleDisplay::stdout(zone).show(&matched);
    println!("{} matching items", matched.len());

    Ok(matched.len())
}

pub async fn watch(
    config: &Config,
    rules_override: Option<PathBuf>,
    interval_override: Option<&str>,
    poll_on_start: bool,
    workers: usize,
) -> Result<()> {
    let zone = config.reference_zone()?;
    let interval = match interval_override {
        Some(s) => std::time::Duration::from_secs(parse_interval(s)?),
        None => config.interval()?,
    };
    let rules_path = match rules_override {
        Some(path) => path,
        None => config.rules_path()?,
    };

    let triggers = rules::load(&rules_path, zone)?;
    if triggers.is_empty() {
        tracing::warn!("{} activates no triggers; nothing will match", rules_path.display());
    }

    let ctx = Arc::new(AppContext::new(triggers, workers));
    let watcher = Watcher::new(
        ctx,
        WatchConfig {
            sources: config.sources.clone(),
            interval,
            poll_on_start,
            rules_path: Some(rules_path),
            zone,
        },
    );

    watcher.run(&mut ConsoleDisplay::stdout(zone)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NewswatchError;
    use crate::rules::RuleError;
    use crate::trigger::time::default_reference_zone;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Local</title>
<item><title>Election results</title><guid>1</guid><description>Trump and Clinton</description>
<pubDate>Mon, 03 Oct 2016 17:00:10 GMT</pubDate></item>
<item><title>Weather</title><guid>2</guid><description>Rain</description>
<pubDate>Mon, 03 Oct 2016 18:00:00 GMT</pubDate></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_filter_once_counts_matches() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("triggers.txt");
        let feed = dir.path().join("feed.xml");
        std::fs::write(&rules_path, "t1,TITLE,election\nt2,DESCRIPTION,rain\nADD,t1,t2\n").unwrap();
        std::fs::write(&feed, FEED).unwrap();

        let sources = vec![feed.to_string_lossy().into_owned()];
        let count = filter_once(&rules_path, &sources, default_reference_zone(), 2)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_filter_once_fails_closed_on_bad_rules() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("triggers.txt");
        std::fs::write(&rules_path, "x,NOT,undefined_name\nADD,x\n").unwrap();

        let err = filter_once(&rules_path, &[], default_reference_zone(), 1)
            .await
            .unwrap_err();
        match err {
            NewswatchError::Rules(e) => {
                assert!(matches!(
                    e.without_file(),
                    RuleError::UndefinedReference { .. }
                ));
                assert!(e.to_string().contains("triggers.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("triggers.txt");
        std::fs::write(&rules_path, "t1,TITLE,a\nt1,TITLE,b\n").unwrap();

        assert!(check(&rules_path, default_reference_zone()).is_err());

        std::fs::write(&rules_path, "t1,TITLE,a\nADD,t1\n").unwrap();
        assert!(check(&rules_path, default_reference_zone()).is_ok());
    }

    #[test]
    fn test_load_config_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "workers = 4\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.workers, 4);
    }
}
