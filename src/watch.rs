//! Poll loop: fetch, filter against the active triggers, show matches.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::app::AppContext;
use crate::domain::Item;
use crate::filter::filter;

/// Receives every batch of matched items.
pub trait Display {
    fn show(&mut self, items: &[Item]);
}

/// Writes matches to a stream, showing each item id only once.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    shown: HashSet<String>,
    zone: FixedOffset,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout(zone: FixedOffset) -> Self {
        Self::new(std::io::stdout(), zone)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, zone: FixedOffset) -> Self {
        Self {
            out,
            shown: HashSet::new(),
            zone,
        }
    }

    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_item(&mut self, item: &Item) -> std::io::Result<()> {
        let published = item.published_at.with_timezone(&self.zone);
        writeln!(self.out, "{}", item.title)?;
        writeln!(self.out, "  {}", published.format("%d %b %Y %H:%M:%S %:z"))?;
        if let Some(link) = &item.link {
            writeln!(self.out, "  {}", link)?;
        }
        if !item.description.is_empty() {
            writeln!(self.out, "  {}", item.description)?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn show(&mut self, items: &[Item]) {
        for item in items {
            if !self.shown.insert(item.id.clone()) {
                continue;
            }
            if let Err(e) = self.write_item(item) {
                tracing::error!("Failed to display {}: {}", item.id, e);
            }
        }
        let _ = self.out.flush();
    }
}

/// Watcher settings.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub sources: Vec<String>,
    pub interval: Duration,
    pub poll_on_start: bool,
    /// Rules file re-read on SIGHUP.
    pub rules_path: Option<PathBuf>,
    pub zone: FixedOffset,
}

pub struct Watcher {
    ctx: Arc<AppContext>,
    config: WatchConfig,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl Watcher {
    pub fn new(ctx: Arc<AppContext>, config: WatchConfig) -> Self {
        Self {
            ctx,
            config,
            running: Arc::new(AtomicBool::new(true)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Run until SIGINT/SIGTERM (or [`stop`](Self::stop)).
    pub async fn run<D: Display>(&self, display: &mut D) -> crate::app::Result<()> {
        let handlers = self.spawn_signal_handlers();

        tracing::info!(
            "Watching {} sources every {}s with {} triggers",
            self.config.sources.len(),
            self.config.interval.as_secs(),
            self.ctx.triggers.len()
        );

        if self.config.poll_on_start && self.running.load(Ordering::SeqCst) {
            self.poll(display).await;
        }

        let mut timer = interval(self.config.interval);
        timer.tick().await; // Skip the first immediate tick

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = timer.tick() => {}
                _ = self.shutdown.notified() => break,
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            self.poll(display).await;
        }

        for handle in handlers {
            handle.abort();
        }

        tracing::info!("Watcher shutting down");
        Ok(())
    }

    /// One fetch and filter cycle. Returns the number of matched items.
    pub async fn poll<D: Display>(&self, display: &mut D) -> usize {
        let start = Utc::now();
        let results = self
            .ctx
            .parallel_fetcher
            .fetch_all(&self.config.sources, &self.ctx.normalizer)
            .await;

        let mut items = Vec::new();
        let mut errors = 0;
        for (source, result) in results {
            match result {
                Ok(fetched) => items.extend(fetched),
                Err(e) => {
                    errors += 1;
                    tracing::warn!("Error fetching {}: {}", source, e);
                }
            }
        }

        let fetched = items.len();
        let triggers = self.ctx.triggers.snapshot();
        let matched = filter(items, &triggers);
        display.show(&matched);

        let elapsed = Utc::now().signed_duration_since(start);
        tracing::info!(
            "Poll complete: {} items, {} matched, {} errors ({:.1}s)",
            fetched,
            matched.len(),
            errors,
            elapsed.num_milliseconds() as f64 / 1000.0
        );

        matched.len()
    }

    pub fn stop(&self) {
        request_stop(&self.running, &self.shutdown);
    }

    /// Spawn the shutdown and reload listeners. The caller aborts the
    /// returned tasks when the loop ends.
    fn spawn_signal_handlers(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        let running = self.running.clone();
        let shutdown = self.shutdown.clone();
        handles.push(tokio::spawn(async move {
            shutdown_signal().await;
            request_stop(&running, &shutdown);
        }));

        #[cfg(unix)]
        {
            if let Some(path) = self.config.rules_path.clone() {
                let ctx = self.ctx.clone();
                let zone = self.config.zone;
                handles.push(tokio::spawn(async move {
                    use tokio::signal::unix::{signal, SignalKind};

                    let mut hangup = match signal(SignalKind::hangup()) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::warn!("SIGHUP reload disabled: {}", e);
                            return;
                        }
                    };
                    while hangup.recv().await.is_some() {
                        reload_rules(ctx.clone(), path.clone(), zone).await;
                    }
                }));
            }
        }

        handles
    }
}

fn request_stop(running: &AtomicBool, shutdown: &Notify) {
    running.store(false, Ordering::SeqCst);
    // Stores a permit if the loop is mid-poll, so the next wait returns at once.
    shutdown.notify_one();
}

/// Recompile the rules file off the runtime threads and publish the result.
/// Returns the new trigger count, or `None` when the old list was kept.
async fn reload_rules(ctx: Arc<AppContext>, path: PathBuf, zone: FixedOffset) -> Option<usize> {
    let display_path = path.clone();
    let result =
        tokio::task::spawn_blocking(move || ctx.triggers.reload(&path, zone)).await;

    match result {
        Ok(Ok(count)) => {
            tracing::info!("Reloaded {} triggers from {}", count, display_path.display());
            Some(count)
        }
        // `reload` already logged the rule error.
        Ok(Err(_)) => None,
        Err(e) => {
            tracing::error!("Rules reload task failed: {}", e);
            None
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
        }
        _ => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
