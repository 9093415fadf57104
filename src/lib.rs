//! # newswatch
//!
//! Filters news feeds through user-defined trigger rules.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Filter(active triggers) → Display
//!                              ↑
//!                Rule file → Compiler
//! ```
//!
//! The two engine entry points are [`rules::compile`] (configuration text to
//! the active trigger list) and [`filter::filter`] (items to matches).
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate a rules file
//! newswatch check triggers.txt
//!
//! # Filter feeds once
//! newswatch filter --rules triggers.txt https://news.yahoo.com/rss/topstories
//!
//! # Poll the configured feeds
//! newswatch watch
//! ```

/// Application context and error handling.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/newswatch/config.toml`.
pub mod config;

/// Core domain models.
pub mod domain;

/// Feed fetching over HTTP or from local files.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Any-match filtering of items against the active triggers.
pub mod filter;

/// Feed parsing and normalization into [`Item`](domain::Item)s.
pub mod normalizer;

/// Rule compiler and the published active trigger list.
pub mod rules;

/// Trigger predicates: phrase, time window and logical combinators.
pub mod trigger;

/// Poll loop and match display.
pub mod watch;

pub use domain::Item;
pub use filter::filter;
pub use rules::compile;
pub use trigger::Trigger;
