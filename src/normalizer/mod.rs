use chrono::Utc;
use feed_rs::model::Entry;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{NewswatchError, Result};
use crate::domain::Item;

#[derive(Debug, Clone)]
pub struct NormalizedFeed {
    pub title: Option<String>,
    pub items: Vec<Item>,
}

impl NormalizedFeed {
    pub fn display_title<'a>(&'a self, source: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(source)
    }
}

/// Turns RSS/Atom/JSON feed documents into [`Item`]s.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse `body` fetched from `source`.
    ///
    /// An entry without a title, a description or a publication date is
    /// malformed and fails the whole document instead of being treated as
    /// non-matching.
    pub fn normalize(&self, source: &str, body: &[u8]) -> Result<NormalizedFeed> {
        let feed = parser::parse(body).map_err(|e| NewswatchError::FeedParse(e.to_string()))?;

        let items = feed
            .entries
            .into_iter()
            .map(|entry| normalize_entry(source, entry))
            .collect::<Result<Vec<_>>>()?;

        Ok(NormalizedFeed {
            title: feed.title.map(|t| decode(&t.content)),
            items,
        })
    }
}

fn normalize_entry(source: &str, entry: Entry) -> Result<Item> {
    let link = entry.links.first().map(|l| l.href.clone());
    let entry_id = if entry.id.is_empty() {
        link.clone().unwrap_or_default()
    } else {
        entry.id.clone()
    };

    let missing = |field: &'static str| NewswatchError::MalformedItem {
        source_url: source.to_string(),
        entry: entry_id.clone(),
        field,
    };

    let title = entry.title.map(|t| decode(&t.content)).ok_or_else(|| missing("title"))?;
    let description = entry
        .summary
        .map(|s| decode(&s.content))
        .or_else(|| entry.content.and_then(|c| c.body).map(|b| decode(&b)))
        .ok_or_else(|| missing("description"))?;
    let published_at = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| missing("publication date"))?;

    let mut item = Item::new(
        Item::generate_id(source, &entry_id),
        title,
        description,
        published_at,
    );
    item.link = link;
    Ok(item)
}

fn decode(text: &str) -> String {
    decode_html_entities(text).to_string()
}
