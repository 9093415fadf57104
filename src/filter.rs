//! Apply the active trigger list to a batch of items.

use std::sync::Arc;

use crate::domain::Item;
use crate::trigger::Trigger;

/// True iff at least one trigger matches. An empty list matches nothing.
pub fn matches_any(item: &Item, triggers: &[Arc<Trigger>]) -> bool {
    triggers.iter().any(|trigger| trigger.evaluate(item))
}

/// Keep the items matched by any trigger, in input order, each at most once.
pub fn filter(items: Vec<Item>, triggers: &[Arc<Trigger>]) -> Vec<Item> {
    let total = items.len();
    let matched: Vec<Item> = items
        .into_iter()
        .filter(|item| {
            let hit = matches_any(item, triggers);
            if hit {
                tracing::debug!("Matched: {}", item.title);
            }
            hit
        })
        .collect();

    tracing::debug!("{} of {} items matched {} triggers", matched.len(), total, triggers.len());
    matched
}
