//! Boolean predicates over news items.
//!
//! A [`Trigger`] is a closed set of variants. Composite variants hold their
//! children behind [`Arc`], so a named trigger referenced by several rules is
//! a single shared value and the whole rule set forms a DAG.

pub mod phrase;
pub mod time;

use std::fmt;
use std::sync::Arc;

use crate::domain::Item;

pub use phrase::PhraseTrigger;
pub use time::{TimeTrigger, TimestampError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Phrase occurs in the item title.
    Title(PhraseTrigger),
    /// Phrase occurs in the item description.
    Description(PhraseTrigger),
    /// Item was published strictly before the boundary.
    Before(TimeTrigger),
    /// Item was published strictly after the boundary.
    After(TimeTrigger),
    Not(Arc<Trigger>),
    And(Arc<Trigger>, Arc<Trigger>),
    Or(Arc<Trigger>, Arc<Trigger>),
}

impl Trigger {
    pub fn title(phrase: &str) -> Self {
        Self::Title(PhraseTrigger::new(phrase))
    }

    pub fn description(phrase: &str) -> Self {
        Self::Description(PhraseTrigger::new(phrase))
    }

    pub fn before(boundary: TimeTrigger) -> Self {
        Self::Before(boundary)
    }

    pub fn after(boundary: TimeTrigger) -> Self {
        Self::After(boundary)
    }

    pub fn not(inner: Arc<Trigger>) -> Self {
        Self::Not(inner)
    }

    pub fn and(left: Arc<Trigger>, right: Arc<Trigger>) -> Self {
        Self::And(left, right)
    }

    pub fn or(left: Arc<Trigger>, right: Arc<Trigger>) -> Self {
        Self::Or(left, right)
    }

    /// Evaluate against `item`. Pure: depends only on the item and the
    /// state fixed at construction.
    pub fn evaluate(&self, item: &Item) -> bool {
        match self {
            Self::Title(phrase) => phrase.matches(&item.title),
            Self::Description(phrase) => phrase.matches(&item.description),
            Self::Before(time) => time.is_before(item.published_at),
            Self::After(time) => time.is_after(item.published_at),
            Self::Not(inner) => !inner.evaluate(item),
            Self::And(left, right) => left.evaluate(item) && right.evaluate(item),
            Self::Or(left, right) => left.evaluate(item) || right.evaluate(item),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title(phrase) => write!(f, "(title {})", phrase),
            Self::Description(phrase) => write!(f, "(description {})", phrase),
            Self::Before(time) => write!(f, "(before {})", time),
            Self::After(time) => write!(f, "(after {})", time),
            Self::Not(inner) => write!(f, "(not {})", inner),
            Self::And(left, right) => write!(f, "(and {} {})", left, right),
            Self::Or(left, right) => write!(f, "(or {} {})", left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(title: &str, description: &str) -> Item {
        let at = Utc.with_ymd_and_hms(2016, 10, 3, 12, 0, 0).unwrap();
        Item::new("id", title, description, at)
    }

    fn item_at(at: chrono::DateTime<Utc>) -> Item {
        Item::new("id", "title", "description", at)
    }

    /// Constant triggers built from real variants: an empty phrase always
    /// matches, and its negation never does.
    fn always() -> Arc<Trigger> {
        Arc::new(Trigger::title(""))
    }

    fn never() -> Arc<Trigger> {
        Arc::new(Trigger::not(always()))
    }

    fn constant(value: bool) -> Arc<Trigger> {
        if value {
            always()
        } else {
            never()
        }
    }

    #[test]
    fn test_title_and_description_look_at_their_own_field() {
        let news = item("Election results", "Trump and Clinton debate");
        assert!(Trigger::title("election").evaluate(&news));
        assert!(!Trigger::title("clinton").evaluate(&news));
        assert!(Trigger::description("clinton").evaluate(&news));
        assert!(!Trigger::description("election").evaluate(&news));
    }

    #[test]
    fn test_time_window_property() {
        let t1 = Utc.with_ymd_and_hms(2016, 10, 3, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2016, 10, 4, 12, 0, 0).unwrap();

        assert!(Trigger::after(TimeTrigger::new(t1)).evaluate(&item_at(t2)));
        assert!(Trigger::before(TimeTrigger::new(t2)).evaluate(&item_at(t1)));
        assert!(!Trigger::after(TimeTrigger::new(t1)).evaluate(&item_at(t1)));
        assert!(!Trigger::before(TimeTrigger::new(t1)).evaluate(&item_at(t1)));
    }

    #[test]
    fn test_not_negates() {
        let news = item("Election results", "");
        let inner = Arc::new(Trigger::title("election"));
        let not = Arc::new(Trigger::not(inner.clone()));
        assert_eq!(not.evaluate(&news), !inner.evaluate(&news));

        let double = Trigger::not(not);
        assert_eq!(double.evaluate(&news), inner.evaluate(&news));
    }

    #[test]
    fn test_and_or_truth_tables() {
        let news = item("x", "y");
        for a in [false, true] {
            for b in [false, true] {
                assert_eq!(
                    Trigger::and(constant(a), constant(b)).evaluate(&news),
                    a && b,
                    "and({a}, {b})"
                );
                assert_eq!(
                    Trigger::or(constant(a), constant(b)).evaluate(&news),
                    a || b,
                    "or({a}, {b})"
                );
            }
        }
    }

    #[test]
    fn test_shared_child_in_dag() {
        let shared = Arc::new(Trigger::description("trump"));
        let both = Trigger::and(shared.clone(), Arc::new(Trigger::description("clinton")));
        let either = Trigger::or(shared.clone(), Arc::new(Trigger::title("election")));

        let news = item("Debate night", "Trump and Clinton on stage");
        assert!(both.evaluate(&news));
        assert!(either.evaluate(&news));
        assert_eq!(Arc::strong_count(&shared), 3);
    }

    #[test]
    fn test_display() {
        let trigger = Trigger::and(
            Arc::new(Trigger::title("Election Night")),
            Arc::new(Trigger::not(Arc::new(Trigger::description("poll")))),
        );
        assert_eq!(
            trigger.to_string(),
            "(and (title \"election night\") (not (description \"poll\")))"
        );
    }

    #[test]
    fn test_trigger_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Trigger>();
    }
}
