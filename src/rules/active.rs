//! The active trigger list shared between the poll loop and reloads.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::FixedOffset;

use crate::rules::{self, Result};
use crate::trigger::Trigger;

/// Immutable list of triggers used by one filter pass.
pub type TriggerList = Arc<[Arc<Trigger>]>;

/// Publishes the current trigger list.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep using it for the whole
/// pass; writers build a complete new list and swap the pointer. The lock only
/// guards the pointer, so a reader never sees a half-built list.
pub struct ActiveTriggers {
    current: RwLock<TriggerList>,
}

impl ActiveTriggers {
    pub fn new(triggers: Vec<Arc<Trigger>>) -> Self {
        Self {
            current: RwLock::new(triggers.into()),
        }
    }

    pub fn snapshot(&self) -> TriggerList {
        // The guarded value is a single pointer; a poisoned lock still holds a
        // complete list.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, triggers: Vec<Arc<Trigger>>) {
        let list: TriggerList = triggers.into();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = list;
    }

    /// Compile `path` into a fresh list and publish it.
    ///
    /// On error the previous list stays active and the error is returned.
    pub fn reload(&self, path: &Path, zone: FixedOffset) -> Result<usize> {
        match rules::load(path, zone) {
            Ok(triggers) => {
                let count = triggers.len();
                self.replace(triggers);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!("Keeping previous triggers, reload failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActiveTriggers {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::time::default_reference_zone;

    #[test]
    fn test_snapshot_survives_replace() {
        let active = ActiveTriggers::new(vec![Arc::new(Trigger::title("old"))]);
        let before = active.snapshot();

        active.replace(vec![
            Arc::new(Trigger::title("new")),
            Arc::new(Trigger::title("newer")),
        ]);

        assert_eq!(before.len(), 1);
        assert_eq!(*before[0], Trigger::title("old"));
        assert_eq!(active.len(), 2);
        assert_eq!(*active.snapshot()[0], Trigger::title("new"));
    }

    #[test]
    fn test_reload_swaps_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.txt");
        std::fs::write(&path, "a,TITLE,alpha\nb,TITLE,beta\nADD,a,b\n").unwrap();

        let active = ActiveTriggers::default();
        assert!(active.is_empty());

        let count = active.reload(&path, default_reference_zone()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_reload_keeps_previous_list_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.txt");
        std::fs::write(&path, "a,TITLE,alpha\nADD,a\nb,NOT,missing\n").unwrap();

        let active = ActiveTriggers::new(vec![Arc::new(Trigger::title("kept"))]);
        assert!(active.reload(&path, default_reference_zone()).is_err());
        assert_eq!(active.len(), 1);
        assert_eq!(*active.snapshot()[0], Trigger::title("kept"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_lists() {
        let active = Arc::new(ActiveTriggers::new(vec![Arc::new(Trigger::title("a"))]));

        let writer = {
            let active = active.clone();
            std::thread::spawn(move || {
                for n in 1..50 {
                    let list = (0..n).map(|_| Arc::new(Trigger::title("x"))).collect();
                    active.replace(list);
                }
            })
        };

        for _ in 0..200 {
            let snapshot = active.snapshot();
            assert!(!snapshot.is_empty());
            assert!(snapshot.iter().all(|t| **t == *snapshot[0]));
        }
        writer.join().unwrap();
        assert_eq!(active.len(), 49);
    }
}
