//! Feed Store
//!
//! Holds the latest `FeedSnapshot` behind a `watch` channel. `replace` swaps
//! the whole `Arc` in one step, so a reader sees either the old snapshot or
//! the new one, never a mix. Snapshots are shared read-only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::types::{FeedSnapshot, IdentifiedFlow};

/// Write side of the store. Owned by the ingest task.
#[derive(Debug)]
pub struct FeedStore {
    tx: watch::Sender<Arc<FeedSnapshot>>,
}

impl FeedStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(FeedSnapshot::default()));
        Self { tx }
    }

    /// Swap in a new snapshot built from `flows`.
    pub fn replace(&self, mut flows: Vec<IdentifiedFlow>, refreshed_at: DateTime<Utc>) -> Arc<FeedSnapshot> {
        // Newest-first regardless of how the caller ordered the batch
        flows.sort_by(|a, b| b.sequence_id.cmp(&a.sequence_id));

        let generation = self.tx.borrow().generation + 1;
        let snapshot = Arc::new(FeedSnapshot {
            generation,
            refreshed_at: Some(refreshed_at),
            flows,
        });
        self.tx.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    pub fn current(&self) -> Arc<FeedSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn reader(&self) -> FeedReader {
        FeedReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable read handle onto the store.
#[derive(Debug, Clone)]
pub struct FeedReader {
    rx: watch::Receiver<Arc<FeedSnapshot>>,
}

impl FeedReader {
    pub fn current(&self) -> Arc<FeedSnapshot> {
        Arc::clone(&self.rx.borrow())
    }

    /// Wait until a snapshot newer than the last one seen by this handle is
    /// published. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<FeedSnapshot>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::classifier::Classifier;
    use crate::feed::types::{PortToken, RawFlow};

    fn flow(sequence_id: u64) -> IdentifiedFlow {
        let raw = RawFlow {
            source_ip: Some(format!("10.0.0.{}", sequence_id)),
            dest_ip: Some("10.0.0.254".to_string()),
            protocol: Some("TCP".to_string()),
            port: Some(PortToken::Number(80)),
            packets: Some(1),
            bytes: Some(1),
            ..Default::default()
        };
        IdentifiedFlow {
            sequence_id,
            record: Classifier::default().build(raw).unwrap(),
        }
    }

    #[test]
    fn test_starts_empty() {
        let store = FeedStore::new();
        let snapshot = store.current();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.refreshed_at.is_none());
    }

    #[test]
    fn test_current_is_idempotent() {
        let store = FeedStore::new();
        store.replace(vec![flow(2), flow(1)], Utc::now());

        let a = store.current();
        let b = store.current();
        assert_eq!(*a, *b);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_replace_swaps_whole_set_and_sorts() {
        let store = FeedStore::new();
        let reader = store.reader();
        store.replace(vec![flow(1), flow(3), flow(2)], Utc::now());

        let before = reader.current();
        let ids: Vec<u64> = before.flows.iter().map(|f| f.sequence_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(before.generation, 1);

        store.replace(vec![flow(1)], Utc::now());

        // Previously handed-out snapshot is untouched
        assert_eq!(before.len(), 3);
        let after = reader.current();
        assert_eq!(after.len(), 1);
        assert_eq!(after.generation, 2);
    }

    #[tokio::test]
    async fn test_reader_notified_on_replace() {
        let store = FeedStore::new();
        let mut reader = store.reader();

        store.replace(vec![flow(1)], Utc::now());
        let snapshot = reader.changed().await.unwrap();
        assert_eq!(snapshot.generation, 1);

        drop(store);
        assert!(reader.changed().await.is_none());
    }
}
